use timeline::calendar::{NavigationItem, TimeType, gregorian_time_type};
use timeline::color::Color;
use timeline::db::Db;
use timeline::interaction::{Interaction, Request};
use timeline::model::{Category, Event};
use timeline::time::{Time, TimePeriod};
use timeline::view::ViewProperties;

fn period(start: i64, end: i64) -> TimePeriod {
    TimePeriod::new(Time::new(start, 0), Time::new(end, 0)).unwrap()
}

fn navigation(time_type: &dyn TimeType, label: &str) -> fn(&TimePeriod) -> timeline::error::Result<TimePeriod> {
    time_type
        .navigation_functions()
        .into_iter()
        .find_map(|item| match item {
            NavigationItem::Entry { label: found, func } if found == label => Some(func),
            _ => None,
        })
        .unwrap()
}

#[test]
fn deleting_a_category_reparents_children_and_events() {
    let mut db = Db::new(gregorian_time_type());
    let a = db.save_category(Category::new("A", Color::new(1, 1, 1), None)).unwrap();
    let b = db.save_category(Category::new("B", Color::new(2, 2, 2), Some(a))).unwrap();
    let c = db.save_category(Category::new("C", Color::new(3, 3, 3), Some(b))).unwrap();
    let mut event = Event::new(period(0, 1), "in B");
    event.category = Some(b);
    let event = db.save_event(event).unwrap();

    db.delete_category(b).unwrap();

    assert!(db.category(b).is_none());
    assert_eq!(db.category(c).unwrap().parent, Some(a));
    assert_eq!(db.event(event).unwrap().category, Some(a));
}

#[test]
fn a_new_edit_after_undo_discards_the_redo_branch() {
    let mut db = Db::new(gregorian_time_type());
    db.save_event(Event::new(period(0, 1), "first")).unwrap();
    db.save_event(Event::new(period(2, 3), "second")).unwrap();

    assert!(db.undo());
    assert_eq!(db.all_events().len(), 1);
    db.save_event(Event::new(period(4, 5), "third")).unwrap();

    assert!(!db.redo());
    let texts: Vec<&str> = db.all_events().iter().map(|event| event.text.as_str()).collect();
    assert_eq!(texts, ["first", "third"]);
}

#[test]
fn out_of_range_navigation_posts_a_status_instead_of_moving() {
    let db = Db::new(gregorian_time_type());
    let time_type = db.time_type().clone();
    let december = TimePeriod::new(
        time_type.parse_time("9989-12-01 00:00:00").unwrap(),
        time_type.parse_time("9990-01-01 00:00:00").unwrap(),
    )
    .unwrap();
    let mut vp = ViewProperties::new(0.5, 1.0);
    vp.displayed_period = Some(december);

    let mut interaction = Interaction::default();
    interaction.navigate(navigation(time_type.as_ref(), "Forward"), &db, &mut vp);

    let requests = interaction.take_requests();
    assert!(matches!(requests.as_slice(), [Request::Status(_)]));
    assert_eq!(vp.displayed_period, Some(december));
}

#[test]
fn forward_then_backward_returns_to_the_same_month() {
    let time_type = gregorian_time_type();
    let january = TimePeriod::new(
        time_type.parse_time("2020-01-01 00:00:00").unwrap(),
        time_type.parse_time("2020-02-01 00:00:00").unwrap(),
    )
    .unwrap();
    let forward = navigation(time_type.as_ref(), "Forward");
    let backward = navigation(time_type.as_ref(), "Backward");

    let february = forward(&january).unwrap();
    assert_eq!(february.start(), january.end());
    assert_eq!(backward(&february).unwrap(), january);
}
