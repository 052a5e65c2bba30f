/// Built-in demo timeline, opened with the `:tutorial:` pseudo-path.
use crate::calendar::gregorian_time_type;
use crate::color::Color;
use crate::db::Db;
use crate::error::Result;
use crate::model::{Category, Era, Event};
use crate::time::{Time, TimeDelta, TimePeriod};

pub fn tutorial_db() -> Result<Db> {
    let mut db = Db::new(gregorian_time_type());
    db.disable_save();

    let now = db.time_type().now();
    let today = Time::new(now.julian_day(), 0);
    let day = |offset: i64| today + TimeDelta::from_days(offset);
    let span = |from: i64, to: i64| TimePeriod::new(day(from), day(to));

    let basics = db.save_category(Category::new("Basics", Color::new(120, 180, 240), None))?;
    let editing = db.save_category(Category::new("Editing", Color::new(160, 220, 140), None))?;
    let advanced =
        db.save_category(Category::new("Advanced", Color::new(230, 170, 90), Some(editing)))?;

    let mut welcome = Event::new(TimePeriod::point(today), "Welcome! Double-click me");
    welcome.category = Some(basics);
    welcome.description = Some(
        "Scroll with the mouse wheel, zoom with ctrl+wheel and drag the \
         background to pan. Double-click an event to edit it."
            .to_string(),
    );
    db.save_event(welcome)?;

    let mut drag_me = Event::new(span(1, 3)?, "Drag me around");
    drag_me.category = Some(editing);
    drag_me.description =
        Some("Drag the middle to move, drag an edge to resize.".to_string());
    db.save_event(drag_me)?;

    let mut fuzzy = Event::new(span(-4, -2)?, "Roughly around here");
    fuzzy.category = Some(basics);
    fuzzy.set_fuzzy(true);
    db.save_event(fuzzy)?;

    let mut locked = Event::new(span(4, 5)?, "Can't touch this");
    locked.category = Some(advanced);
    locked.locked = true;
    db.save_event(locked)?;

    // Saving a sub-event materializes its container.
    db.save_event(Event::new_subevent(span(6, 8)?, "Phase one", 1))?;
    db.save_event(Event::new_subevent(span(8, 11)?, "Phase two", 1))?;

    db.save_era(Era::new(span(-2, 5)?, "This week-ish", Color::new(235, 235, 215)));

    db.enable_save(false);
    db.reset_undo_history();
    Ok(db)
}
