/// Event layout: assigns each visible event a rect on the correct side of
/// the divider, in db order, without overlaps.
use std::collections::HashMap;

use super::{category_visible, Rect, SceneMetrics};
use crate::config::Config;
use crate::db::Db;
use crate::model::{ContainerCid, EventId};
use crate::time::Time;
use crate::view::ViewProperties;

pub(super) fn stack_events(
    db: &Db,
    vp: &ViewProperties,
    config: &Config,
    metrics: &SceneMetrics,
    now: Time,
    measure_text: &dyn Fn(&str) -> f64,
) -> (Vec<(EventId, Rect)>, usize) {
    let slot_height = vp.event_height.max(1.0);
    let mut placed: Vec<(EventId, Rect)> = Vec::new();
    let mut hidden = 0;
    let mut containers: HashMap<ContainerCid, usize> = HashMap::new();

    for event in db.all_events() {
        let Some(id) = event.id else { continue };
        if !category_visible(db, vp, event.category) {
            continue;
        }
        let period = event.display_period(now);
        if !period.overlaps(&metrics.displayed) {
            continue;
        }

        // Sub-events nest inside their container's rect when the extended
        // container height option is on.
        if config.extended_container_height {
            if let Some(cid) = event.container_id() {
                if let Some(&container_index) = containers.get(&cid) {
                    let width = metrics.width_of_period(&period).max(1.0);
                    let x = metrics.x_for_time(period.start());
                    let rect = Rect::new(x, 0.0, width, slot_height);
                    match place_in_container(
                        &mut placed,
                        container_index,
                        rect,
                        slot_height,
                        metrics.height,
                    ) {
                        Some(rect) => placed.push((id, rect)),
                        None => hidden += 1,
                    }
                    continue;
                }
            }
        }

        let width_px = metrics.width_of_period(&period);
        let is_period = width_px > config.point_event_threshold && !period.is_point();
        let rect = if is_period {
            Rect::new(metrics.x_for_time(period.start()), 0.0, width_px.max(1.0), slot_height)
        } else {
            let width = (measure_text(&event.text) + 2.0).max(4.0);
            let center = metrics.x_for_time(period.mean_time());
            Rect::new(center - width / 2.0, 0.0, width, slot_height)
        };
        match place(rect, is_period, metrics, slot_height, &placed) {
            Some(rect) => {
                if let Some(cid) = event.cid() {
                    containers.insert(cid, placed.len());
                }
                placed.push((id, rect));
            }
            None => hidden += 1,
        }
    }
    (placed, hidden)
}

/// Find the nearest free lane: period events stack downward from the
/// divider, point events upward. `None` when the canvas is full.
fn place(
    mut rect: Rect,
    is_period: bool,
    metrics: &SceneMetrics,
    slot_height: f64,
    placed: &[(EventId, Rect)],
) -> Option<Rect> {
    let mut lane = 0;
    loop {
        if is_period {
            rect.y = metrics.divider_y + lane as f64 * slot_height;
            if rect.bottom() > metrics.height {
                return None;
            }
        } else {
            rect.y = metrics.divider_y - (lane as f64 + 1.0) * slot_height;
            if rect.y < 0.0 {
                return None;
            }
        }
        if placed.iter().all(|(_, other)| !rect.overlaps(other)) {
            return Some(rect);
        }
        lane += 1;
    }
}

/// Place a sub-event in a lane inside its container and grow the container
/// to enclose it. The container's own rect is exempt from the overlap test.
fn place_in_container(
    placed: &mut [(EventId, Rect)],
    container_index: usize,
    mut rect: Rect,
    slot_height: f64,
    height: f64,
) -> Option<Rect> {
    let container = placed[container_index].1;
    let mut lane = 0;
    loop {
        rect.y = container.y + (lane as f64 + 1.0) * slot_height;
        if rect.bottom() > height {
            return None;
        }
        let collides = placed
            .iter()
            .enumerate()
            .any(|(index, (_, other))| index != container_index && rect.overlaps(other));
        if !collides {
            break;
        }
        lane += 1;
    }
    let bottom = rect.bottom().max(container.bottom());
    placed[container_index].1.height = bottom - container.y;
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian_time_type;
    use crate::model::Event;
    use crate::time::TimePeriod;
    use crate::view::ViewProperties;

    fn period(start: i64, end: i64) -> TimePeriod {
        TimePeriod::new(Time::new(start, 0), Time::new(end, 0)).unwrap()
    }

    fn stack(db: &Db, height: f64) -> (Vec<(EventId, Rect)>, usize) {
        let vp = ViewProperties::new(0.5, 1.0);
        let metrics = SceneMetrics::new(100.0, height, period(0, 10), vp.divider_fraction);
        stack_events(
            db,
            &vp,
            &Config::default(),
            &metrics,
            Time::new(5, 0),
            &|text| text.chars().count() as f64,
        )
    }

    #[test]
    fn overlapping_period_events_stack_downward() {
        let mut db = Db::new(gregorian_time_type());
        db.save_event(Event::new(period(0, 8), "a")).unwrap();
        db.save_event(Event::new(period(2, 9), "b")).unwrap();
        let (placed, hidden) = stack(&db, 40.0);
        assert_eq!(hidden, 0);
        assert!(placed[0].1.y < placed[1].1.y);
        assert!(!placed[0].1.overlaps(&placed[1].1));
        // Both below the divider.
        assert!(placed.iter().all(|(_, rect)| rect.y >= 20.0));
    }

    #[test]
    fn point_events_stack_upward_above_divider() {
        let mut db = Db::new(gregorian_time_type());
        db.save_event(Event::new(TimePeriod::point(Time::new(5, 0)), "a")).unwrap();
        db.save_event(Event::new(TimePeriod::point(Time::new(5, 0)), "b")).unwrap();
        let (placed, _) = stack(&db, 40.0);
        assert!(placed.iter().all(|(_, rect)| rect.bottom() <= 20.0));
        assert!(placed[1].1.y < placed[0].1.y);
    }

    #[test]
    fn earlier_event_keeps_lower_lane() {
        let mut db = Db::new(gregorian_time_type());
        let first = db.save_event(Event::new(period(0, 8), "first")).unwrap();
        db.save_event(Event::new(period(0, 8), "second")).unwrap();
        let (placed, _) = stack(&db, 40.0);
        let first_rect = placed.iter().find(|(id, _)| *id == first).unwrap().1;
        assert_eq!(first_rect.y, 20.0);
    }

    #[test]
    fn overflow_counts_hidden_events() {
        let mut db = Db::new(gregorian_time_type());
        for i in 0..5 {
            db.save_event(Event::new(period(0, 8), format!("e{i}"))).unwrap();
        }
        // Divider at 1.0, room for two period lanes below it.
        let vp = ViewProperties::new(0.5, 1.0);
        let metrics = SceneMetrics::new(100.0, 2.0, period(0, 10), vp.divider_fraction);
        let (placed, hidden) = stack_events(
            &db,
            &vp,
            &Config::default(),
            &metrics,
            Time::new(5, 0),
            &|text| text.chars().count() as f64,
        );
        assert_eq!(placed.len() + hidden, 5);
        assert!(hidden > 0);
    }

    #[test]
    fn container_grows_to_enclose_subevents() {
        let mut db = Db::new(gregorian_time_type());
        db.save_event(Event::new_subevent(period(0, 4), "a", 1)).unwrap();
        db.save_event(Event::new_subevent(period(1, 5), "b", 1)).unwrap();
        let (placed, hidden) = stack(&db, 40.0);
        assert_eq!(hidden, 0);
        let container_id = db
            .all_events()
            .iter()
            .find(|event| event.is_container())
            .and_then(|event| event.id)
            .unwrap();
        let container = placed.iter().find(|(id, _)| *id == container_id).unwrap().1;
        for (id, rect) in &placed {
            if *id != container_id {
                assert!(rect.bottom() <= container.bottom());
                assert!(rect.y >= container.y);
            }
        }
    }
}
