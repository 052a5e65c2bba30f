/// Scene builder: projects db contents onto a pixel canvas.
///
/// The scene is a pure value rebuilt on every change; the drawer and the
/// interaction state machine both consume it, for painting and hit-testing
/// respectively.
mod stacking;

use crate::calendar::Strip;
use crate::config::Config;
use crate::db::Db;
use crate::model::{CategoryId, EraId, EventId};
use crate::time::{Time, TimeDelta, TimePeriod};
use crate::view::ViewProperties;

/// Strips never produce more subdivisions than this; guards against a
/// degenerate increment at extreme zoom levels.
const MAX_STRIP_PERIODS: usize = 2_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Time-to-pixel projection for one canvas size and displayed period.
#[derive(Clone, Copy, Debug)]
pub struct SceneMetrics {
    pub width: f64,
    pub height: f64,
    pub displayed: TimePeriod,
    pub divider_y: f64,
}

impl SceneMetrics {
    pub fn new(width: f64, height: f64, displayed: TimePeriod, divider_fraction: f64) -> Self {
        Self { width, height, displayed, divider_y: height * divider_fraction }
    }

    pub fn x_for_time(&self, time: Time) -> f64 {
        let total = self.displayed.delta().seconds() as f64;
        let offset = (time - self.displayed.start()).seconds() as f64;
        offset / total * self.width
    }

    pub fn time_at_x(&self, x: f64) -> Time {
        let total = self.displayed.delta().seconds() as f64;
        let seconds = (x / self.width * total).round() as i64;
        self.displayed.start() + TimeDelta::from_seconds(seconds)
    }

    pub fn width_of_period(&self, period: &TimePeriod) -> f64 {
        self.distance_between_times(period.start(), period.end())
    }

    pub fn distance_between_times(&self, a: Time, b: Time) -> f64 {
        let total = self.displayed.delta().seconds() as f64;
        ((b - a).seconds() as f64).abs() / total * self.width
    }

    /// Pixel width of one day at this zoom level; drives strip selection.
    pub fn day_px(&self) -> f64 {
        self.width / self.displayed.delta().days_f64()
    }
}

pub struct TimelineScene {
    pub metrics: SceneMetrics,
    /// Draw order equals db insertion order; later entries draw on top.
    pub event_data: Vec<(EventId, Rect)>,
    pub minor_strip: Box<dyn Strip>,
    pub major_strip: Box<dyn Strip>,
    pub minor_strip_data: Vec<TimePeriod>,
    pub major_strip_data: Vec<TimePeriod>,
    pub era_data: Vec<(EraId, Rect)>,
    /// Rects of balloons currently shown, in draw order. Shared between the
    /// drawer and balloon click hit-tests.
    pub balloon_data: Vec<(EventId, Rect)>,
    /// Events that passed visibility but did not fit vertically.
    pub hidden_event_count: usize,
}

impl TimelineScene {
    pub fn build(
        db: &Db,
        vp: &ViewProperties,
        config: &Config,
        displayed: TimePeriod,
        width: f64,
        height: f64,
        measure_text: &dyn Fn(&str) -> f64,
    ) -> TimelineScene {
        let metrics = SceneMetrics::new(width, height, displayed, vp.divider_fraction);
        let (major_strip, minor_strip) = db.time_type().choose_strips(metrics.day_px(), config);
        let minor_strip_data = strip_periods(minor_strip.as_ref(), displayed);
        let major_strip_data = strip_periods(major_strip.as_ref(), displayed);
        let now = db.time_type().now();
        let (event_data, hidden_event_count) =
            stacking::stack_events(db, vp, config, &metrics, now, measure_text);
        let era_data = db
            .eras()
            .iter()
            .filter(|era| era.period.overlaps(&displayed))
            .filter_map(|era| {
                let id = era.id?;
                let start = era.period.start().max(displayed.start());
                let end = era.period.end().min(displayed.end());
                let x = metrics.x_for_time(start);
                let w = metrics.distance_between_times(start, end);
                Some((id, Rect::new(x, 0.0, w, height)))
            })
            .collect();
        let mut scene = TimelineScene {
            metrics,
            event_data,
            minor_strip,
            major_strip,
            minor_strip_data,
            major_strip_data,
            era_data,
            balloon_data: Vec::new(),
            hidden_event_count,
        };
        let mut shown: Vec<EventId> = vp.sticky_balloons().collect();
        if let Some(id) = vp.balloon_event {
            if !shown.contains(&id) {
                shown.push(id);
            }
        }
        for id in shown {
            let Some(event) = db.event(id) else { continue };
            let Some(rect) = scene.event_rect(id) else { continue };
            let text = balloon_text(db, event);
            let balloon = balloon_rect(&rect, &text, width, measure_text);
            scene.balloon_data.push((id, balloon));
        }
        scene
    }

    /// Topmost balloon under the cursor.
    pub fn balloon_at(&self, x: f64, y: f64) -> Option<EventId> {
        self.balloon_data
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(id, _)| *id)
    }

    /// Topmost event under the cursor, honoring draw order.
    pub fn event_at(&self, x: f64, y: f64) -> Option<EventId> {
        self.event_data
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(id, _)| *id)
    }

    pub fn event_rect(&self, id: EventId) -> Option<Rect> {
        self.event_data
            .iter()
            .find(|(event_id, _)| *event_id == id)
            .map(|(_, rect)| *rect)
    }

    /// Snap to the nearest minor-strip boundary when within `snap_distance`
    /// pixels of it; otherwise return the time unchanged.
    pub fn snap(&self, time: Time, snap_distance: f64) -> Time {
        let below = self.minor_strip.start(time);
        let above = self.minor_strip.increment(below);
        let below_px = self.metrics.distance_between_times(below, time);
        let above_px = self.metrics.distance_between_times(time, above);
        if below_px <= above_px && below_px <= snap_distance {
            below
        } else if above_px <= snap_distance {
            above
        } else {
            time
        }
    }
}

/// Whether an event with the given category is visible. A hidden category
/// hides its whole subtree.
pub fn category_visible(db: &Db, vp: &ViewProperties, category: Option<CategoryId>) -> bool {
    let mut cursor = category;
    while let Some(id) = cursor {
        if !vp.is_category_visible(id) {
            return false;
        }
        cursor = db.category(id).and_then(|c| c.parent);
    }
    true
}

/// The text shown in an event's balloon: title, period and description.
pub fn balloon_text(db: &Db, event: &crate::model::Event) -> String {
    let mut text = format!(
        "{}\n{}",
        event.text,
        db.time_type().format_period(&event.period())
    );
    if let Some(description) = &event.description {
        text.push('\n');
        text.push_str(description);
    }
    text
}

/// Balloon geometry above the event, clamped to the canvas.
pub fn balloon_rect(
    event_rect: &Rect,
    text: &str,
    canvas_width: f64,
    measure_text: &dyn Fn(&str) -> f64,
) -> Rect {
    let max_width = (canvas_width - 4.0).max(10.0);
    let lines = wrap_text(text, max_width - 2.0, measure_text);
    let content_width = lines
        .iter()
        .map(|line| measure_text(line))
        .fold(0.0, f64::max);
    let width = (content_width + 2.0).min(max_width);
    let height = lines.len() as f64 + 2.0;
    let x = (event_rect.x + event_rect.width / 2.0 - width / 2.0)
        .clamp(0.0, (canvas_width - width).max(0.0));
    let y = (event_rect.y - height - 1.0).max(0.0);
    Rect::new(x, y, width, height)
}

/// Greedy word wrap against the measurement function. Hard newlines are
/// kept.
pub fn wrap_text(text: &str, max_width: f64, measure_text: &dyn Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if measure_text(&candidate) <= max_width || line.is_empty() {
                line = candidate;
            } else {
                lines.push(line);
                line = word.to_string();
            }
        }
        lines.push(line);
    }
    lines
}

fn strip_periods(strip: &dyn Strip, displayed: TimePeriod) -> Vec<TimePeriod> {
    let mut periods = Vec::new();
    let mut cursor = strip.start(displayed.start());
    while cursor < displayed.end() && periods.len() < MAX_STRIP_PERIODS {
        let next = strip.increment(cursor);
        if next <= cursor {
            break;
        }
        if let Ok(period) = TimePeriod::new(cursor, next) {
            periods.push(period);
        }
        cursor = next;
    }
    periods
}
