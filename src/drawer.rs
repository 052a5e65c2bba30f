/// Pure timeline painter.
///
/// Paints through the [`Canvas`] abstraction and reads the db, the view
/// properties and the scene. Knows nothing about input; its only side
/// effects are canvas calls.
use crate::color::{self, Color};
use crate::db::Db;
use crate::model::Event;
use crate::scene::{balloon_text, category_visible, wrap_text, Rect, TimelineScene};
use crate::view::ViewProperties;

const STRIP_LINE: Color = Color { r: 200, g: 200, b: 200 };
const NOW_LINE: Color = Color { r: 200, g: 40, b: 40 };
const DIVIDER_LINE: Color = Color { r: 120, g: 120, b: 120 };
const SELECTION: Color = Color { r: 255, g: 255, b: 0 };
const DEFAULT_EVENT: Color = Color { r: 160, g: 160, b: 160 };
const BALLOON_BACKGROUND: Color = Color { r: 255, g: 255, b: 231 };

/// Minimal drawing surface the host must provide. Coordinates are pixels
/// with the origin in the top-left corner.
pub trait Canvas {
    fn size(&self) -> (f64, f64);
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, x: f64, y: f64, text: &str, color: Color, background: Option<Color>);
    fn measure_text(&self, text: &str) -> f64;
}

pub fn draw(canvas: &mut dyn Canvas, db: &Db, vp: &ViewProperties, scene: &TimelineScene) {
    let (width, height) = canvas.size();
    draw_eras(canvas, db, scene, height);
    draw_strips(canvas, scene, height);
    draw_now_line(canvas, db, scene, height);
    canvas.draw_line(0.0, scene.metrics.divider_y, width, scene.metrics.divider_y, DIVIDER_LINE);
    draw_events(canvas, db, vp, scene);
    draw_legend(canvas, db, vp, height);
    draw_hidden_count(canvas, scene, width);
    draw_balloons(canvas, db, scene);
}

fn draw_strips(canvas: &mut dyn Canvas, scene: &TimelineScene, height: f64) {
    for period in &scene.minor_strip_data {
        let x = scene.metrics.x_for_time(period.start());
        canvas.draw_line(x, 0.0, x, height, STRIP_LINE);
        let label = scene.minor_strip.label(period.start(), false);
        let label_width = canvas.measure_text(&label);
        let center = x + scene.metrics.width_of_period(period) / 2.0;
        canvas.draw_text(center - label_width / 2.0, height - 1.0, &label, color::BLACK, None);
    }
    for period in &scene.major_strip_data {
        let label = scene.major_strip.label(period.start(), true);
        let label_width = canvas.measure_text(&label);
        // Keep the label readable while the strip is partly scrolled out.
        let visible_start = scene.metrics.x_for_time(period.start()).max(0.0);
        let visible_end = scene
            .metrics
            .x_for_time(period.end())
            .min(scene.metrics.width);
        let center = (visible_start + visible_end) / 2.0;
        canvas.draw_text(center - label_width / 2.0, 0.0, &label, color::BLACK, None);
    }
}

fn draw_now_line(canvas: &mut dyn Canvas, db: &Db, scene: &TimelineScene, height: f64) {
    if !db.time_type().is_date_time() {
        return;
    }
    let now = db.time_type().now();
    if scene.metrics.displayed.contains(now) {
        let x = scene.metrics.x_for_time(now);
        canvas.draw_line(x, 0.0, x, height, NOW_LINE);
    }
}

fn draw_eras(canvas: &mut dyn Canvas, db: &Db, scene: &TimelineScene, height: f64) {
    for (id, rect) in &scene.era_data {
        let Some(era) = db.eras().iter().find(|era| era.id == Some(*id)) else {
            continue;
        };
        canvas.fill_rect(*rect, era.color);
        let label_width = canvas.measure_text(&era.name);
        let center = rect.x + rect.width / 2.0;
        canvas.draw_text(center - label_width / 2.0, height - 2.0, &era.name, color::BLACK, None);
    }
}

fn draw_events(canvas: &mut dyn Canvas, db: &Db, vp: &ViewProperties, scene: &TimelineScene) {
    for (id, rect) in &scene.event_data {
        let Some(event) = db.event(*id) else { continue };
        let fill = event
            .category
            .and_then(|category| db.category(category))
            .map(|category| category.color)
            .unwrap_or(DEFAULT_EVENT);
        canvas.fill_rect(*rect, fill);
        if let Some(progress) = event.progress {
            let done = Rect::new(
                rect.x,
                rect.y,
                rect.width * f64::from(progress.min(100)) / 100.0,
                rect.height,
            );
            canvas.fill_rect(done, fill.darkened());
        }
        let border = if vp.is_selected(*id) { SELECTION } else { fill.darkened() };
        canvas.draw_rect(*rect, border);
        let label = event_label(event);
        canvas.draw_text(rect.x + 1.0, rect.y, &label, color::BLACK, Some(fill));
    }
}

/// Event text with fuzzy and locked markers prepended.
fn event_label(event: &Event) -> String {
    let mut label = String::new();
    if event.locked {
        label.push('\u{1F512}');
    }
    if event.fuzzy() {
        label.push('~');
    }
    label.push_str(&event.text);
    label
}

fn draw_legend(canvas: &mut dyn Canvas, db: &Db, vp: &ViewProperties, height: f64) {
    let mut row = 0.0;
    for category in db.categories().iter().rev() {
        let Some(id) = category.id else { continue };
        if !category_visible(db, vp, Some(id)) {
            continue;
        }
        let y = height - 3.0 - row;
        canvas.draw_text(0.0, y, "  ", color::BLACK, Some(category.color));
        canvas.draw_text(3.0, y, &category.name, color::BLACK, None);
        row += 1.0;
    }
}

fn draw_hidden_count(canvas: &mut dyn Canvas, scene: &TimelineScene, width: f64) {
    if scene.hidden_event_count == 0 {
        return;
    }
    let label = format!("+{} more", scene.hidden_event_count);
    let label_width = canvas.measure_text(&label);
    canvas.draw_text(width - label_width - 1.0, 0.0, &label, color::BLACK, None);
}

fn draw_balloons(canvas: &mut dyn Canvas, db: &Db, scene: &TimelineScene) {
    for (id, rect) in &scene.balloon_data {
        let Some(event) = db.event(*id) else { continue };
        let Some(event_rect) = scene.event_rect(*id) else { continue };
        canvas.fill_rect(*rect, BALLOON_BACKGROUND);
        canvas.draw_rect(*rect, color::BLACK);
        // Arrow stem pointing at the event.
        canvas.draw_line(
            rect.x + 1.0,
            rect.bottom(),
            event_rect.x + event_rect.width / 2.0,
            event_rect.y,
            color::BLACK,
        );
        let text = balloon_text(db, event);
        let lines = wrap_text(&text, rect.width - 2.0, &|t| canvas.measure_text(t));
        for (row, line) in lines.iter().enumerate() {
            canvas.draw_text(
                rect.x + 1.0,
                rect.y + 1.0 + row as f64,
                line,
                color::BLACK,
                Some(BALLOON_BACKGROUND),
            );
        }
    }
}
