/// Pointer-driven interaction state machine.
///
/// Owns the drag state, the balloon and auto-scroll timers and a queue of
/// requests for the host (open an editor, show a status message). Mutates
/// the db only when a drag commits; everything in between is preview state,
/// so cancellation is a plain state reset.
use std::time::{Duration, Instant};

use crate::calendar::valid_period;
use crate::config::Config;
use crate::db::Db;
use crate::error::Result;
use crate::model::EventId;
use crate::scene::TimelineScene;
use crate::time::{TimeDelta, TimePeriod};
use crate::timer::Timer;
use crate::view::ViewProperties;

/// Pixel distance from an event edge that starts a resize instead of a
/// move.
const RESIZE_EDGE_PX: f64 = 5.0;

/// What the host should do on behalf of the interaction layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    EditEvent(EventId),
    CreateEvent(TimePeriod),
    Status(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeEdge {
    Start,
    End,
}

enum DragState {
    Idle,
    Scrolling { last_x: f64 },
    Zooming { anchor_x: f64, current_x: f64 },
    Selecting { anchor_x: f64, current_x: f64 },
    Moving { id: EventId, preview: TimePeriod, grab_offset: TimeDelta },
    Resizing { id: EventId, edge: ResizeEdge, preview: TimePeriod },
}

pub struct Interaction {
    state: DragState,
    balloon_show: Timer,
    balloon_hide: Timer,
    pending_balloon: Option<EventId>,
    autoscroll: Timer,
    autoscroll_direction: i64,
    requests: Vec<Request>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            balloon_show: Timer::default(),
            balloon_hide: Timer::default(),
            pending_balloon: None,
            autoscroll: Timer::default(),
            autoscroll_direction: 0,
            requests: Vec::new(),
        }
    }
}

impl Interaction {
    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Event period being dragged, for preview rendering.
    pub fn drag_preview(&self) -> Option<(EventId, TimePeriod)> {
        match &self.state {
            DragState::Moving { id, preview, .. } => Some((*id, *preview)),
            DragState::Resizing { id, preview, .. } => Some((*id, *preview)),
            _ => None,
        }
    }

    /// Horizontal extent of an in-progress zoom or create drag.
    pub fn rubber_band(&self) -> Option<(f64, f64)> {
        match &self.state {
            DragState::Zooming { anchor_x, current_x }
            | DragState::Selecting { anchor_x, current_x } => {
                Some((anchor_x.min(*current_x), anchor_x.max(*current_x)))
            }
            _ => None,
        }
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    pub fn on_press(
        &mut self,
        x: f64,
        y: f64,
        modifiers: Modifiers,
        db: &Db,
        vp: &mut ViewProperties,
        scene: &TimelineScene,
    ) {
        self.balloon_show.cancel();
        self.balloon_hide.cancel();
        self.pending_balloon = None;

        if let Some(id) = scene.balloon_at(x, y) {
            vp.toggle_sticky(id);
            if vp.is_sticky(id) {
                vp.balloon_event = Some(id);
            } else if vp.balloon_event == Some(id) {
                vp.balloon_event = None;
            }
            return;
        }

        match scene.event_at(x, y) {
            Some(id) => {
                if vp.is_selected(id) {
                    let Some(rect) = scene.event_rect(id) else { return };
                    let Some(event) = db.event(id) else { return };
                    let period = event.period();
                    if x - rect.x <= RESIZE_EDGE_PX {
                        self.state =
                            DragState::Resizing { id, edge: ResizeEdge::Start, preview: period };
                    } else if rect.right() - x <= RESIZE_EDGE_PX {
                        self.state =
                            DragState::Resizing { id, edge: ResizeEdge::End, preview: period };
                    } else {
                        let grab_offset = scene.metrics.time_at_x(x) - period.start();
                        self.state = DragState::Moving { id, preview: period, grab_offset };
                    }
                } else {
                    vp.select(id, modifiers.ctrl);
                }
            }
            None => {
                if !modifiers.ctrl {
                    vp.clear_selection();
                }
                self.state = if modifiers.ctrl {
                    DragState::Selecting { anchor_x: x, current_x: x }
                } else if modifiers.shift {
                    DragState::Zooming { anchor_x: x, current_x: x }
                } else {
                    DragState::Scrolling { last_x: x }
                };
            }
        }
    }

    pub fn on_motion(
        &mut self,
        x: f64,
        y: f64,
        now: Instant,
        db: &Db,
        vp: &mut ViewProperties,
        scene: &TimelineScene,
        config: &Config,
    ) {
        if matches!(self.state, DragState::Idle) {
            self.update_hover(x, y, now, vp, scene, config);
            return;
        }
        match &mut self.state {
            DragState::Idle => {}
            DragState::Scrolling { last_x } => {
                let delta = scene.metrics.time_at_x(*last_x) - scene.metrics.time_at_x(x);
                *last_x = x;
                if let Some(displayed) = vp.displayed_period {
                    let bound = valid_period(db.time_type().as_ref());
                    vp.displayed_period =
                        Some(displayed.move_delta(delta).inside_period(&bound));
                }
            }
            DragState::Zooming { current_x, .. } | DragState::Selecting { current_x, .. } => {
                *current_x = x;
            }
            DragState::Moving { preview, grab_offset, .. } => {
                let cursor = scene.metrics.time_at_x(x);
                let length = preview.delta();
                let mut start = cursor - *grab_offset;
                // Snap whichever end sits closer to a strip boundary.
                let snapped_start = scene.snap(start, config.snap_distance);
                let snapped_end = scene.snap(start + length, config.snap_distance);
                if snapped_start != start {
                    start = snapped_start;
                } else if snapped_end != start + length {
                    start = snapped_end - length;
                }
                *preview = preview.move_delta(start - preview.start());
            }
            DragState::Resizing { edge, preview, .. } => {
                let cursor =
                    scene.snap(scene.metrics.time_at_x(x), config.snap_distance);
                let resized = match edge {
                    ResizeEdge::Start => {
                        TimePeriod::new(cursor.min(preview.end()), preview.end())
                    }
                    ResizeEdge::End => {
                        TimePeriod::new(preview.start(), cursor.max(preview.start()))
                    }
                };
                if let Ok(period) = resized {
                    *preview = period;
                }
            }
        }
        self.update_autoscroll(x, now, scene, config);
    }

    pub fn on_release(
        &mut self,
        db: &mut Db,
        vp: &mut ViewProperties,
        scene: &TimelineScene,
    ) {
        self.autoscroll.cancel();
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        match state {
            DragState::Idle | DragState::Scrolling { .. } => {}
            DragState::Zooming { anchor_x, current_x } => {
                let start = scene.metrics.time_at_x(anchor_x.min(current_x));
                let end = scene.metrics.time_at_x(anchor_x.max(current_x));
                let Ok(period) = TimePeriod::new(start, end) else { return };
                // Ranges smaller than the zoom floor are ignored.
                if period.delta() < db.time_type().min_zoom_delta() {
                    return;
                }
                let bound = valid_period(db.time_type().as_ref());
                vp.displayed_period = Some(period.inside_period(&bound));
            }
            DragState::Selecting { anchor_x, current_x } => {
                let a = scene.metrics.time_at_x(anchor_x.min(current_x));
                let b = scene.metrics.time_at_x(anchor_x.max(current_x));
                let strip = scene.minor_strip.as_ref();
                // Only a drag that crossed a strip boundary creates.
                if strip.start(a) == strip.start(b) {
                    return;
                }
                let start = strip.start(a);
                let end = if b == strip.start(b) { b } else { strip.increment(strip.start(b)) };
                if let Ok(period) = TimePeriod::new(start, end) {
                    self.requests.push(Request::CreateEvent(period));
                }
            }
            DragState::Moving { id, preview, .. }
            | DragState::Resizing { id, preview, .. } => {
                self.commit_drag(db, id, preview);
            }
        }
    }

    /// Escape or window deactivation: drop any in-progress drag without
    /// touching the db.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        self.autoscroll.cancel();
        self.balloon_show.cancel();
        self.pending_balloon = None;
    }

    pub fn on_middle_click(&mut self, x: f64, db: &Db, vp: &mut ViewProperties, scene: &TimelineScene) {
        let Some(displayed) = vp.displayed_period else { return };
        let bound = valid_period(db.time_type().as_ref());
        let time = scene.metrics.time_at_x(x);
        vp.displayed_period = Some(displayed.center(time).inside_period(&bound));
    }

    pub fn on_double_click(&mut self, x: f64, y: f64, scene: &TimelineScene) {
        match scene.event_at(x, y) {
            Some(id) => self.requests.push(Request::EditEvent(id)),
            None => {
                let time = scene.metrics.time_at_x(x);
                self.requests.push(Request::CreateEvent(TimePeriod::point(time)));
            }
        }
    }

    /// `steps` is positive for wheel-up.
    pub fn on_wheel(
        &mut self,
        x: f64,
        steps: i64,
        modifiers: Modifiers,
        db: &Db,
        vp: &mut ViewProperties,
        scene: &TimelineScene,
    ) {
        if modifiers.ctrl {
            let ratio = (x / scene.metrics.width).clamp(0.0, 1.0);
            self.zoom(db, vp, steps, ratio);
        } else if modifiers.shift {
            vp.divider_fraction = (vp.divider_fraction - 0.05 * steps as f64).clamp(0.0, 1.0);
        } else if modifiers.alt {
            vp.event_height = (vp.event_height + steps as f64).clamp(1.0, 10.0);
        } else {
            self.scroll_page(db, vp, -steps);
        }
    }

    pub fn on_tick(&mut self, now: Instant, db: &Db, vp: &mut ViewProperties) {
        if self.balloon_show.fire(now) {
            if let Some(id) = self.pending_balloon.take() {
                if vp.hovered_event == Some(id) {
                    vp.balloon_event = Some(id);
                }
            }
        }
        if self.balloon_hide.fire(now) {
            if let Some(id) = vp.balloon_event {
                if !vp.is_sticky(id) {
                    vp.balloon_event = None;
                }
            }
        }
        if self.autoscroll.fire(now) {
            let direction = self.autoscroll_direction;
            self.scroll_page(db, vp, direction);
        }
    }

    /// Apply a navigation function to the displayed period. Out-of-range
    /// navigation keeps the period and posts a status message instead.
    pub fn navigate(
        &mut self,
        func: fn(&TimePeriod) -> Result<TimePeriod>,
        db: &Db,
        vp: &mut ViewProperties,
    ) {
        let Some(displayed) = vp.displayed_period else { return };
        match func(&displayed) {
            Ok(period) => {
                let bound = valid_period(db.time_type().as_ref());
                vp.displayed_period = Some(period.inside_period(&bound));
            }
            Err(error) => self.status(error.to_string()),
        }
    }

    pub fn zoom(&mut self, db: &Db, vp: &mut ViewProperties, times: i64, ratio: f64) {
        let Some(displayed) = vp.displayed_period else { return };
        match displayed.zoom_at(times, ratio) {
            Ok(zoomed) => {
                let time_type = db.time_type();
                if zoomed.delta() < time_type.min_zoom_delta() {
                    self.status("Can't zoom in further".to_string());
                    return;
                }
                if let Some(max) = time_type.max_zoom_delta() {
                    if zoomed.delta() > max {
                        self.status("Can't zoom out further".to_string());
                        return;
                    }
                }
                let bound = valid_period(time_type.as_ref());
                vp.displayed_period = Some(zoomed.inside_period(&bound));
            }
            Err(error) => self.status(error.to_string()),
        }
    }

    fn scroll_page(&mut self, db: &Db, vp: &mut ViewProperties, direction: i64) {
        let Some(displayed) = vp.displayed_period else { return };
        let bound = valid_period(db.time_type().as_ref());
        vp.displayed_period = Some(displayed.move_page(direction).inside_period(&bound));
    }

    fn commit_drag(&mut self, db: &mut Db, id: EventId, preview: TimePeriod) {
        let Some(event) = db.event(id) else { return };
        if event.locked {
            self.status("Event is locked".to_string());
            return;
        }
        if event.period() == preview {
            return;
        }
        let mut updated = event.clone();
        updated.set_period(preview);
        if let Err(error) = db.save_event(updated) {
            self.status(error.to_string());
        }
    }

    fn update_hover(
        &mut self,
        x: f64,
        y: f64,
        now: Instant,
        vp: &mut ViewProperties,
        scene: &TimelineScene,
        config: &Config,
    ) {
        // The balloon itself counts as hovering its event.
        let hovered = scene.event_at(x, y).or_else(|| scene.balloon_at(x, y));
        if hovered == vp.hovered_event {
            return;
        }
        vp.hovered_event = hovered;
        match hovered {
            Some(id) => {
                self.balloon_hide.cancel();
                if vp.balloon_event != Some(id) {
                    self.pending_balloon = Some(id);
                    self.balloon_show
                        .start(now, Duration::from_millis(config.balloon_show_delay_ms));
                }
            }
            None => {
                self.balloon_show.cancel();
                self.pending_balloon = None;
                if let Some(shown) = vp.balloon_event {
                    if !vp.is_sticky(shown) {
                        self.balloon_hide
                            .start(now, Duration::from_millis(config.balloon_hide_delay_ms));
                    }
                }
            }
        }
    }

    fn update_autoscroll(&mut self, x: f64, now: Instant, scene: &TimelineScene, config: &Config) {
        let direction = if x < config.autoscroll_margin {
            -1
        } else if x > scene.metrics.width - config.autoscroll_margin {
            1
        } else {
            0
        };
        if direction == 0 {
            self.autoscroll.cancel();
        } else {
            self.autoscroll_direction = direction;
            if !self.autoscroll.is_running() {
                self.autoscroll
                    .start_repeating(now, Duration::from_millis(config.autoscroll_interval_ms));
            }
        }
    }

    fn status(&mut self, message: String) {
        self.requests.push(Request::Status(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian_time_type;
    use crate::model::Event;
    use crate::time::Time;

    struct Fixture {
        db: Db,
        vp: ViewProperties,
        config: Config,
        interaction: Interaction,
    }

    fn period(start: i64, end: i64) -> TimePeriod {
        TimePeriod::new(Time::new(start, 0), Time::new(end, 0)).unwrap()
    }

    fn fixture(displayed: TimePeriod) -> Fixture {
        let db = Db::new(gregorian_time_type());
        let mut vp = ViewProperties::new(0.5, 1.0);
        vp.displayed_period = Some(displayed);
        Fixture { db, vp, config: Config::default(), interaction: Interaction::default() }
    }

    fn scene(fixture: &Fixture) -> TimelineScene {
        TimelineScene::build(
            &fixture.db,
            &fixture.vp,
            &fixture.config,
            fixture.vp.displayed_period.unwrap(),
            100.0,
            40.0,
            &|text| text.chars().count() as f64,
        )
    }

    #[test]
    fn plain_press_on_empty_canvas_scrolls() {
        let mut f = fixture(period(0, 10));
        let scene = scene(&f);
        f.interaction.on_press(50.0, 5.0, Modifiers::default(), &f.db, &mut f.vp, &scene);
        assert!(f.interaction.is_dragging());
        f.interaction
            .on_motion(40.0, 5.0, Instant::now(), &f.db, &mut f.vp, &scene, &f.config);
        // Dragging 10 px left on a 10-day span scrolls one day forward.
        assert_eq!(f.vp.displayed_period.unwrap(), period(1, 11));
        f.interaction.on_release(&mut f.db, &mut f.vp, &scene);
        assert!(!f.interaction.is_dragging());
    }

    #[test]
    fn ctrl_drag_across_strips_requests_snapped_creation() {
        let mut f = fixture(period(0, 2));
        let scene = scene(&f);
        let modifiers = Modifiers { ctrl: true, ..Modifiers::default() };
        f.interaction.on_press(10.0, 5.0, modifiers, &f.db, &mut f.vp, &scene);
        f.interaction
            .on_motion(80.0, 5.0, Instant::now(), &f.db, &mut f.vp, &scene, &f.config);
        f.interaction.on_release(&mut f.db, &mut f.vp, &scene);
        // 10 px = day 0 at 04:48, 80 px = day 1 at 14:24; snapped outward.
        assert_eq!(
            f.interaction.take_requests(),
            vec![Request::CreateEvent(period(0, 2))]
        );
    }

    #[test]
    fn tiny_ctrl_drag_creates_nothing() {
        let mut f = fixture(period(0, 2));
        let scene = scene(&f);
        let modifiers = Modifiers { ctrl: true, ..Modifiers::default() };
        f.interaction.on_press(10.0, 5.0, modifiers, &f.db, &mut f.vp, &scene);
        f.interaction
            .on_motion(12.0, 5.0, Instant::now(), &f.db, &mut f.vp, &scene, &f.config);
        f.interaction.on_release(&mut f.db, &mut f.vp, &scene);
        assert!(f.interaction.take_requests().is_empty());
    }

    #[test]
    fn shift_drag_zooms_to_selection() {
        let mut f = fixture(period(0, 10));
        let scene = scene(&f);
        let modifiers = Modifiers { shift: true, ..Modifiers::default() };
        f.interaction.on_press(20.0, 5.0, modifiers, &f.db, &mut f.vp, &scene);
        f.interaction
            .on_motion(60.0, 5.0, Instant::now(), &f.db, &mut f.vp, &scene, &f.config);
        f.interaction.on_release(&mut f.db, &mut f.vp, &scene);
        assert_eq!(f.vp.displayed_period.unwrap(), period(2, 6));
    }

    #[test]
    fn shift_drag_below_zoom_floor_is_ignored() {
        let mut f = fixture(period(0, 10));
        let scene = scene(&f);
        let modifiers = Modifiers { shift: true, ..Modifiers::default() };
        f.interaction.on_press(20.0, 5.0, modifiers, &f.db, &mut f.vp, &scene);
        // 0.1 px on a 10-day span is far below the one-hour floor.
        f.interaction
            .on_motion(20.1, 5.0, Instant::now(), &f.db, &mut f.vp, &scene, &f.config);
        f.interaction.on_release(&mut f.db, &mut f.vp, &scene);
        assert_eq!(f.vp.displayed_period.unwrap(), period(0, 10));
    }

    #[test]
    fn press_selects_then_drag_moves_and_commits() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "task")).unwrap();
        let built = scene(&f);
        // First press selects.
        f.interaction.on_press(35.0, 20.5, Modifiers::default(), &f.db, &mut f.vp, &built);
        assert!(f.vp.is_selected(id));
        assert!(!f.interaction.is_dragging());
        // Second press grabs; moving 20 px right is two days.
        f.interaction.on_press(35.0, 20.5, Modifiers::default(), &f.db, &mut f.vp, &built);
        assert!(f.interaction.is_dragging());
        f.interaction
            .on_motion(55.0, 20.5, Instant::now(), &f.db, &mut f.vp, &built, &f.config);
        assert_eq!(f.interaction.drag_preview().unwrap().1, period(4, 7));
        // Db is untouched until release.
        assert_eq!(f.db.event(id).unwrap().period(), period(2, 5));
        f.interaction.on_release(&mut f.db, &mut f.vp, &built);
        assert_eq!(f.db.event(id).unwrap().period(), period(4, 7));
    }

    #[test]
    fn resize_from_right_edge_commits_new_end() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "task")).unwrap();
        f.vp.select(id, false);
        let built = scene(&f);
        // Event spans x 20..50; press within 5 px of the right edge.
        f.interaction.on_press(48.0, 20.5, Modifiers::default(), &f.db, &mut f.vp, &built);
        f.interaction
            .on_motion(70.0, 20.5, Instant::now(), &f.db, &mut f.vp, &built, &f.config);
        f.interaction.on_release(&mut f.db, &mut f.vp, &built);
        assert_eq!(f.db.event(id).unwrap().period(), period(2, 7));
    }

    #[test]
    fn locked_event_rejects_drag_commit() {
        let mut f = fixture(period(0, 10));
        let mut event = Event::new(period(2, 5), "frozen");
        event.locked = true;
        let id = f.db.save_event(event).unwrap();
        f.vp.select(id, false);
        let built = scene(&f);
        f.interaction.on_press(35.0, 20.5, Modifiers::default(), &f.db, &mut f.vp, &built);
        f.interaction
            .on_motion(55.0, 20.5, Instant::now(), &f.db, &mut f.vp, &built, &f.config);
        f.interaction.on_release(&mut f.db, &mut f.vp, &built);
        assert_eq!(f.db.event(id).unwrap().period(), period(2, 5));
        assert_eq!(
            f.interaction.take_requests(),
            vec![Request::Status("Event is locked".to_string())]
        );
    }

    #[test]
    fn escape_cancels_drag_without_mutation() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "task")).unwrap();
        f.vp.select(id, false);
        let built = scene(&f);
        f.interaction.on_press(35.0, 20.5, Modifiers::default(), &f.db, &mut f.vp, &built);
        f.interaction
            .on_motion(55.0, 20.5, Instant::now(), &f.db, &mut f.vp, &built, &f.config);
        f.interaction.cancel();
        assert!(!f.interaction.is_dragging());
        assert_eq!(f.db.event(id).unwrap().period(), period(2, 5));
    }

    #[test]
    fn middle_click_centers_displayed_period() {
        let mut f = fixture(period(0, 10));
        let built = scene(&f);
        f.interaction.on_middle_click(80.0, &f.db, &mut f.vp, &built);
        assert_eq!(f.vp.displayed_period.unwrap(), period(3, 13));
    }

    #[test]
    fn double_click_requests_edit_or_create() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "task")).unwrap();
        let built = scene(&f);
        f.interaction.on_double_click(35.0, 20.5, &built);
        f.interaction.on_double_click(90.0, 5.0, &built);
        let requests = f.interaction.take_requests();
        assert_eq!(requests[0], Request::EditEvent(id));
        assert_eq!(
            requests[1],
            Request::CreateEvent(TimePeriod::point(Time::new(9, 0)))
        );
    }

    #[test]
    fn wheel_scrolls_zooms_and_moves_divider() {
        let mut f = fixture(period(0, 10));
        let built = scene(&f);
        f.interaction.on_wheel(50.0, -1, Modifiers::default(), &f.db, &mut f.vp, &built);
        assert_eq!(f.vp.displayed_period.unwrap(), period(1, 11));
        let shift = Modifiers { shift: true, ..Modifiers::default() };
        f.interaction.on_wheel(50.0, 1, shift, &f.db, &mut f.vp, &built);
        assert!((f.vp.divider_fraction - 0.45).abs() < 1e-9);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
        f.interaction.on_wheel(50.0, 1, ctrl, &f.db, &mut f.vp, &built);
        assert!(f.vp.displayed_period.unwrap().delta() < TimeDelta::from_days(10));
    }

    #[test]
    fn zoom_below_floor_posts_status() {
        let mut f = fixture(TimePeriod::new(Time::new(0, 0), Time::new(0, 3_700)).unwrap());
        f.interaction.zoom(&f.db, &mut f.vp, 1, 0.5);
        // 3700 s shrunk by 2/5 lands under the one-hour floor; refused.
        assert_eq!(
            f.vp.displayed_period.unwrap(),
            TimePeriod::new(Time::new(0, 0), Time::new(0, 3_700)).unwrap()
        );
        assert!(matches!(
            f.interaction.take_requests().as_slice(),
            [Request::Status(_)]
        ));
    }

    #[test]
    fn balloon_shows_after_delay_and_hides_after_leaving() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "hover me")).unwrap();
        let built = scene(&f);
        let t0 = Instant::now();
        f.interaction.on_motion(35.0, 20.5, t0, &f.db, &mut f.vp, &built, &f.config);
        assert_eq!(f.vp.hovered_event, Some(id));
        assert_eq!(f.vp.balloon_event, None);
        f.interaction.on_tick(t0 + Duration::from_millis(501), &f.db, &mut f.vp);
        assert_eq!(f.vp.balloon_event, Some(id));
        // Leaving arms the hide timer.
        f.interaction
            .on_motion(90.0, 5.0, t0 + Duration::from_millis(600), &f.db, &mut f.vp, &built, &f.config);
        f.interaction.on_tick(t0 + Duration::from_millis(701), &f.db, &mut f.vp);
        assert_eq!(f.vp.balloon_event, None);
    }

    #[test]
    fn reentering_event_cancels_balloon_hide() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "hover me")).unwrap();
        let built = scene(&f);
        let t0 = Instant::now();
        f.interaction.on_motion(35.0, 20.5, t0, &f.db, &mut f.vp, &built, &f.config);
        f.interaction.on_tick(t0 + Duration::from_millis(501), &f.db, &mut f.vp);
        f.interaction
            .on_motion(90.0, 5.0, t0 + Duration::from_millis(600), &f.db, &mut f.vp, &built, &f.config);
        f.interaction
            .on_motion(35.0, 20.5, t0 + Duration::from_millis(650), &f.db, &mut f.vp, &built, &f.config);
        f.interaction.on_tick(t0 + Duration::from_millis(800), &f.db, &mut f.vp);
        assert_eq!(f.vp.balloon_event, Some(id));
    }

    #[test]
    fn autoscroll_near_edge_scrolls_on_tick() {
        let mut f = fixture(period(0, 10));
        let id = f.db.save_event(Event::new(period(2, 5), "task")).unwrap();
        f.vp.select(id, false);
        let built = scene(&f);
        let t0 = Instant::now();
        f.interaction.on_press(35.0, 20.5, Modifiers::default(), &f.db, &mut f.vp, &built);
        // Drag into the right auto-scroll margin.
        f.interaction.on_motion(95.0, 20.5, t0, &f.db, &mut f.vp, &built, &f.config);
        f.interaction.on_tick(t0 + Duration::from_millis(301), &f.db, &mut f.vp);
        assert_eq!(f.vp.displayed_period.unwrap(), period(1, 11));
    }
}
