use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::{AppEvent, InputPopup, InputPurpose, NavigateMenu, Popup};
use crate::calendar::{NavigationItem, valid_period};
use crate::color::random_color;
use crate::config::Config;
use crate::db::Db;
use crate::interaction::{Interaction, Modifiers, Request};
use crate::model::{Category, Event, EventId};
use crate::scene::TimelineScene;
use crate::time::{Time, TimeDelta, TimePeriod};
use crate::ui::canvas::measure_text;
use crate::view::ViewProperties;
use crate::xml;

/// Two clicks on the same cell within this window count as a double click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

pub struct App {
    pub running: bool,
    pub db: Db,
    pub view: ViewProperties,
    pub config: Config,
    pub interaction: Interaction,
    /// Scene built for the current frame; mouse hit-tests go against it.
    pub scene: Option<TimelineScene>,
    pub status: Option<String>,
    pub popup: Option<Popup>,
    path: Option<PathBuf>,
    last_click: Option<(Instant, u16, u16)>,
}

impl App {
    pub fn new(mut db: Db, config: Config, path: Option<PathBuf>) -> Self {
        let mut view = ViewProperties::new(config.divider_fraction, config.event_height);
        db.load_view_properties(&mut view);
        if view.displayed_period.is_none() {
            view.displayed_period = Some(default_displayed(&db));
        }
        if let Some(path) = &path {
            let target = path.clone();
            db.set_save_callback(Rc::new(move |db| {
                if let Err(error) = xml::save_timeline(db, &target) {
                    log::error!("saving {} failed: {error}", target.display());
                }
            }));
        }
        Self {
            running: true,
            db,
            view,
            config,
            interaction: Interaction::default(),
            scene: None,
            status: None,
            popup: None,
            path,
            last_click: None,
        }
    }

    /// Rebuild the scene for a terminal of the given size. The bottom row is
    /// reserved for the status bar.
    pub fn prepare_frame(&mut self, width: u16, height: u16) {
        self.view.prune(&self.db);
        let displayed = match self.view.displayed_period {
            Some(displayed) => displayed,
            None => {
                let displayed = default_displayed(&self.db);
                self.view.displayed_period = Some(displayed);
                displayed
            }
        };
        let canvas_height = f64::from(height.saturating_sub(1).max(1));
        self.scene = Some(TimelineScene::build(
            &self.db,
            &self.view,
            &self.config,
            displayed,
            f64::from(width.max(1)),
            canvas_height,
            &measure_text,
        ));
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {
                self.interaction.on_tick(Instant::now(), &self.db, &mut self.view);
                self.drain_requests();
            }
            AppEvent::KeyPress(code) => self.handle_key(code),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Resize => {}
            AppEvent::FocusLost => self.interaction.cancel(),
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.popup.is_some() {
            self.handle_popup_key(code);
            return;
        }
        self.status = None;
        match code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => {
                if self.interaction.is_dragging() {
                    self.interaction.cancel();
                } else {
                    self.view.clear_selection();
                    self.view.balloon_event = None;
                }
            }
            KeyCode::Char('u') => {
                if !self.reject_readonly() && !self.db.undo() {
                    self.status = Some("Nothing to undo".to_string());
                }
            }
            KeyCode::Char('r') => {
                if !self.reject_readonly() && !self.db.redo() {
                    self.status = Some("Nothing to redo".to_string());
                }
            }
            KeyCode::Char('g') => {
                self.popup = Some(Popup::Input(InputPopup {
                    title: "Go to time",
                    purpose: InputPurpose::GoTo,
                    value: String::new(),
                }));
            }
            KeyCode::Char('/') => {
                self.popup = Some(Popup::Input(InputPopup {
                    title: "Search",
                    purpose: InputPurpose::Search,
                    value: String::new(),
                }));
            }
            KeyCode::Char('n') => {
                let items = self.db.time_type().navigation_functions();
                self.popup = Some(Popup::Navigate(NavigateMenu::new(items)));
            }
            KeyCode::Char('t') => {
                let now = self.db.time_type().now();
                self.center_on(now);
            }
            KeyCode::Char('c') => {
                if let Some(displayed) = self.view.displayed_period {
                    self.popup = Some(Popup::Input(InputPopup {
                        title: "New event",
                        purpose: InputPurpose::CreateEvent(TimePeriod::point(
                            displayed.mean_time(),
                        )),
                        value: String::new(),
                    }));
                }
            }
            KeyCode::Char('C') => {
                self.popup = Some(Popup::Input(InputPopup {
                    title: "New category",
                    purpose: InputPurpose::CreateCategory,
                    value: String::new(),
                }));
            }
            KeyCode::Char('i') => {
                self.popup = Some(Popup::Input(InputPopup {
                    title: "Import timeline from path",
                    purpose: InputPurpose::Import,
                    value: String::new(),
                }));
            }
            KeyCode::Left => self.scroll(-1),
            KeyCode::Right => self.scroll(1),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.interaction.zoom(&self.db, &mut self.view, 1, 0.5);
                self.drain_requests();
            }
            KeyCode::Char('-') => {
                self.interaction.zoom(&self.db, &mut self.view, -1, 0.5);
                self.drain_requests();
            }
            KeyCode::Char('d') => self.duplicate_selected(),
            KeyCode::Char('x') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('s') => self.save_now(),
            _ => {}
        }
    }

    fn handle_popup_key(&mut self, code: KeyCode) {
        let Some(popup) = self.popup.take() else { return };
        match popup {
            Popup::Input(mut input) => match code {
                KeyCode::Esc => {}
                KeyCode::Enter => self.commit_input(input),
                KeyCode::Backspace => {
                    input.value.pop();
                    self.popup = Some(Popup::Input(input));
                }
                KeyCode::Char(c) => {
                    input.value.push(c);
                    self.popup = Some(Popup::Input(input));
                }
                _ => self.popup = Some(Popup::Input(input)),
            },
            Popup::Navigate(mut menu) => match code {
                KeyCode::Esc => {}
                KeyCode::Up => {
                    menu.select_prev();
                    self.popup = Some(Popup::Navigate(menu));
                }
                KeyCode::Down => {
                    menu.select_next();
                    self.popup = Some(Popup::Navigate(menu));
                }
                KeyCode::Enter => {
                    if let Some(NavigationItem::Entry { func, .. }) =
                        menu.items.get(menu.selected)
                    {
                        let func = *func;
                        self.interaction.navigate(func, &self.db, &mut self.view);
                        self.drain_requests();
                    }
                }
                _ => self.popup = Some(Popup::Navigate(menu)),
            },
        }
    }

    fn commit_input(&mut self, input: InputPopup) {
        let value = input.value.trim().to_string();
        match input.purpose {
            InputPurpose::CreateEvent(period) => {
                if value.is_empty() || self.reject_readonly() {
                    return;
                }
                match self.db.save_event(Event::new(period, value)) {
                    Ok(id) => self.view.select(id, false),
                    Err(error) => self.status = Some(error.to_string()),
                }
            }
            InputPurpose::EditEvent(id) => {
                if self.reject_readonly() {
                    return;
                }
                let Some(mut event) = self.db.event(id).cloned() else { return };
                event.text = input.value;
                if let Err(error) = self.db.save_event(event) {
                    self.status = Some(error.to_string());
                }
            }
            InputPurpose::CreateCategory => {
                if value.is_empty() || self.reject_readonly() {
                    return;
                }
                match self.db.save_category(Category::new(value, random_color(), None)) {
                    Ok(_) => {}
                    Err(error) => self.status = Some(error.to_string()),
                }
            }
            InputPurpose::GoTo => {
                let time_type = self.db.time_type().clone();
                match time_type.parse_time(&value) {
                    Ok(time) => self.center_on(time),
                    Err(error) => self.status = Some(error.to_string()),
                }
            }
            InputPurpose::Import => {
                if value.is_empty() || self.reject_readonly() {
                    return;
                }
                let result = xml::load_timeline(std::path::Path::new(&value))
                    .and_then(|other| self.db.import_db(&other, None));
                self.status = Some(match result {
                    Ok(()) => format!("Imported {value}"),
                    Err(error) => error.to_string(),
                });
            }
            InputPurpose::Search => {
                let matches: Vec<(EventId, Time)> = self
                    .db
                    .search(&value)
                    .iter()
                    .filter_map(|event| event.id.map(|id| (id, event.mean_time())))
                    .collect();
                match matches.first() {
                    Some(&(id, time)) => {
                        self.view.select(id, false);
                        self.center_on(time);
                        self.status = Some(format!("{} match(es) for \"{value}\"", matches.len()));
                    }
                    None => self.status = Some(format!("No matches for \"{value}\"")),
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(scene) = self.scene.take() else { return };
        let x = f64::from(mouse.column);
        let y = f64::from(mouse.row);
        let modifiers = to_modifiers(mouse.modifiers);
        let now = Instant::now();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.is_double_click(now, mouse.column, mouse.row) {
                    self.interaction.on_double_click(x, y, &scene);
                } else {
                    self.interaction
                        .on_press(x, y, modifiers, &self.db, &mut self.view, &scene);
                }
            }
            MouseEventKind::Down(MouseButton::Middle) => {
                self.interaction
                    .on_middle_click(x, &self.db, &mut self.view, &scene);
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.interaction
                    .on_motion(x, y, now, &self.db, &mut self.view, &scene, &self.config);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.db.is_readonly() && self.interaction.drag_preview().is_some() {
                    self.interaction.cancel();
                    self.status = Some("Timeline is read-only".to_string());
                } else {
                    self.interaction.on_release(&mut self.db, &mut self.view, &scene);
                }
            }
            MouseEventKind::ScrollUp => {
                self.interaction
                    .on_wheel(x, 1, modifiers, &self.db, &mut self.view, &scene);
            }
            MouseEventKind::ScrollDown => {
                self.interaction
                    .on_wheel(x, -1, modifiers, &self.db, &mut self.view, &scene);
            }
            _ => {}
        }
        self.scene = Some(scene);
        self.drain_requests();
    }

    fn is_double_click(&mut self, now: Instant, column: u16, row: u16) -> bool {
        let double = matches!(
            self.last_click,
            Some((at, c, r)) if c == column && r == row && now - at <= DOUBLE_CLICK_WINDOW
        );
        self.last_click = if double { None } else { Some((now, column, row)) };
        double
    }

    /// Turn interaction requests into popups and status messages.
    fn drain_requests(&mut self) {
        for request in self.interaction.take_requests() {
            match request {
                Request::EditEvent(_) | Request::CreateEvent(_) if self.db.is_locked() => {
                    self.status = Some("Timeline is locked".to_string());
                }
                Request::EditEvent(id) => {
                    let value = self
                        .db
                        .event(id)
                        .map(|event| event.text.clone())
                        .unwrap_or_default();
                    self.popup = Some(Popup::Input(InputPopup {
                        title: "Edit event",
                        purpose: InputPurpose::EditEvent(id),
                        value,
                    }));
                }
                Request::CreateEvent(period) => {
                    self.popup = Some(Popup::Input(InputPopup {
                        title: "New event",
                        purpose: InputPurpose::CreateEvent(period),
                        value: String::new(),
                    }));
                }
                Request::Status(message) => self.status = Some(message),
            }
        }
    }

    fn scroll(&mut self, direction: i64) {
        let Some(displayed) = self.view.displayed_period else { return };
        let bound = valid_period(self.db.time_type().as_ref());
        self.view.displayed_period = Some(displayed.move_page(direction).inside_period(&bound));
    }

    fn center_on(&mut self, time: Time) {
        let Some(displayed) = self.view.displayed_period else { return };
        let bound = valid_period(self.db.time_type().as_ref());
        self.view.displayed_period = Some(displayed.center(time).inside_period(&bound));
    }

    /// Mutating commands on a read-only timeline only report a status.
    fn reject_readonly(&mut self) -> bool {
        if self.db.is_readonly() {
            self.status = Some("Timeline is read-only".to_string());
        }
        self.db.is_readonly()
    }

    fn duplicate_selected(&mut self) {
        if self.reject_readonly() {
            return;
        }
        let functions = self.db.time_type().duplicate_functions();
        let Some(rule) = functions.first() else {
            self.status = Some("No duplicate rule for this calendar".to_string());
            return;
        };
        let ids: Vec<EventId> = self.view.selected_ids().collect();
        if ids.is_empty() {
            self.status = Some("Nothing selected".to_string());
            return;
        }
        let mut created = 0;
        for id in ids {
            let Some(original) = self.db.event(id).cloned() else { continue };
            if original.is_container() {
                continue;
            }
            let Some(period) = (rule.func)(&original.period(), 1) else {
                self.status = Some(format!("{}: no valid target date", rule.label));
                continue;
            };
            // The copy starts unlocked so its period can be set.
            let mut copy = original;
            copy.id = None;
            copy.locked = false;
            copy.set_period(period);
            match self.db.save_event(copy) {
                Ok(_) => created += 1,
                Err(error) => self.status = Some(error.to_string()),
            }
        }
        if created > 0 {
            self.status = Some(format!("Duplicated {created} event(s)"));
        }
    }

    fn delete_selected(&mut self) {
        if self.reject_readonly() {
            return;
        }
        let ids: Vec<EventId> = self.view.selected_ids().collect();
        if ids.is_empty() {
            self.status = Some("Nothing selected".to_string());
            return;
        }
        // A single batch: cascades may remove other selected ids before
        // their turn comes, and only one save should happen at the end.
        self.db.disable_save();
        let mut deleted = 0;
        for id in ids {
            if self.db.event(id).is_none() {
                continue;
            }
            match self.db.delete_event(id, true) {
                Ok(()) => deleted += 1,
                Err(error) => self.status = Some(error.to_string()),
            }
        }
        self.db.enable_save(true);
        if deleted > 0 {
            self.status = Some(format!("Deleted {deleted} event(s)"));
        }
    }

    fn save_now(&mut self) {
        let Some(path) = self.path.clone() else {
            self.status = Some("No file to save to".to_string());
            return;
        };
        self.store_view_properties();
        match xml::save_timeline(&self.db, &path) {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(error) => self.status = Some(error.to_string()),
        }
    }

    fn quit(&mut self) {
        if self.path.is_some() && !self.db.is_readonly() {
            self.store_view_properties();
        }
        self.running = false;
    }

    fn store_view_properties(&mut self) {
        let view = self.view.clone();
        if let Err(error) = self.db.save_view_properties(&view) {
            log::warn!("view properties not saved: {error}");
        }
    }
}

fn to_modifiers(modifiers: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        shift: modifiers.contains(KeyModifiers::SHIFT),
        alt: modifiers.contains(KeyModifiers::ALT),
    }
}

/// Initial view for a timeline without a stored displayed period: all
/// events with a margin, or a month around now when there are none.
fn default_displayed(db: &Db) -> TimePeriod {
    let bound = valid_period(db.time_type().as_ref());
    let period = match (db.first_event(), db.last_event()) {
        (Some(first), Some(last)) => {
            let span = first.period().extend_to_include(&last.period());
            if span.is_point() {
                TimePeriod::new(
                    span.start() - TimeDelta::from_days(1),
                    span.start() + TimeDelta::from_days(1),
                )
            } else {
                TimePeriod::new(
                    span.start() - span.delta().margin(),
                    span.end() + span.delta().margin(),
                )
            }
        }
        _ => {
            let now = db.time_type().now();
            TimePeriod::new(now - TimeDelta::from_days(15), now + TimeDelta::from_days(15))
        }
    };
    period.unwrap_or(bound).inside_period(&bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian_time_type;

    fn day_period(start: i64, end: i64) -> TimePeriod {
        TimePeriod::new(Time::new(start, 0), Time::new(end, 0)).unwrap()
    }

    fn app_with(db: Db) -> App {
        App::new(db, Config::default(), None)
    }

    #[test]
    fn default_view_covers_all_events_with_margin() {
        let mut db = Db::new(gregorian_time_type());
        db.save_event(Event::new(day_period(100, 110), "a")).unwrap();
        db.save_event(Event::new(day_period(150, 160), "b")).unwrap();
        let displayed = default_displayed(&db);
        assert!(displayed.start() < Time::new(100, 0));
        assert!(displayed.end() > Time::new(160, 0));
    }

    #[test]
    fn typing_into_the_create_popup_saves_an_event() {
        let mut app = app_with(Db::new(gregorian_time_type()));
        app.popup = Some(Popup::Input(InputPopup {
            title: "New event",
            purpose: InputPurpose::CreateEvent(day_period(5, 6)),
            value: String::new(),
        }));
        for c in "party".chars() {
            app.update(AppEvent::KeyPress(KeyCode::Char(c)));
        }
        app.update(AppEvent::KeyPress(KeyCode::Enter));
        assert!(app.popup.is_none());
        let events = app.db.all_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "party");
        assert!(app.view.is_selected(events[0].id.unwrap()));
    }

    #[test]
    fn escape_discards_the_popup() {
        let mut app = app_with(Db::new(gregorian_time_type()));
        app.popup = Some(Popup::Input(InputPopup {
            title: "New event",
            purpose: InputPurpose::CreateEvent(day_period(5, 6)),
            value: "half typed".to_string(),
        }));
        app.update(AppEvent::KeyPress(KeyCode::Esc));
        assert!(app.popup.is_none());
        assert!(app.db.all_events().is_empty());
    }

    #[test]
    fn delete_key_removes_the_selection_in_one_batch() {
        let mut db = Db::new(gregorian_time_type());
        let a = db.save_event(Event::new(day_period(1, 2), "a")).unwrap();
        let b = db.save_event(Event::new(day_period(3, 4), "b")).unwrap();
        db.save_event(Event::new(day_period(5, 6), "keep")).unwrap();
        let mut app = app_with(db);
        app.view.select(a, false);
        app.view.select(b, true);
        app.update(AppEvent::KeyPress(KeyCode::Delete));
        assert_eq!(app.db.all_events().len(), 1);
        assert_eq!(app.db.all_events()[0].text, "keep");
        // One undo step restores both.
        assert!(app.db.undo());
        assert!(app.db.undo());
        assert_eq!(app.db.all_events().len(), 3);
    }

    #[test]
    fn duplicate_places_an_unlocked_copy() {
        let mut db = Db::new(gregorian_time_type());
        let mut event = Event::new(day_period(10, 12), "meeting");
        event.locked = true;
        let id = db.save_event(event).unwrap();
        let mut app = app_with(db);
        app.view.select(id, false);
        app.update(AppEvent::KeyPress(KeyCode::Char('d')));
        assert_eq!(app.db.all_events().len(), 2);
        let copy = app
            .db
            .all_events()
            .iter()
            .find(|event| event.id != Some(id))
            .unwrap();
        assert_eq!(copy.text, "meeting");
        assert!(!copy.locked);
        assert_ne!(copy.period(), day_period(10, 12));
    }

    #[test]
    fn undo_key_reports_when_there_is_nothing_to_undo() {
        let mut app = app_with(Db::new(gregorian_time_type()));
        app.update(AppEvent::KeyPress(KeyCode::Char('u')));
        assert_eq!(app.status.as_deref(), Some("Nothing to undo"));
    }

    #[test]
    fn go_to_input_centers_the_view() {
        let mut app = app_with(Db::new(gregorian_time_type()));
        app.view.displayed_period = Some(day_period(0, 10));
        app.popup = Some(Popup::Input(InputPopup {
            title: "Go to time",
            purpose: InputPurpose::GoTo,
            value: "2000-01-01 00:00:00".to_string(),
        }));
        app.update(AppEvent::KeyPress(KeyCode::Enter));
        let displayed = app.view.displayed_period.unwrap();
        let target = app
            .db
            .time_type()
            .parse_time("2000-01-01 00:00:00")
            .unwrap();
        assert_eq!(displayed.mean_time(), target);
        assert_eq!(displayed.delta(), TimeDelta::from_days(10));
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut app = app_with(Db::new(gregorian_time_type()));
        app.update(AppEvent::KeyPress(KeyCode::Char('q')));
        assert!(!app.running);
    }
}
