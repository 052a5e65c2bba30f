/// The on-disk timeline format: UTF-8 XML with a fixed element order.
///
/// The reader is position-tracking so parse failures name the byte offset.
/// A failed load never yields a half-filled db; the error aborts the whole
/// load.
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::{Reader, Writer};

use crate::calendar::time_type_by_name;
use crate::color::Color;
use crate::db::Db;
use crate::error::{Result, TimelineError};
use crate::model::{Alert, Category, CategoryId, Era, Event};
use crate::time::TimePeriod;
use crate::view::ViewProperties;

pub fn load_timeline(path: &Path) -> Result<Db> {
    let text = std::fs::read_to_string(path)?;
    let db = parse_timeline(&text)?;
    log::info!(
        "loaded {}: {} events, {} categories",
        path.display(),
        db.all_events().len(),
        db.categories().len()
    );
    Ok(db)
}

pub fn save_timeline(db: &Db, path: &Path) -> Result<()> {
    let text = write_timeline(db)?;
    std::fs::write(path, text)?;
    log::debug!("saved {}", path.display());
    Ok(())
}

// --- reading ------------------------------------------------------------

#[derive(Default)]
struct RawCategory {
    name: String,
    color: Option<Color>,
    font_color: Option<Color>,
    parent: Option<String>,
}

#[derive(Default)]
struct RawEvent {
    start: Option<String>,
    end: Option<String>,
    text: String,
    fuzzy: bool,
    locked: bool,
    ends_today: bool,
    category: Option<String>,
    description: Option<String>,
    icon: Option<Vec<u8>>,
    hyperlink: Option<String>,
    progress: Option<u8>,
    alert: Option<String>,
    container_id: Option<i64>,
}

#[derive(Default)]
struct RawEra {
    start: Option<String>,
    end: Option<String>,
    name: String,
    color: Option<Color>,
}

struct Loader {
    db: Option<Db>,
    category_ids: std::collections::HashMap<String, CategoryId>,
    displayed: Option<TimePeriod>,
    hidden_names: Vec<String>,
}

pub fn parse_timeline(text: &str) -> Result<Db> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut loader = Loader {
        db: None,
        category_ids: std::collections::HashMap::new(),
        displayed: None,
        hidden_names: Vec::new(),
    };
    let mut path: Vec<String> = Vec::new();
    let mut category: Option<RawCategory> = None;
    let mut event: Option<RawEvent> = None;
    let mut era: Option<RawEra> = None;
    let mut text_value = String::new();

    loop {
        let position = reader.buffer_position();
        let next = reader
            .read_event()
            .map_err(|error| parse_error(position, error))?;
        match next {
            XmlEvent::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match name.as_str() {
                    "category" if path.last().is_some_and(|p| p == "categories") => {
                        category = Some(RawCategory::default());
                    }
                    "event" => event = Some(RawEvent::default()),
                    "era" => era = Some(RawEra::default()),
                    _ => {}
                }
                path.push(name);
                text_value.clear();
            }
            XmlEvent::Text(t) => {
                let value = t
                    .unescape()
                    .map_err(|error| parse_error(position, error))?;
                text_value.push_str(&value);
            }
            XmlEvent::CData(t) => {
                text_value.push_str(&String::from_utf8_lossy(&t));
            }
            XmlEvent::End(_) => {
                let Some(element) = path.pop() else { break };
                let parent = path.last().map(String::as_str).unwrap_or("");
                let value = std::mem::take(&mut text_value);
                match element.as_str() {
                    "timetype" => {
                        let time_type = time_type_by_name(&value).ok_or_else(|| {
                            parse_error(position, format!("unknown timetype '{value}'"))
                        })?;
                        let mut db = Db::new(time_type);
                        db.disable_save();
                        loader.db = Some(db);
                    }
                    "category" if parent == "categories" => {
                        let raw = category.take().ok_or_else(|| {
                            parse_error(position, "misplaced </category>")
                        })?;
                        loader.finish_category(raw, position)?;
                    }
                    "event" if parent == "events" => {
                        let raw = event
                            .take()
                            .ok_or_else(|| parse_error(position, "misplaced </event>"))?;
                        loader.finish_event(raw, position)?;
                    }
                    "era" if parent == "eras" => {
                        let raw = era
                            .take()
                            .ok_or_else(|| parse_error(position, "misplaced </era>"))?;
                        loader.finish_era(raw, position)?;
                    }
                    leaf => {
                        assign_leaf(
                            leaf,
                            parent,
                            value,
                            position,
                            &mut category,
                            &mut event,
                            &mut era,
                            &mut loader,
                        )?;
                    }
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    let mut db = loader
        .db
        .ok_or_else(|| TimelineError::Parse("no <timetype> element".into()))?;
    if loader.displayed.is_some() || !loader.hidden_names.is_empty() {
        let mut vp = ViewProperties::new(0.5, 1.0);
        vp.displayed_period = loader.displayed;
        for name in &loader.hidden_names {
            if let Some(id) = loader.category_ids.get(name) {
                vp.set_category_visible(*id, false);
            }
        }
        if vp.displayed_period.is_some() {
            db.save_view_properties(&vp)?;
        }
    }
    db.enable_save(false);
    db.reset_undo_history();
    Ok(db)
}

#[allow(clippy::too_many_arguments)]
fn assign_leaf(
    leaf: &str,
    parent: &str,
    value: String,
    position: u64,
    category: &mut Option<RawCategory>,
    event: &mut Option<RawEvent>,
    era: &mut Option<RawEra>,
    loader: &mut Loader,
) -> Result<()> {
    match (parent, leaf) {
        ("category", _) => {
            let Some(raw) = category.as_mut() else { return Ok(()) };
            match leaf {
                "name" => raw.name = value,
                "color" => raw.color = Some(Color::parse(&value)?),
                "font_color" => raw.font_color = Some(Color::parse(&value)?),
                "parent" => raw.parent = Some(value),
                _ => {}
            }
        }
        ("event", _) => {
            let Some(raw) = event.as_mut() else { return Ok(()) };
            match leaf {
                "start" => raw.start = Some(value),
                "end" => raw.end = Some(value),
                "text" => raw.text = value,
                "fuzzy" => raw.fuzzy = parse_bool(&value, position)?,
                "locked" => raw.locked = parse_bool(&value, position)?,
                "ends_today" => raw.ends_today = parse_bool(&value, position)?,
                "category" => raw.category = Some(value),
                "description" => raw.description = Some(value),
                "icon" => {
                    let bytes = STANDARD
                        .decode(value.trim())
                        .map_err(|error| parse_error(position, error))?;
                    raw.icon = Some(bytes);
                }
                "hyperlink" => raw.hyperlink = Some(value),
                "progress" => {
                    let progress: u8 = value
                        .parse()
                        .map_err(|_| parse_error(position, "invalid progress"))?;
                    raw.progress = Some(progress.min(100));
                }
                "alert" => raw.alert = Some(value),
                "container_id" => {
                    raw.container_id = Some(
                        value
                            .parse()
                            .map_err(|_| parse_error(position, "invalid container_id"))?,
                    );
                }
                _ => {}
            }
        }
        ("era", _) => {
            let Some(raw) = era.as_mut() else { return Ok(()) };
            match leaf {
                "start" => raw.start = Some(value),
                "end" => raw.end = Some(value),
                "name" => raw.name = value,
                "color" => raw.color = Some(Color::parse(&value)?),
                _ => {}
            }
        }
        ("displayed_period", "start" | "end") => {
            let db = loader
                .db
                .as_ref()
                .ok_or_else(|| parse_error(position, "<view> before <timetype>"))?;
            let time = db.time_type().parse_time(&value)?;
            loader.displayed = Some(match (leaf, loader.displayed) {
                ("start", Some(period)) => TimePeriod::new(time, period.end())?,
                ("start", None) => TimePeriod::point(time),
                (_, Some(period)) => TimePeriod::new(period.start(), time)?,
                (_, None) => TimePeriod::point(time),
            });
        }
        ("hidden_categories", "name") => loader.hidden_names.push(value),
        _ => {}
    }
    Ok(())
}

impl Loader {
    fn db_mut(&mut self, position: u64) -> Result<&mut Db> {
        self.db
            .as_mut()
            .ok_or_else(|| parse_error(position, "content before <timetype>"))
    }

    fn finish_category(&mut self, raw: RawCategory, position: u64) -> Result<()> {
        let parent = match &raw.parent {
            // Must name an earlier sibling.
            Some(name) => Some(*self.category_ids.get(name).ok_or_else(|| {
                parse_error(position, format!("unknown parent category '{name}'"))
            })?),
            None => None,
        };
        let color = raw
            .color
            .ok_or_else(|| parse_error(position, "category without <color>"))?;
        let mut category = Category::new(raw.name.clone(), color, parent);
        if let Some(font_color) = raw.font_color {
            category.font_color = font_color;
        }
        let id = self.db_mut(position)?.save_category(category)?;
        self.category_ids.insert(raw.name, id);
        Ok(())
    }

    fn finish_event(&mut self, raw: RawEvent, position: u64) -> Result<()> {
        let category = match &raw.category {
            Some(name) => Some(*self.category_ids.get(name).ok_or_else(|| {
                parse_error(position, format!("unknown category '{name}'"))
            })?),
            None => None,
        };
        let db = self.db_mut(position)?;
        let start_text = raw
            .start
            .ok_or_else(|| parse_error(position, "event without <start>"))?;
        let start = db.time_type().parse_time(&start_text)?;
        let end = match raw.end {
            Some(text) => db.time_type().parse_time(&text)?,
            None => start,
        };
        let period = TimePeriod::new(start, end)?;

        let mut event = match raw.container_id {
            // Negative means "this is the container itself".
            Some(cid) if cid < 0 => Event::new_container(period, raw.text, -cid),
            Some(cid) => Event::new_subevent(period, raw.text, cid),
            None => Event::new(period, raw.text),
        };
        event.category = category;
        event.set_fuzzy(raw.fuzzy);
        event.set_ends_today(raw.ends_today);
        event.description = raw.description;
        event.icon = raw.icon;
        event.hyperlink = raw.hyperlink;
        event.progress = raw.progress;
        if let Some(alert) = raw.alert {
            let (time_text, message) = alert.split_once(';').ok_or_else(|| {
                parse_error(position, "alert must be 'TIME;MESSAGE'")
            })?;
            event.alert = Some(Alert {
                time: db.time_type().parse_time(time_text)?,
                message: message.to_string(),
            });
        }
        // Lock last so the flag setters above still apply.
        event.locked = raw.locked;
        db.save_event(event)?;
        Ok(())
    }

    fn finish_era(&mut self, raw: RawEra, position: u64) -> Result<()> {
        let db = self.db_mut(position)?;
        let start_text = raw
            .start
            .ok_or_else(|| parse_error(position, "era without <start>"))?;
        let end_text = raw
            .end
            .ok_or_else(|| parse_error(position, "era without <end>"))?;
        let start = db.time_type().parse_time(&start_text)?;
        let end = db.time_type().parse_time(&end_text)?;
        let color = raw
            .color
            .ok_or_else(|| parse_error(position, "era without <color>"))?;
        let era = Era::new(TimePeriod::new(start, end)?, raw.name, color);
        db.save_era(era);
        Ok(())
    }
}

fn parse_bool(value: &str, position: u64) -> Result<bool> {
    match value {
        "True" => Ok(true),
        "False" => Ok(false),
        other => Err(parse_error(position, format!("invalid boolean '{other}'"))),
    }
}

fn parse_error(position: u64, message: impl std::fmt::Display) -> TimelineError {
    TimelineError::Parse(format!("{message} (at offset {position})"))
}

// --- writing ------------------------------------------------------------

pub fn write_timeline(db: &Db) -> Result<String> {
    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);
    write_document(&mut writer, db)?;
    String::from_utf8(buffer).map_err(|error| TimelineError::Io(error.to_string()))
}

fn write_document(writer: &mut Writer<&mut Vec<u8>>, db: &Db) -> Result<()> {
    let time_type = db.time_type().clone();
    open(writer, "timeline")?;
    text_element(writer, "version", env!("CARGO_PKG_VERSION"))?;
    text_element(writer, "timetype", time_type.name())?;

    open(writer, "categories")?;
    for category in ordered_categories(db) {
        open(writer, "category")?;
        text_element(writer, "name", &category.name)?;
        text_element(writer, "color", &category.color.encode())?;
        text_element(writer, "font_color", &category.font_color.encode())?;
        if let Some(parent) = category.parent.and_then(|id| db.category(id)) {
            text_element(writer, "parent", &parent.name)?;
        }
        close(writer, "category")?;
    }
    close(writer, "categories")?;

    open(writer, "events")?;
    for event in db.all_events() {
        open(writer, "event")?;
        text_element(writer, "start", &time_type.time_string(event.period().start()))?;
        text_element(writer, "end", &time_type.time_string(event.period().end()))?;
        text_element(writer, "text", &event.text)?;
        if event.fuzzy() {
            text_element(writer, "fuzzy", "True")?;
        }
        if event.locked {
            text_element(writer, "locked", "True")?;
        }
        if event.ends_today() {
            text_element(writer, "ends_today", "True")?;
        }
        if let Some(category) = event.category.and_then(|id| db.category(id)) {
            text_element(writer, "category", &category.name)?;
        }
        if let Some(description) = &event.description {
            text_element(writer, "description", description)?;
        }
        if let Some(icon) = &event.icon {
            text_element(writer, "icon", &STANDARD.encode(icon))?;
        }
        if let Some(hyperlink) = &event.hyperlink {
            text_element(writer, "hyperlink", hyperlink)?;
        }
        if let Some(progress) = event.progress {
            text_element(writer, "progress", &progress.to_string())?;
        }
        if let Some(alert) = &event.alert {
            let encoded = format!("{};{}", time_type.time_string(alert.time), alert.message);
            text_element(writer, "alert", &encoded)?;
        }
        if let Some(cid) = event.cid() {
            text_element(writer, "container_id", &(-cid).to_string())?;
        } else if let Some(cid) = event.container_id() {
            text_element(writer, "container_id", &cid.to_string())?;
        }
        close(writer, "event")?;
    }
    close(writer, "events")?;

    open(writer, "eras")?;
    for era in db.eras() {
        open(writer, "era")?;
        text_element(writer, "start", &time_type.time_string(era.period.start()))?;
        text_element(writer, "end", &time_type.time_string(era.period.end()))?;
        text_element(writer, "name", &era.name)?;
        text_element(writer, "color", &era.color.encode())?;
        close(writer, "era")?;
    }
    close(writer, "eras")?;

    open(writer, "view")?;
    if let Some(displayed) = db.displayed_period() {
        open(writer, "displayed_period")?;
        text_element(writer, "start", &time_type.time_string(displayed.start()))?;
        text_element(writer, "end", &time_type.time_string(displayed.end()))?;
        close(writer, "displayed_period")?;
    }
    open(writer, "hidden_categories")?;
    for category in ordered_categories(db) {
        let Some(id) = category.id else { continue };
        if db.hidden_categories().contains(&id) {
            text_element(writer, "name", &category.name)?;
        }
    }
    close(writer, "hidden_categories")?;
    close(writer, "view")?;
    close(writer, "timeline")?;
    Ok(())
}

fn open(writer: &mut Writer<&mut Vec<u8>>, name: &str) -> Result<()> {
    writer.write_event(XmlEvent::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close(writer: &mut Writer<&mut Vec<u8>>, name: &str) -> Result<()> {
    writer.write_event(XmlEvent::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element(writer: &mut Writer<&mut Vec<u8>>, name: &str, value: &str) -> Result<()> {
    open(writer, name)?;
    writer.write_event(XmlEvent::Text(BytesText::new(value)))?;
    close(writer, name)?;
    Ok(())
}

/// Categories in an order where every parent precedes its children, as the
/// format requires.
fn ordered_categories(db: &Db) -> Vec<&Category> {
    let mut ordered = Vec::new();
    let mut emitted: std::collections::HashSet<CategoryId> = std::collections::HashSet::new();
    let mut remaining: Vec<&Category> = db.categories().iter().collect();
    while !remaining.is_empty() {
        let mut deferred = Vec::new();
        let mut progressed = false;
        for category in remaining {
            let ready = match category.parent {
                None => true,
                Some(parent) => emitted.contains(&parent),
            };
            if ready {
                if let Some(id) = category.id {
                    emitted.insert(id);
                }
                ordered.push(category);
                progressed = true;
            } else {
                deferred.push(category);
            }
        }
        if !progressed {
            break;
        }
        remaining = deferred;
    }
    ordered
}
