/// In-memory timeline database.
///
/// Owns all entities, the undo history and the listener registry. Mutations
/// go through the `save_*`/`delete_*` methods, which keep container periods
/// derived, snapshot state for undo, notify listeners and request a save.
mod observer;
mod undo;

pub use observer::{Listener, Observable, StateChange};
pub use undo::{Snapshot, UndoHandler};

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use crate::calendar::TimeType;
use crate::error::{Result, TimelineError};
use crate::model::{Category, CategoryId, ContainerCid, Era, EraId, Event, EventId, EventKind};
use crate::time::TimePeriod;
use crate::view::ViewProperties;

pub struct Db {
    time_type: Arc<dyn TimeType>,
    categories: Vec<Category>,
    events: Vec<Event>,
    eras: Vec<Era>,
    displayed_period: Option<TimePeriod>,
    hidden_categories: HashSet<CategoryId>,
    readonly: bool,
    /// When set, `save_category` merges same-named categories instead of
    /// creating duplicates.
    importing: bool,
    /// Advisory flag the host checks before opening edit dialogs.
    locked: bool,
    next_id: u32,
    undo: UndoHandler,
    observable: Observable,
    save_enabled: bool,
    save_pending: bool,
    save_callback: Option<Rc<dyn Fn(&Db)>>,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("time_type", &self.time_type)
            .field("categories", &self.categories)
            .field("events", &self.events)
            .field("eras", &self.eras)
            .field("displayed_period", &self.displayed_period)
            .field("hidden_categories", &self.hidden_categories)
            .field("readonly", &self.readonly)
            .field("importing", &self.importing)
            .field("locked", &self.locked)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl Db {
    pub fn new(time_type: Arc<dyn TimeType>) -> Self {
        Self {
            time_type,
            categories: Vec::new(),
            events: Vec::new(),
            eras: Vec::new(),
            displayed_period: None,
            hidden_categories: HashSet::new(),
            readonly: false,
            importing: false,
            locked: false,
            next_id: 1,
            undo: UndoHandler::new(Snapshot { categories: Vec::new(), events: Vec::new() }),
            observable: Observable::default(),
            save_enabled: true,
            save_pending: false,
            save_callback: None,
        }
    }

    pub fn time_type(&self) -> &Arc<dyn TimeType> {
        &self.time_type
    }

    pub fn register_listener(&mut self, listener: Listener) {
        self.observable.register(listener);
    }

    pub fn set_save_callback(&mut self, callback: Rc<dyn Fn(&Db)>) {
        self.save_callback = Some(callback);
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    pub fn set_importing(&mut self, importing: bool) {
        self.importing = importing;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Forget undo history so the current contents become the floor state.
    /// Called once after loading a timeline from disk.
    pub fn reset_undo_history(&mut self) {
        self.undo.reset(self.snapshot());
    }

    // --- events ---------------------------------------------------------

    pub fn save_event(&mut self, event: Event) -> Result<EventId> {
        if let Some(category) = event.category {
            if self.category(category).is_none() {
                return Err(TimelineError::InvalidReference(format!(
                    "event references unknown category {category}"
                )));
            }
        }
        // A sub-event may arrive before its container; materialize one.
        if let Some(cid) = event.container_id() {
            if self.container_index(cid).is_none() {
                let container =
                    Event::new_container(event.period(), format!("[{cid}]Container"), cid);
                self.insert_new(container);
            }
        }
        let container_id = event.container_id();
        let id = match event.id {
            Some(id) => {
                let Some(index) = self.event_index(id) else {
                    return Err(TimelineError::InvalidReference(format!(
                        "no event with id {id}"
                    )));
                };
                let previous_container = self.events[index].container_id();
                self.events[index] = event;
                if previous_container != container_id {
                    if let Some(old_cid) = previous_container {
                        self.unregister_subevent(old_cid, id);
                    }
                }
                id
            }
            None => self.insert_new(event),
        };
        if let Some(cid) = container_id {
            self.register_subevent(cid, id);
        }
        self.after_mutation(StateChange::Any);
        Ok(id)
    }

    /// Remove an event. With `save = false` the undo snapshot, listener
    /// notification and save callback are all suppressed; the caller of a
    /// batch delete must finish with one `save = true` call.
    pub fn delete_event(&mut self, id: EventId, save: bool) -> Result<()> {
        let Some(index) = self.event_index(id) else {
            return Err(TimelineError::InvalidReference(format!("no event with id {id}")));
        };
        let removed = self.events.remove(index);
        if let Some(cid) = removed.container_id() {
            self.unregister_subevent(cid, id);
        }
        if let Some(cid) = removed.cid() {
            // A container takes its sub-events with it.
            self.events.retain(|event| event.container_id() != Some(cid));
        }
        if save {
            self.after_mutation(StateChange::Any);
        }
        Ok(())
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == Some(id))
    }

    pub fn all_events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_in_period(&self, period: TimePeriod) -> Vec<&Event> {
        self.events.iter().filter(|event| event.period().overlaps(&period)).collect()
    }

    pub fn first_event(&self) -> Option<&Event> {
        self.events.iter().min_by_key(|event| event.period().start())
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.events.iter().max_by_key(|event| event.period().end())
    }

    /// Case-insensitive substring search over text and description,
    /// sorted by mean time.
    pub fn search(&self, query: &str) -> Vec<&Event> {
        let needle = query.to_lowercase();
        let mut hits: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| {
                event.text.to_lowercase().contains(&needle)
                    || event
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect();
        hits.sort_by_key(|event| event.mean_time());
        hits
    }

    // --- categories -----------------------------------------------------

    pub fn save_category(&mut self, mut category: Category) -> Result<CategoryId> {
        if category.name.trim().is_empty() {
            return Err(TimelineError::InvalidName);
        }
        if let Some(parent) = category.parent {
            if self.category(parent).is_none() {
                return Err(TimelineError::InvalidReference(format!(
                    "category references unknown parent {parent}"
                )));
            }
        }
        match category.id {
            Some(id) => {
                // Walking up from the proposed parent must never come back.
                let mut cursor = category.parent;
                while let Some(parent_id) = cursor {
                    if parent_id == id {
                        return Err(TimelineError::CircularParent(category.name));
                    }
                    cursor = self.category(parent_id).and_then(|c| c.parent);
                }
                let Some(index) = self.categories.iter().position(|c| c.id == Some(id)) else {
                    return Err(TimelineError::InvalidReference(format!(
                        "no category with id {id}"
                    )));
                };
                self.categories[index] = category;
                self.after_mutation(StateChange::Category);
                Ok(id)
            }
            None => {
                if self.importing {
                    if let Some(existing) =
                        self.categories.iter().find(|c| c.name == category.name)
                    {
                        if let Some(id) = existing.id {
                            return Ok(id);
                        }
                    }
                }
                let id = self.allocate_id();
                category.id = Some(id);
                self.categories.push(category);
                self.after_mutation(StateChange::Category);
                Ok(id)
            }
        }
    }

    pub fn delete_category(&mut self, id: CategoryId) -> Result<()> {
        let Some(index) = self.categories.iter().position(|c| c.id == Some(id)) else {
            return Err(TimelineError::InvalidReference(format!("no category with id {id}")));
        };
        let removed = self.categories.remove(index);
        self.hidden_categories.remove(&id);
        for category in &mut self.categories {
            if category.parent == Some(id) {
                category.parent = removed.parent;
            }
        }
        for event in &mut self.events {
            if event.category == Some(id) {
                event.category = removed.parent;
            }
        }
        self.after_mutation(StateChange::Category);
        Ok(())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == Some(id))
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    // --- eras -----------------------------------------------------------

    pub fn save_era(&mut self, mut era: Era) -> EraId {
        match era.id {
            Some(id) => {
                if let Some(index) = self.eras.iter().position(|e| e.id == Some(id)) {
                    self.eras[index] = era;
                } else {
                    self.eras.push(era);
                }
                self.notify_and_save(StateChange::Any);
                id
            }
            None => {
                let id = self.allocate_id();
                era.id = Some(id);
                self.eras.push(era);
                self.notify_and_save(StateChange::Any);
                id
            }
        }
    }

    pub fn eras(&self) -> &[Era] {
        &self.eras
    }

    // --- view properties ------------------------------------------------

    pub fn displayed_period(&self) -> Option<TimePeriod> {
        self.displayed_period
    }

    pub fn hidden_categories(&self) -> &HashSet<CategoryId> {
        &self.hidden_categories
    }

    pub fn load_view_properties(&self, vp: &mut ViewProperties) {
        if let Some(period) = self.displayed_period {
            vp.displayed_period = Some(period);
        }
        vp.set_hidden_categories(self.hidden_categories.clone());
    }

    pub fn save_view_properties(&mut self, vp: &ViewProperties) -> Result<()> {
        let Some(period) = vp.displayed_period else {
            return Err(TimelineError::InvalidPeriod("no displayed period".into()));
        };
        if period.is_point() {
            return Err(TimelineError::InvalidPeriod(
                "displayed period must not be a point".into(),
            ));
        }
        self.displayed_period = Some(period);
        self.hidden_categories = vp.hidden_categories().clone();
        self.request_save();
        Ok(())
    }

    // --- persistence hooks ----------------------------------------------

    /// Suspend the save callback; mutations in between mark a pending save.
    pub fn disable_save(&mut self) {
        self.save_enabled = false;
    }

    /// Resume saving. When a save was requested in between and `call_save`
    /// is set, the callback fires once now.
    pub fn enable_save(&mut self, call_save: bool) {
        self.save_enabled = true;
        if self.save_pending {
            self.save_pending = false;
            if call_save {
                self.request_save();
            }
        }
    }

    // --- undo / redo ----------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.undo() else {
            return false;
        };
        self.categories = snapshot.categories.clone();
        self.events = snapshot.events.clone();
        self.notify_and_save(StateChange::Any);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.undo.redo() else {
            return false;
        };
        self.categories = snapshot.categories.clone();
        self.events = snapshot.events.clone();
        self.notify_and_save(StateChange::Any);
        true
    }

    // --- import ---------------------------------------------------------

    /// Copy categories and events from `other` into this db. Duplicate
    /// category names are renamed to "<name> (imported N)". Not
    /// transactional: on cancellation, events copied so far remain.
    pub fn import_db(
        &mut self,
        other: &Db,
        should_cancel: Option<&dyn Fn() -> bool>,
    ) -> Result<()> {
        if self.time_type.name() != other.time_type.name() {
            return Err(TimelineError::Parse(format!(
                "cannot import a {} timeline into a {} timeline",
                other.time_type.name(),
                self.time_type.name()
            )));
        }
        self.disable_save();
        let result = self.import_contents(other, should_cancel);
        self.enable_save(true);
        if result.is_ok() {
            log::info!(
                "imported {} events and {} categories",
                other.events.len(),
                other.categories.len()
            );
        }
        result
    }

    fn import_contents(
        &mut self,
        other: &Db,
        should_cancel: Option<&dyn Fn() -> bool>,
    ) -> Result<()> {
        let mut category_map: HashMap<CategoryId, CategoryId> = HashMap::new();
        // Parents before children, so the mapped parent id already exists.
        let mut remaining: Vec<&Category> = other.categories.iter().collect();
        while !remaining.is_empty() {
            let mut deferred = Vec::new();
            let mut progressed = false;
            for category in remaining {
                let parent = match category.parent {
                    None => None,
                    Some(old_parent) => match category_map.get(&old_parent) {
                        Some(mapped) => Some(*mapped),
                        None => {
                            deferred.push(category);
                            continue;
                        }
                    },
                };
                let mut copy =
                    Category::new(self.imported_name(&category.name), category.color, parent);
                copy.font_color = category.font_color;
                let new_id = self.save_category(copy)?;
                if let Some(old_id) = category.id {
                    category_map.insert(old_id, new_id);
                }
                progressed = true;
            }
            if !progressed {
                break;
            }
            remaining = deferred;
        }

        // Container cids from the other db are shifted past ours.
        let cid_base = self
            .events
            .iter()
            .filter_map(|event| event.cid().or_else(|| event.container_id()))
            .max()
            .unwrap_or(0);
        for event in &other.events {
            if should_cancel.is_some_and(|cancel| cancel()) {
                return Ok(());
            }
            if event.is_container() {
                // Re-materialized on demand when its sub-events arrive.
                continue;
            }
            let mut copy = event.clone();
            copy.id = None;
            copy.category = match event.category {
                Some(old) => category_map.get(&old).copied(),
                None => None,
            };
            if let Some(cid) = event.container_id() {
                copy.kind = EventKind::Subevent { container_id: cid_base + cid };
            }
            self.save_event(copy)?;
        }
        Ok(())
    }

    fn imported_name(&self, name: &str) -> String {
        if self.category_by_name(name).is_none() {
            return name.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{name} (imported {n})");
            if self.category_by_name(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    // --- internals ------------------------------------------------------

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_new(&mut self, mut event: Event) -> EventId {
        let id = self.allocate_id();
        event.id = Some(id);
        self.events.push(event);
        id
    }

    fn event_index(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|event| event.id == Some(id))
    }

    fn container_index(&self, cid: ContainerCid) -> Option<usize> {
        self.events.iter().position(|event| event.cid() == Some(cid))
    }

    fn register_subevent(&mut self, cid: ContainerCid, id: EventId) {
        let Some(index) = self.container_index(cid) else {
            return;
        };
        if let EventKind::Container { subevents, .. } = &mut self.events[index].kind
        {
            if !subevents.contains(&id) {
                subevents.push(id);
            }
        }
        self.update_container_period(cid);
    }

    fn unregister_subevent(&mut self, cid: ContainerCid, id: EventId) {
        let Some(index) = self.container_index(cid) else {
            return;
        };
        let now_empty = if let EventKind::Container { subevents, .. } =
            &mut self.events[index].kind
        {
            subevents.retain(|member| *member != id);
            subevents.is_empty()
        } else {
            false
        };
        if now_empty {
            self.events.remove(index);
        } else {
            self.update_container_period(cid);
        }
    }

    /// A container's period is the union of its sub-events' periods.
    fn update_container_period(&mut self, cid: ContainerCid) {
        let Some(index) = self.container_index(cid) else {
            return;
        };
        let members = match &self.events[index].kind {
            EventKind::Container { subevents, .. } => subevents.clone(),
            _ => return,
        };
        let mut union: Option<TimePeriod> = None;
        for member in members {
            if let Some(event) = self.event(member) {
                let period = event.period();
                union = Some(match union {
                    Some(current) => current.extend_to_include(&period),
                    None => period,
                });
            }
        }
        if let Some(period) = union {
            self.events[index].set_derived_period(period);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot { categories: self.categories.clone(), events: self.events.clone() }
    }

    fn after_mutation(&mut self, change: StateChange) {
        self.undo.save(self.snapshot());
        self.notify_and_save(change);
    }

    fn notify_and_save(&mut self, change: StateChange) {
        self.observable.notify(change);
        self.request_save();
    }

    fn request_save(&mut self) {
        if self.readonly {
            return;
        }
        if !self.save_enabled {
            self.save_pending = true;
            return;
        }
        if let Some(callback) = self.save_callback.clone() {
            callback(self);
        }
    }
}
