/// Per-view runtime state: what is selected, hovered, hidden and displayed.
///
/// Holds ids only; the db owns the entities. Stale ids are pruned against
/// the db before every scene rebuild.
use std::collections::HashSet;

use crate::db::Db;
use crate::model::{CategoryId, EventId};
use crate::time::TimePeriod;

#[derive(Clone, Debug)]
pub struct ViewProperties {
    pub displayed_period: Option<TimePeriod>,
    selected: HashSet<EventId>,
    pub hovered_event: Option<EventId>,
    /// Event whose balloon is currently shown, if any.
    pub balloon_event: Option<EventId>,
    sticky_balloons: HashSet<EventId>,
    hidden_categories: HashSet<CategoryId>,
    /// Fraction of the canvas height where the point/period divider sits.
    pub divider_fraction: f64,
    /// Event box height in pixels, adjustable at runtime.
    pub event_height: f64,
}

impl ViewProperties {
    pub fn new(divider_fraction: f64, event_height: f64) -> Self {
        Self {
            displayed_period: None,
            selected: HashSet::new(),
            hovered_event: None,
            balloon_event: None,
            sticky_balloons: HashSet::new(),
            hidden_categories: HashSet::new(),
            divider_fraction,
            event_height,
        }
    }

    pub fn is_selected(&self, id: EventId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.selected.iter().copied()
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// Replace the selection, or toggle membership when `extend` is set.
    pub fn select(&mut self, id: EventId, extend: bool) {
        if extend {
            if !self.selected.insert(id) {
                self.selected.remove(&id);
            }
        } else {
            self.selected.clear();
            self.selected.insert(id);
        }
    }

    pub fn deselect(&mut self, id: EventId) {
        self.selected.remove(&id);
        // A balloon stuck to an unselected event is dismissed.
        self.sticky_balloons.remove(&id);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.sticky_balloons.clear();
    }

    pub fn is_sticky(&self, id: EventId) -> bool {
        self.sticky_balloons.contains(&id)
    }

    pub fn toggle_sticky(&mut self, id: EventId) {
        if !self.sticky_balloons.insert(id) {
            self.sticky_balloons.remove(&id);
        }
    }

    pub fn sticky_balloons(&self) -> impl Iterator<Item = EventId> + '_ {
        self.sticky_balloons.iter().copied()
    }

    pub fn is_category_visible(&self, id: CategoryId) -> bool {
        !self.hidden_categories.contains(&id)
    }

    pub fn set_category_visible(&mut self, id: CategoryId, visible: bool) {
        if visible {
            self.hidden_categories.remove(&id);
        } else {
            self.hidden_categories.insert(id);
        }
    }

    pub fn hidden_categories(&self) -> &HashSet<CategoryId> {
        &self.hidden_categories
    }

    pub fn set_hidden_categories(&mut self, hidden: HashSet<CategoryId>) {
        self.hidden_categories = hidden;
    }

    /// Drop ids that no longer resolve in the db.
    pub fn prune(&mut self, db: &Db) {
        self.selected.retain(|id| db.event(*id).is_some());
        self.sticky_balloons.retain(|id| db.event(*id).is_some());
        if let Some(id) = self.hovered_event {
            if db.event(id).is_none() {
                self.hovered_event = None;
            }
        }
        if let Some(id) = self.balloon_event {
            if db.event(id).is_none() {
                self.balloon_event = None;
            }
        }
        self.hidden_categories.retain(|id| db.category(*id).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_replaces_and_extend_toggles() {
        let mut vp = ViewProperties::new(0.5, 1.0);
        vp.select(1, false);
        vp.select(2, false);
        assert!(!vp.is_selected(1));
        assert!(vp.is_selected(2));
        vp.select(3, true);
        assert!(vp.is_selected(2) && vp.is_selected(3));
        vp.select(3, true);
        assert!(!vp.is_selected(3));
    }

    #[test]
    fn deselect_dismisses_sticky_balloon() {
        let mut vp = ViewProperties::new(0.5, 1.0);
        vp.select(1, false);
        vp.toggle_sticky(1);
        assert!(vp.is_sticky(1));
        vp.deselect(1);
        assert!(!vp.is_sticky(1));
    }

    #[test]
    fn category_visibility_defaults_to_visible() {
        let mut vp = ViewProperties::new(0.5, 1.0);
        assert!(vp.is_category_visible(9));
        vp.set_category_visible(9, false);
        assert!(!vp.is_category_visible(9));
        vp.set_category_visible(9, true);
        assert!(vp.is_category_visible(9));
    }
}
