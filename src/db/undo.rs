use crate::model::{Category, Event};

/// How many states are kept, including the initial one. Older states fall
/// off the front.
const MAX_UNDO_LEVELS: usize = 100;

/// A full copy of the undoable state. Eras and view properties are not
/// part of the undo history.
#[derive(Clone)]
pub struct Snapshot {
    pub categories: Vec<Category>,
    pub events: Vec<Event>,
}

/// Bounded ring of state snapshots with a cursor.
///
/// Every mutation pushes a snapshot and truncates any redo tail. Restoring
/// moves the cursor without recording.
pub struct UndoHandler {
    buffer: Vec<Snapshot>,
    position: usize,
    enabled: bool,
}

impl UndoHandler {
    pub fn new(initial: Snapshot) -> Self {
        Self { buffer: vec![initial], position: 0, enabled: true }
    }

    /// Forget all history and start over from `initial`. Used after loading
    /// a timeline, so undo cannot step back past the loaded state.
    pub fn reset(&mut self, initial: Snapshot) {
        self.buffer = vec![initial];
        self.position = 0;
        self.enabled = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn save(&mut self, snapshot: Snapshot) {
        if !self.enabled {
            return;
        }
        self.buffer.truncate(self.position + 1);
        self.buffer.push(snapshot);
        if self.buffer.len() > MAX_UNDO_LEVELS {
            self.buffer.remove(0);
        }
        self.position = self.buffer.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.buffer.len()
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        Some(&self.buffer[self.position])
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.position + 1 >= self.buffer.len() {
            return None;
        }
        self.position += 1;
        Some(&self.buffer[self.position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Time, TimePeriod};

    fn snapshot(n: usize) -> Snapshot {
        let period = TimePeriod::new(Time::new(0, 0), Time::new(1, 0)).unwrap();
        let events = (0..n)
            .map(|i| crate::model::Event::new(period, format!("e{i}")))
            .collect();
        Snapshot { categories: Vec::new(), events }
    }

    #[test]
    fn undo_walks_back_and_redo_forward() {
        let mut undo = UndoHandler::new(snapshot(0));
        undo.save(snapshot(1));
        undo.save(snapshot(2));
        assert_eq!(undo.undo().unwrap().events.len(), 1);
        assert_eq!(undo.undo().unwrap().events.len(), 0);
        assert!(undo.undo().is_none());
        assert_eq!(undo.redo().unwrap().events.len(), 1);
        assert_eq!(undo.redo().unwrap().events.len(), 2);
        assert!(undo.redo().is_none());
    }

    #[test]
    fn save_after_undo_discards_redo_tail() {
        let mut undo = UndoHandler::new(snapshot(0));
        undo.save(snapshot(1));
        undo.save(snapshot(2));
        undo.undo();
        undo.save(snapshot(9));
        assert!(undo.redo().is_none());
        assert_eq!(undo.undo().unwrap().events.len(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let mut undo = UndoHandler::new(snapshot(0));
        for i in 1..=200 {
            undo.save(snapshot(i));
        }
        let mut steps = 0;
        while undo.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, MAX_UNDO_LEVELS - 1);
        // The oldest surviving state is no longer the initial one.
        assert_eq!(undo.buffer[0].events.len(), 200 - (MAX_UNDO_LEVELS - 1));
    }

    #[test]
    fn disabled_handler_records_nothing() {
        let mut undo = UndoHandler::new(snapshot(0));
        undo.set_enabled(false);
        undo.save(snapshot(1));
        assert!(!undo.can_undo());
        undo.set_enabled(true);
        undo.save(snapshot(1));
        assert!(undo.can_undo());
    }
}
