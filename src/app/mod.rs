/// Application state and event handling.
mod state;

use crossterm::event::{KeyCode, MouseEvent};

pub use state::App;

use crate::calendar::NavigationItem;
use crate::model::EventId;
use crate::time::TimePeriod;

pub enum AppEvent {
    Tick,
    KeyPress(KeyCode),
    Mouse(MouseEvent),
    Resize,
    FocusLost,
}

/// Modal overlay currently shown, if any. Keyboard input goes to the popup
/// while one is open.
pub enum Popup {
    Input(InputPopup),
    Navigate(NavigateMenu),
}

/// What to do with the committed text of an input popup.
pub enum InputPurpose {
    CreateEvent(TimePeriod),
    EditEvent(EventId),
    CreateCategory,
    GoTo,
    Search,
    Import,
}

pub struct InputPopup {
    pub title: &'static str,
    pub purpose: InputPurpose,
    pub value: String,
}

/// The calendar's navigation menu with a cursor. Separators are skipped
/// when moving the cursor.
pub struct NavigateMenu {
    pub items: Vec<NavigationItem>,
    pub selected: usize,
}

impl NavigateMenu {
    pub fn new(items: Vec<NavigationItem>) -> Self {
        let selected = items
            .iter()
            .position(|item| matches!(item, NavigationItem::Entry { .. }))
            .unwrap_or(0);
        Self { items, selected }
    }

    pub fn select_prev(&mut self) {
        let mut index = self.selected;
        while index > 0 {
            index -= 1;
            if matches!(self.items[index], NavigationItem::Entry { .. }) {
                self.selected = index;
                return;
            }
        }
    }

    pub fn select_next(&mut self) {
        let mut index = self.selected;
        while index + 1 < self.items.len() {
            index += 1;
            if matches!(self.items[index], NavigationItem::Entry { .. }) {
                self.selected = index;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(period: &TimePeriod) -> crate::error::Result<TimePeriod> {
        Ok(*period)
    }

    fn menu() -> NavigateMenu {
        NavigateMenu::new(vec![
            NavigationItem::Separator,
            NavigationItem::Entry { label: "a", func: identity },
            NavigationItem::Separator,
            NavigationItem::Entry { label: "b", func: identity },
        ])
    }

    #[test]
    fn cursor_starts_on_first_entry() {
        assert_eq!(menu().selected, 1);
    }

    #[test]
    fn cursor_skips_separators() {
        let mut menu = menu();
        menu.select_next();
        assert_eq!(menu.selected, 3);
        menu.select_next();
        assert_eq!(menu.selected, 3);
        menu.select_prev();
        assert_eq!(menu.selected, 1);
        menu.select_prev();
        assert_eq!(menu.selected, 1);
    }
}
