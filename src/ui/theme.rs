use ratatui::style::Color;

/// Unified color theme for the terminal chrome. The timeline canvas itself
/// uses the colors stored on categories and eras.
pub struct Theme;

impl Theme {
    /// Popup border color
    pub fn border() -> Color {
        Color::Cyan
    }

    /// Popup title color
    pub fn title() -> Color {
        Color::Magenta
    }

    /// Status bar text
    pub fn status() -> Color {
        Color::Gray
    }

    /// Selection/highlight in lists
    pub fn highlight() -> Color {
        Color::Cyan
    }
}
