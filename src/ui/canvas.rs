/// Terminal cell backend for the timeline drawer.
///
/// Maps the drawer's pixel coordinates 1:1 onto terminal cells inside a
/// buffer region. Text is measured in characters, fills become cell
/// backgrounds and lines are drawn with box characters.
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as Area;
use ratatui::style::Color as TermColor;

use crate::color::Color;
use crate::drawer::Canvas;
use crate::scene::Rect;

pub struct CellCanvas<'a> {
    buffer: &'a mut Buffer,
    area: Area,
}

impl<'a> CellCanvas<'a> {
    pub fn new(buffer: &'a mut Buffer, area: Area) -> Self {
        Self { buffer, area }
    }

    fn set_bg(&mut self, x: f64, y: f64, color: Color) {
        if let Some((column, row)) = self.cell_position(x, y) {
            if let Some(cell) = self.buffer.cell_mut((column, row)) {
                cell.set_bg(term_color(color));
            }
        }
    }

    fn set_symbol(&mut self, x: f64, y: f64, symbol: &str, color: Color) {
        if let Some((column, row)) = self.cell_position(x, y) {
            if let Some(cell) = self.buffer.cell_mut((column, row)) {
                cell.set_symbol(symbol);
                cell.set_fg(term_color(color));
            }
        }
    }

    /// Absolute buffer coordinates for a canvas point, or `None` when it
    /// falls outside the drawing region.
    fn cell_position(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let column = x.floor() as u16;
        let row = y.floor() as u16;
        if column >= self.area.width || row >= self.area.height {
            return None;
        }
        Some((self.area.x + column, self.area.y + row))
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb(color.r, color.g, color.b)
}

impl Canvas for CellCanvas<'_> {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.area.width), f64::from(self.area.height))
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color) {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        let symbol = if dx.abs() < 0.5 {
            "\u{2502}"
        } else if dy.abs() < 0.5 {
            "\u{2500}"
        } else {
            "\u{00b7}"
        };
        let mut step = 0.0;
        while step <= steps {
            let t = step / steps;
            self.set_symbol(x1 + dx * t, y1 + dy * t, symbol, color);
            step += 1.0;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut y = rect.y.floor();
        while y < rect.bottom() {
            let mut x = rect.x.floor();
            while x < rect.right() {
                self.set_symbol(x, y, " ", color);
                self.set_bg(x, y, color);
                x += 1.0;
            }
            y += 1.0;
        }
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        // Cells are coarse: a border drawn on all four sides of a one-cell
        // high rect would cover the fill entirely, so thin rects only get
        // their left and right edges marked.
        let rows = (rect.bottom().floor() - rect.y.floor()) as i64 + 1;
        let mut y = rect.y.floor();
        while y < rect.bottom() {
            let top_or_bottom = y == rect.y.floor() || y + 1.0 >= rect.bottom();
            if top_or_bottom && rows >= 3 {
                let mut x = rect.x.floor();
                while x < rect.right() {
                    self.set_bg(x, y, color);
                    x += 1.0;
                }
            } else {
                self.set_bg(rect.x, y, color);
                self.set_bg(rect.right() - 1.0, y, color);
            }
            y += 1.0;
        }
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, color: Color, background: Option<Color>) {
        let mut column = x.floor();
        for symbol in text.chars() {
            self.set_symbol(column, y, &symbol.to_string(), color);
            if let Some(background) = background {
                self.set_bg(column, y, background);
            }
            column += 1.0;
        }
    }

    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64
    }
}

/// Character-cell text metric, shared with the scene builder so layout and
/// rendering agree on widths.
pub fn measure_text(text: &str) -> f64 {
    text.chars().count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    fn buffer() -> Buffer {
        Buffer::empty(Area::new(0, 0, 20, 5))
    }

    #[test]
    fn text_lands_in_cells() {
        let mut buffer = buffer();
        let mut canvas = CellCanvas::new(&mut buffer, Area::new(0, 0, 20, 5));
        canvas.draw_text(2.0, 1.0, "hi", color::BLACK, None);
        assert_eq!(buffer.cell((2, 1)).unwrap().symbol(), "h");
        assert_eq!(buffer.cell((3, 1)).unwrap().symbol(), "i");
    }

    #[test]
    fn fill_sets_background_inside_rect_only() {
        let mut buffer = buffer();
        let mut canvas = CellCanvas::new(&mut buffer, Area::new(0, 0, 20, 5));
        let red = Color::new(255, 0, 0);
        canvas.fill_rect(Rect::new(1.0, 1.0, 3.0, 2.0), red);
        assert_eq!(buffer.cell((1, 1)).unwrap().bg, TermColor::Rgb(255, 0, 0));
        assert_eq!(buffer.cell((3, 2)).unwrap().bg, TermColor::Rgb(255, 0, 0));
        assert_eq!(buffer.cell((4, 1)).unwrap().bg, TermColor::Reset);
        assert_eq!(buffer.cell((1, 3)).unwrap().bg, TermColor::Reset);
    }

    #[test]
    fn drawing_outside_the_area_is_ignored() {
        let mut buffer = buffer();
        let mut canvas = CellCanvas::new(&mut buffer, Area::new(0, 0, 20, 5));
        canvas.draw_text(-5.0, -1.0, "x", color::BLACK, None);
        canvas.draw_text(25.0, 10.0, "x", color::BLACK, None);
        canvas.fill_rect(Rect::new(18.0, 4.0, 10.0, 10.0), Color::new(0, 255, 0));
        assert_eq!(buffer.cell((19, 4)).unwrap().bg, TermColor::Rgb(0, 255, 0));
    }

    #[test]
    fn vertical_line_uses_bar_symbol() {
        let mut buffer = buffer();
        let mut canvas = CellCanvas::new(&mut buffer, Area::new(0, 0, 20, 5));
        canvas.draw_line(4.0, 0.0, 4.0, 5.0, color::BLACK);
        for row in 0..5 {
            assert_eq!(buffer.cell((4, row)).unwrap().symbol(), "\u{2502}");
        }
    }

    #[test]
    fn area_offset_is_applied() {
        let mut buffer = Buffer::empty(Area::new(0, 0, 20, 10));
        let mut canvas = CellCanvas::new(&mut buffer, Area::new(5, 3, 10, 4));
        canvas.draw_text(0.0, 0.0, "a", color::BLACK, None);
        assert_eq!(buffer.cell((5, 3)).unwrap().symbol(), "a");
    }
}
