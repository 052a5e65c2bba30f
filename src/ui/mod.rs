/// Terminal rendering: timeline canvas, status bar and popups.
pub mod canvas;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph};

use crate::app::{App, InputPopup, NavigateMenu, Popup};
use crate::calendar::NavigationItem;
use crate::color::Color;
use crate::drawer;
use crate::drawer::Canvas;
use crate::scene::Rect as SceneRect;
use canvas::CellCanvas;
use theme::Theme;

const RUBBER_BAND: Color = Color { r: 100, g: 140, b: 255 };
const DRAG_PREVIEW: Color = Color { r: 255, g: 140, b: 0 };

const HELP: &str =
    "q quit  s save  u undo  r redo  g go to  / search  n navigate  t today  +/- zoom  c/C new  d duplicate  x delete  i import";

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    draw_timeline(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);

    match &app.popup {
        Some(Popup::Input(input)) => draw_input_popup(frame, input),
        Some(Popup::Navigate(menu)) => draw_navigate_menu(frame, menu),
        None => {}
    }
}

fn draw_timeline(frame: &mut Frame, app: &App, area: Rect) {
    let Some(scene) = &app.scene else { return };
    let mut canvas = CellCanvas::new(frame.buffer_mut(), area);
    drawer::draw(&mut canvas, &app.db, &app.view, scene);

    // Overlays for in-progress drags; the db is untouched until release.
    if let Some((left, right)) = app.interaction.rubber_band() {
        let rect = SceneRect::new(left, 0.0, (right - left).max(1.0), scene.metrics.height);
        canvas.draw_rect(rect, RUBBER_BAND);
    }
    if let Some((_, period)) = app.interaction.drag_preview() {
        let x = scene.metrics.x_for_time(period.start());
        let width = scene.metrics.width_of_period(&period).max(1.0);
        canvas.draw_rect(SceneRect::new(x, 0.0, width, scene.metrics.height), DRAG_PREVIEW);
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let hidden = app.scene.as_ref().map_or(0, |scene| scene.hidden_event_count);
    let text = match &app.status {
        Some(message) => message.clone(),
        None if hidden > 0 => format!("{hidden} event(s) hidden, zoom in to see them"),
        None => HELP.to_string(),
    };
    let paragraph = Paragraph::new(text).style(Style::default().fg(Theme::status()));
    frame.render_widget(paragraph, area);
}

fn draw_input_popup(frame: &mut Frame, popup: &InputPopup) {
    let area = centered_rect(frame.area(), 44, 3);
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(popup.title)
        .title_style(Style::default().fg(Theme::title()))
        .border_style(Style::default().fg(Theme::border()));
    // Trailing block character as a cursor.
    let text = format!("{}\u{2588}", popup.value);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_navigate_menu(frame: &mut Frame, menu: &NavigateMenu) {
    let height = (menu.items.len() as u16).saturating_add(2);
    let area = centered_rect(frame.area(), 34, height);
    frame.render_widget(Clear, area);
    let items: Vec<ListItem> = menu
        .items
        .iter()
        .map(|item| match item {
            NavigationItem::Separator => ListItem::new("\u{2500}".repeat(30)),
            NavigationItem::Entry { label, .. } => ListItem::new(*label),
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::bordered()
                .title("Navigate")
                .title_style(Style::default().fg(Theme::title()))
                .border_style(Style::default().fg(Theme::border())),
        )
        .highlight_style(
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::REVERSED),
        );
    let mut state = ListState::default().with_selected(Some(menu.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// A rect of at most `width` x `height` cells centered in `area`.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clamps_to_the_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(area, 44, 3);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.x, 0);
        let rect = centered_rect(area, 10, 4);
        assert_eq!(rect.x, 5);
        assert_eq!(rect.y, 3);
    }
}
