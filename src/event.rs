use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use crate::app::{App, AppEvent};

/// Polls for crossterm events and maps them to `AppEvent`s.
pub fn poll(timeout: Duration) -> Result<Option<AppEvent>> {
    if event::poll(timeout)? {
        return Ok(match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Some(AppEvent::KeyPress(key.code))
            }
            Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
            Event::Resize(..) => Some(AppEvent::Resize),
            Event::FocusLost => Some(AppEvent::FocusLost),
            _ => None,
        });
    }
    Ok(Some(AppEvent::Tick))
}

/// Runs the main event loop. The tick rate doubles as the resolution of the
/// balloon and auto-scroll timers.
pub fn run(app: &mut App, terminal: &mut crate::tui::Terminal) -> Result<()> {
    let tick_rate = Duration::from_millis(50);

    while app.running {
        let size = terminal.size()?;
        app.prepare_frame(size.width, size.height);
        terminal.draw(|frame| crate::ui::draw(frame, app))?;

        if let Some(event) = poll(tick_rate)? {
            app.update(event);
        }
    }
    Ok(())
}
