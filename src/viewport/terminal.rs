use std::io::{self, IsTerminal};
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal;

use crate::error::Result;
use crate::geometry::Size;
use crate::responsive::ViewportSignal;

/// Terminal backed width source. Widths are reported in character cells.
///
/// When stdout is not a terminal there is no viewport: [`probe`] returns
/// `None` and nothing is ever emitted, so engines stay on their fallback
/// column count.
///
/// [`probe`]: TerminalViewport::probe
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalViewport;

impl TerminalViewport {
    pub fn probe() -> Option<Size> {
        if !io::stdout().is_terminal() {
            return None;
        }
        terminal::size()
            .ok()
            .map(|(width, height)| Size::new(width, height))
    }

    /// Emit the current terminal width, if there is a terminal.
    pub fn seed(signal: &ViewportSignal) -> bool {
        match Self::probe() {
            Some(size) => signal.emit(u32::from(size.width)),
            None => false,
        }
    }

    /// Forward a resize event; other events are ignored.
    pub fn forward(signal: &ViewportSignal, event: &Event) -> bool {
        match event {
            Event::Resize(width, _) => signal.emit(u32::from(*width)),
            _ => false,
        }
    }

    /// Wait up to `timeout` for one terminal event and forward it. Returns the
    /// event so callers can handle input themselves.
    pub fn poll(signal: &ViewportSignal, timeout: Duration) -> Result<Option<Event>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = event::read()?;
        Self::forward(signal, &event);
        Ok(Some(event))
    }
}
