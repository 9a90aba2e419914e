//! Viewport width sources that feed a [`ViewportSignal`](crate::ViewportSignal).

mod terminal;

pub use terminal::TerminalViewport;
