//! Responsive column counts.
//!
//! [`resolve`] is the pure width → column count mapping; [`ViewportSignal`]
//! carries width changes to whoever needs to re-run placement.

mod core;
mod signal;

pub use self::core::{BreakpointTable, ResponsiveResolver, resolve};
pub use signal::{Subscription, ViewportSignal};
