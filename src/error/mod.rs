//! Error types shared by every module of the crate.

mod types;

pub use types::{LayoutError, Result};
