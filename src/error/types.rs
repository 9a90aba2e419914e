use thiserror::Error;

/// Unified result type for the masonry crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the placement engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Raised before any placement happens; nothing is partially placed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("engine state unavailable (lock poisoned)")]
    EngineUnavailable,
    #[error("viewport signal unavailable (lock poisoned)")]
    SignalUnavailable,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    pub(crate) fn zero_columns(context: &str) -> Self {
        Self::InvalidConfiguration(format!("{context}: column count must be at least 1"))
    }
}
