//! Masonry column placement.
//!
//! Items are distributed over a number of columns by a greedy
//! shortest-column pass. Heights come from caller callbacks or, failing
//! those, from a content-size heuristic; the column count can follow a
//! viewport width through a breakpoint table. Rendering stays with the
//! caller, which receives `(column, item)` pairs in a stable order.

pub mod balance;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod geometry;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod responsive;
pub mod viewport;

pub use balance::{
    Column, ColumnBalancer, ColumnLayout, HeightFn, LayoutEntry, PlacedItem, Placement,
    SelectionStrategy, place, place_with,
};
pub use engine::{DEFAULT_GAP, ENGINE_TARGET, EngineConfig, MasonryEngine};
pub use error::{LayoutError, Result};
pub use estimate::{
    COMPACT_BASE_OFFSET, ContentShape, DEFAULT_BASE_OFFSET, DEFAULT_TEXT_FACTOR, HeightEstimator,
    HeightPart, Shape, TextMetric, content_size, sum_parts,
};
pub use geometry::Size;
pub use identity::{IdentityFn, KeyResolver};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, PlacementMetrics};
pub use responsive::{BreakpointTable, ResponsiveResolver, Subscription, ViewportSignal, resolve};
pub use viewport::TerminalViewport;
