use crate::estimate::HeightEstimator;
use crate::logging::Logger;
use crate::responsive::BreakpointTable;

/// Default spacing between cards, in height units.
pub const DEFAULT_GAP: f64 = 16.0;

/// Configuration knobs for a [`MasonryEngine`](super::MasonryEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Column count used headless, without breakpoints, or below the
    /// smallest breakpoint. Must be at least 1.
    pub fallback_columns: usize,
    /// Width → column count table; `None` pins the fallback count.
    pub breakpoints: Option<BreakpointTable>,
    /// Space between items within a column. Never affects placement.
    pub gap: f64,
    /// Fallback height heuristic.
    pub estimator: HeightEstimator,
    /// Optional structured logger used by the engine.
    pub logger: Option<Logger>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_columns: 1,
            breakpoints: None,
            gap: DEFAULT_GAP,
            estimator: HeightEstimator::default(),
            logger: None,
            metrics_target: "masonry::engine.metrics".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_fallback_columns(mut self, columns: usize) -> Self {
        self.fallback_columns = columns;
        self
    }

    pub fn with_breakpoints(mut self, breakpoints: BreakpointTable) -> Self {
        self.breakpoints = Some(breakpoints);
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_estimator(mut self, estimator: HeightEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }
}
