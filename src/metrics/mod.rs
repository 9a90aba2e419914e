use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by an engine over its lifetime.
#[derive(Debug, Default, Clone)]
pub struct PlacementMetrics {
    passes: u64,
    items_placed: u64,
    column_changes: u64,
    width_signals: u64,
}

impl PlacementMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, items: usize) {
        self.passes = self.passes.saturating_add(1);
        self.items_placed = self.items_placed.saturating_add(items as u64);
    }

    pub fn record_column_change(&mut self) {
        self.column_changes = self.column_changes.saturating_add(1);
    }

    pub fn record_width_signal(&mut self) {
        self.width_signals = self.width_signals.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            passes: self.passes,
            items_placed: self.items_placed,
            column_changes: self.column_changes,
            width_signals: self.width_signals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub passes: u64,
    pub items_placed: u64,
    pub column_changes: u64,
    pub width_signals: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("items_placed".to_string(), json!(self.items_placed));
        map.insert("column_changes".to_string(), json!(self.column_changes));
        map.insert("width_signals".to_string(), json!(self.width_signals));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "placement_metrics", self.as_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_counters() {
        let mut metrics = PlacementMetrics::new();
        metrics.record_pass(12);
        metrics.record_pass(3);
        metrics.record_column_change();
        metrics.record_width_signal();
        metrics.record_width_signal();

        let snapshot = metrics.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.passes, 2);
        assert_eq!(snapshot.items_placed, 15);
        assert_eq!(snapshot.column_changes, 1);
        assert_eq!(snapshot.width_signals, 2);

        let event = snapshot.to_log_event("masonry::engine.metrics");
        assert_eq!(event.message, "placement_metrics");
        assert_eq!(event.field("uptime_ms"), Some(&json!(1500)));
    }
}
