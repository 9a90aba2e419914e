use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Minimum viewport width (inclusive) → column count.
///
/// Entries are kept sorted by descending threshold so resolution is a first
/// match scan. Deserializes from a JSON object such as
/// `{"0": 1, "600": 2, "1000": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u32, usize>", into = "BTreeMap<u32, usize>")]
pub struct BreakpointTable {
    entries: Vec<(u32, usize)>,
}

impl BreakpointTable {
    /// Build a table; a repeated threshold keeps its last count.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, usize)>,
    {
        let map: BTreeMap<u32, usize> = entries.into_iter().collect();
        Self::try_from(map)
    }

    /// Entries in descending threshold order.
    pub fn entries(&self) -> &[(u32, usize)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count for the greatest threshold not above `width`.
    pub fn lookup(&self, width: u32) -> Option<usize> {
        self.entries
            .iter()
            .find(|(threshold, _)| *threshold <= width)
            .map(|(_, columns)| *columns)
    }
}

impl TryFrom<BTreeMap<u32, usize>> for BreakpointTable {
    type Error = LayoutError;

    fn try_from(map: BTreeMap<u32, usize>) -> Result<Self> {
        if let Some((threshold, _)) = map.iter().find(|(_, columns)| **columns == 0) {
            return Err(LayoutError::zero_columns(&format!(
                "breakpoint at width {threshold}"
            )));
        }
        Ok(Self {
            entries: map.into_iter().rev().collect(),
        })
    }
}

impl From<BreakpointTable> for BTreeMap<u32, usize> {
    fn from(table: BreakpointTable) -> Self {
        table.entries.into_iter().collect()
    }
}

/// Map a viewport width to a column count.
///
/// Without a width (headless) or without a table the fallback is returned, as
/// it is when the viewport is narrower than every threshold.
pub fn resolve(
    viewport_width: Option<u32>,
    breakpoints: Option<&BreakpointTable>,
    fallback_columns: usize,
) -> usize {
    match (viewport_width, breakpoints) {
        (Some(width), Some(table)) => table.lookup(width).unwrap_or(fallback_columns),
        _ => fallback_columns,
    }
}

/// Stateful wrapper around [`resolve`] that reports only changes.
#[derive(Debug, Clone)]
pub struct ResponsiveResolver {
    breakpoints: Option<BreakpointTable>,
    fallback_columns: usize,
    current: Option<usize>,
}

impl ResponsiveResolver {
    pub fn new(breakpoints: Option<BreakpointTable>, fallback_columns: usize) -> Result<Self> {
        if fallback_columns == 0 {
            return Err(LayoutError::zero_columns("fallback"));
        }
        Ok(Self {
            breakpoints,
            fallback_columns,
            current: None,
        })
    }

    pub fn breakpoints(&self) -> Option<&BreakpointTable> {
        self.breakpoints.as_ref()
    }

    pub fn fallback_columns(&self) -> usize {
        self.fallback_columns
    }

    /// Last count handed out by [`update`](Self::update).
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn resolve(&self, viewport_width: Option<u32>) -> usize {
        resolve(
            viewport_width,
            self.breakpoints.as_ref(),
            self.fallback_columns,
        )
    }

    /// Resolve and remember; `Some(count)` only when the count changed.
    pub fn update(&mut self, viewport_width: Option<u32>) -> Option<usize> {
        let columns = self.resolve(viewport_width);
        if self.current == Some(columns) {
            return None;
        }
        self.current = Some(columns);
        Some(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u32, usize)]) -> BreakpointTable {
        BreakpointTable::new(entries.iter().copied()).unwrap()
    }

    #[test]
    fn picks_greatest_threshold_at_or_below_width() {
        let table = table(&[(0, 1), (600, 2), (1000, 3)]);
        assert_eq!(resolve(Some(750), Some(&table), 9), 2);
        assert_eq!(resolve(Some(600), Some(&table), 9), 2);
        assert_eq!(resolve(Some(599), Some(&table), 9), 1);
        assert_eq!(resolve(Some(4000), Some(&table), 9), 3);
    }

    #[test]
    fn narrow_viewport_uses_fallback() {
        let table = table(&[(600, 2), (1000, 3)]);
        assert_eq!(resolve(Some(300), Some(&table), 4), 4);
    }

    #[test]
    fn missing_table_or_width_uses_fallback() {
        let table = table(&[(0, 5)]);
        assert_eq!(resolve(Some(1200), None, 2), 2);
        assert_eq!(resolve(None, Some(&table), 2), 2);
    }

    #[test]
    fn entries_are_sorted_descending_and_deduplicated() {
        let table = table(&[(600, 2), (0, 1), (1000, 3), (600, 4)]);
        assert_eq!(table.entries(), &[(1000, 3), (600, 4), (0, 1)]);
    }

    #[test]
    fn resolution_is_monotonic_in_width() {
        let table = table(&[(0, 1), (480, 2), (768, 3), (1024, 4), (1440, 6)]);
        let threshold_for = |width: u32| {
            table
                .entries()
                .iter()
                .find(|(t, _)| *t <= width)
                .map(|(t, _)| *t)
        };
        for smaller in (0..2000).step_by(37) {
            for larger in (smaller..2000).step_by(53) {
                assert!(threshold_for(larger) >= threshold_for(smaller));
            }
        }
    }

    #[test]
    fn zero_column_breakpoint_is_rejected() {
        let err = BreakpointTable::new([(0, 1), (600, 0)]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfiguration(_)));
    }

    #[test]
    fn table_deserializes_from_json_object() {
        let table: BreakpointTable =
            serde_json::from_str(r#"{"0": 1, "600": 2, "1000": 3}"#).unwrap();
        assert_eq!(table.lookup(750), Some(2));
        assert!(serde_json::from_str::<BreakpointTable>(r#"{"600": 0}"#).is_err());
    }

    #[test]
    fn resolver_reports_only_changes() {
        let mut resolver =
            ResponsiveResolver::new(Some(table(&[(0, 1), (600, 2)])), 1).unwrap();
        assert_eq!(resolver.update(None), Some(1));
        assert_eq!(resolver.update(Some(100)), None);
        assert_eq!(resolver.update(Some(700)), Some(2));
        assert_eq!(resolver.update(Some(900)), None);
        assert_eq!(resolver.current(), Some(2));
    }

    #[test]
    fn resolver_rejects_zero_fallback() {
        assert!(ResponsiveResolver::new(None, 0).is_err());
    }
}
