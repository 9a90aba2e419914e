use std::fmt;

use crate::error::{LayoutError, Result};
use crate::estimate::{ContentShape, HeightEstimator, sanitize_height};

use super::placement::{Column, PlacedItem, Placement};
use super::queue::{ColumnQueue, SelectionStrategy};

/// Caller supplied per-item height. `None` defers to the next source.
pub type HeightFn<T> = Box<dyn Fn(&T) -> Option<f64> + Send + Sync>;

/// Greedy shortest-column placement over a precomputed height source.
///
/// Items are consumed in input order; each lands in the column with the
/// smallest accumulated height, the lowest index winning ties.
pub fn place<'a, T, F>(items: &'a [T], column_count: usize, height_of: F) -> Result<Placement<'a, T>>
where
    F: FnMut(&T) -> f64,
{
    place_with(items, column_count, SelectionStrategy::Auto, height_of)
}

/// [`place`] with an explicit column selection strategy.
pub fn place_with<'a, T, F>(
    items: &'a [T],
    column_count: usize,
    strategy: SelectionStrategy,
    mut height_of: F,
) -> Result<Placement<'a, T>>
where
    F: FnMut(&T) -> f64,
{
    if column_count == 0 {
        return Err(LayoutError::zero_columns("placement"));
    }

    let mut columns: Vec<Column<'a, T>> = (0..column_count).map(Column::new).collect();
    let mut queue = ColumnQueue::new(column_count, strategy);

    for (index, item) in items.iter().enumerate() {
        let height = sanitize_height(height_of(item));
        let target = queue.push(height);
        columns[target].push(PlacedItem {
            index,
            item,
            height,
        });
    }

    Ok(Placement::from_columns(columns))
}

/// Column balancer with the three-tier height resolution: explicit height,
/// then estimation callback, then the built-in [`HeightEstimator`].
pub struct ColumnBalancer<T> {
    explicit: Option<HeightFn<T>>,
    estimate: Option<HeightFn<T>>,
    estimator: HeightEstimator,
    strategy: SelectionStrategy,
}

impl<T> Default for ColumnBalancer<T> {
    fn default() -> Self {
        Self {
            explicit: None,
            estimate: None,
            estimator: HeightEstimator::default(),
            strategy: SelectionStrategy::Auto,
        }
    }
}

impl<T> fmt::Debug for ColumnBalancer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBalancer")
            .field("explicit", &self.explicit.is_some())
            .field("estimate", &self.estimate.is_some())
            .field("estimator", &self.estimator)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl<T: ContentShape> ColumnBalancer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known height per item, e.g. from stored media dimensions.
    pub fn with_height<F>(mut self, height: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        self.explicit = Some(Box::new(height));
        self
    }

    /// Caller estimation override, consulted when no explicit height exists.
    pub fn with_estimate<F>(mut self, estimate: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        self.estimate = Some(Box::new(estimate));
        self
    }

    pub fn with_estimator(mut self, estimator: HeightEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_media_height(mut self, media_height: f64) -> Self {
        self.estimator = self.estimator.with_media_height(media_height);
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn estimator(&self) -> &HeightEstimator {
        &self.estimator
    }

    /// Height charged for `item`. Always finite and non-negative.
    pub fn height_of(&self, item: &T) -> f64 {
        let resolved = self
            .explicit
            .as_ref()
            .and_then(|explicit| explicit(item))
            .or_else(|| self.estimate.as_ref().and_then(|estimate| estimate(item)))
            .unwrap_or_else(|| self.estimator.estimate(item));
        sanitize_height(resolved)
    }

    pub fn place<'a>(&self, items: &'a [T], column_count: usize) -> Result<Placement<'a, T>> {
        place_with(items, column_count, self.strategy, |item| self.height_of(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn indices<T>(placement: &Placement<'_, T>) -> Vec<Vec<usize>> {
        placement
            .columns()
            .iter()
            .map(|column| column.entries().iter().map(|placed| placed.index).collect())
            .collect()
    }

    #[test]
    fn greedy_trace_matches_expected_columns() {
        let heights = [10.0, 20.0, 10.0, 10.0, 10.0, 10.0];
        let placement = place(&heights, 2, |h| *h).unwrap();

        assert_eq!(indices(&placement), vec![vec![0, 2, 3, 5], vec![1, 4]]);
        assert_eq!(placement.column_heights(), vec![40.0, 40.0]);
        assert_eq!(placement.spread(), 0.0);
    }

    #[test]
    fn empty_input_yields_empty_buckets() {
        let items: Vec<Value> = Vec::new();
        let placement = ColumnBalancer::new().place(&items, 3).unwrap();
        assert_eq!(placement.column_count(), 3);
        assert!(placement.is_empty());
        assert!(placement.columns().iter().all(|column| column.is_empty()));
    }

    #[test]
    fn zero_columns_is_invalid_configuration() {
        let items = vec![json!("a")];
        let err = ColumnBalancer::new().place(&items, 0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_heights_fall_back_to_index_order() {
        let items = [0.0; 7];
        let placement = place(&items, 3, |h| *h).unwrap();
        assert_eq!(
            indices(&placement),
            vec![(0..7).collect::<Vec<_>>(), Vec::new(), Vec::new()]
        );
    }

    #[test]
    fn every_item_is_placed_exactly_once() {
        let heights: Vec<f64> = (0..97).map(|i| ((i * 37) % 23) as f64 + 0.5).collect();
        for column_count in 1..=24 {
            let placement = place(&heights, column_count, |h| *h).unwrap();
            let mut seen: Vec<usize> = indices(&placement).into_iter().flatten().collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..heights.len()).collect::<Vec<_>>());
            assert_eq!(placement.column_count(), column_count);
        }
    }

    #[test]
    fn bucket_order_follows_encounter_order() {
        let heights: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64).collect();
        let placement = place(&heights, 4, |h| *h).unwrap();
        for column in indices(&placement) {
            assert!(column.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn heap_strategy_matches_scan() {
        let heights: Vec<f64> = (0..300).map(|i| ((i * 13) % 29) as f64 * 1.5).collect();
        for column_count in [1, 2, 5, 17, 40] {
            let scan = place_with(&heights, column_count, SelectionStrategy::Scan, |h| *h).unwrap();
            let heap = place_with(&heights, column_count, SelectionStrategy::Heap, |h| *h).unwrap();
            assert_eq!(indices(&scan), indices(&heap));
        }
    }

    #[test]
    fn height_sources_follow_precedence() {
        let balancer = ColumnBalancer::<Value>::new()
            .with_estimator(HeightEstimator::compact())
            .with_height(|item| item.get("height").and_then(Value::as_f64))
            .with_estimate(|item| item.get("lines").and_then(Value::as_f64).map(|l| l * 20.0));

        let explicit = json!({"height": 99.0, "lines": 2.0});
        let estimated = json!({"lines": 2.0});
        let heuristic = json!({"body": "abcdefghij"});

        assert_eq!(balancer.height_of(&explicit), 99.0);
        assert_eq!(balancer.height_of(&estimated), 40.0);
        assert!((balancer.height_of(&heuristic) - (40.0 + 3.5)).abs() < 1e-9);
    }

    #[test]
    fn invalid_callback_heights_are_clamped() {
        let balancer = ColumnBalancer::<Value>::new().with_height(|item| item.as_f64());
        assert_eq!(balancer.height_of(&json!(-5.0)), 0.0);

        let items = vec![json!(-5.0), json!(10.0), json!(1.0)];
        let placement = balancer.place(&items, 2).unwrap();
        assert_eq!(indices(&placement), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn media_height_feeds_the_fallback_estimator() {
        let balancer = ColumnBalancer::<Value>::new()
            .with_estimator(HeightEstimator::compact())
            .with_media_height(100.0);
        assert_eq!(balancer.height_of(&json!(null)), 140.0);
    }

    #[test]
    fn extent_accounts_for_gaps_only_between_items() {
        let heights = [10.0, 10.0, 10.0];
        let placement = place(&heights, 1, |h| *h).unwrap();
        let column = placement.column(0).unwrap();
        assert_eq!(column.extent(16.0), 30.0 + 32.0);

        let empty: [f64; 0] = [];
        let placement = place(&empty, 1, |h| *h).unwrap();
        assert_eq!(placement.column(0).unwrap().extent(16.0), 0.0);
    }

    #[test]
    fn layout_round_trips_through_view() {
        let items = vec![json!("aaaa"), json!("b"), json!(["cc", "dd"])];
        let placement = ColumnBalancer::new().place(&items, 2).unwrap();
        let layout = placement.layout();
        let view = layout.view(&items);

        assert_eq!(indices(&view), indices(&placement));
        assert_eq!(view.column_heights(), placement.column_heights());
        assert_eq!(layout.fingerprint(), view.layout().fingerprint());
    }

    #[test]
    fn fingerprint_covers_heights_as_well_as_slots() {
        let short = vec![json!("a"), json!("b")];
        let long = vec![json!("a".repeat(40)), json!("b".repeat(40))];
        let balancer = ColumnBalancer::new();
        let first = balancer.place(&short, 2).unwrap().layout();
        let second = balancer.place(&long, 2).unwrap().layout();

        assert_eq!(first.indices(), second.indices());
        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn pairs_walk_columns_in_order() {
        let items = vec![json!("x"), json!("y"), json!("z")];
        let placement = ColumnBalancer::new().place(&items, 2).unwrap();
        let pairs: Vec<(usize, &Value)> = placement.pairs().collect();
        assert_eq!(
            pairs,
            vec![(0, &items[0]), (0, &items[2]), (1, &items[1])]
        );
    }
}
