use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Column counts above this use the heap instead of a linear scan.
pub const HEAP_THRESHOLD: usize = 16;

/// How the balancer finds the shortest column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Scan for small column counts, heap above [`HEAP_THRESHOLD`].
    #[default]
    Auto,
    Scan,
    Heap,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    height: f64,
    index: usize,
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.height
            .total_cmp(&other.height)
            .then(self.index.cmp(&other.index))
    }
}

/// Running column heights with shortest-first selection.
///
/// Ties always resolve to the lowest column index, whichever strategy backs
/// the queue.
pub(crate) enum ColumnQueue {
    Scan(Vec<f64>),
    Heap(BinaryHeap<Reverse<Slot>>),
}

impl ColumnQueue {
    pub(crate) fn new(column_count: usize, strategy: SelectionStrategy) -> Self {
        let use_heap = match strategy {
            SelectionStrategy::Auto => column_count > HEAP_THRESHOLD,
            SelectionStrategy::Scan => false,
            SelectionStrategy::Heap => true,
        };

        if use_heap {
            ColumnQueue::Heap(
                (0..column_count)
                    .map(|index| Reverse(Slot { height: 0.0, index }))
                    .collect(),
            )
        } else {
            ColumnQueue::Scan(vec![0.0; column_count])
        }
    }

    /// Add `height` to the shortest column and return its index.
    pub(crate) fn push(&mut self, height: f64) -> usize {
        match self {
            ColumnQueue::Scan(heights) => {
                let index = shortest_column(heights);
                heights[index] += height;
                index
            }
            ColumnQueue::Heap(heap) => {
                let Some(Reverse(mut slot)) = heap.pop() else {
                    return 0;
                };
                let index = slot.index;
                slot.height += height;
                heap.push(Reverse(slot));
                index
            }
        }
    }
}

/// First index holding the minimum height.
pub(crate) fn shortest_column(heights: &[f64]) -> usize {
    let mut index = 0;
    let mut best = heights.first().copied().unwrap_or(0.0);
    for (i, height) in heights.iter().enumerate().skip(1) {
        if *height < best {
            best = *height;
            index = i;
        }
    }
    index
}
