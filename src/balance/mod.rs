//! Greedy shortest-column balancing.

mod core;
mod placement;
mod queue;

pub use self::core::{ColumnBalancer, HeightFn, place, place_with};
pub use placement::{Column, ColumnLayout, LayoutEntry, PlacedItem, Placement};
pub use queue::{HEAP_THRESHOLD, SelectionStrategy};
