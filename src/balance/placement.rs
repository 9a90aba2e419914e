use serde::Serialize;

use crate::estimate::ContentShape;
use crate::identity::KeyResolver;

/// One item routed to a column during a placement pass.
#[derive(Debug)]
pub struct PlacedItem<'a, T> {
    /// Position of the item in the input sequence.
    pub index: usize,
    pub item: &'a T,
    /// Height charged to the column for this item.
    pub height: f64,
}

impl<T> Clone for PlacedItem<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PlacedItem<'_, T> {}

/// Ordered bucket of items plus its accumulated height.
#[derive(Debug)]
pub struct Column<'a, T> {
    index: usize,
    items: Vec<PlacedItem<'a, T>>,
    height: f64,
}

impl<'a, T> Column<'a, T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            items: Vec::new(),
            height: 0.0,
        }
    }

    pub(crate) fn push(&mut self, placed: PlacedItem<'a, T>) {
        self.height += placed.height;
        self.items.push(placed);
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[PlacedItem<'a, T>] {
        &self.items
    }

    pub fn items(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().map(|placed| placed.item)
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rendered extent once `gap` is inserted between consecutive items.
    /// The gap never influences which column an item lands in.
    pub fn extent(&self, gap: f64) -> f64 {
        let gaps = self.items.len().saturating_sub(1) as f64;
        self.height + gap.max(0.0) * gaps
    }
}

/// Result of one placement pass: `column_count` buckets in column order.
#[derive(Debug)]
pub struct Placement<'a, T> {
    columns: Vec<Column<'a, T>>,
}

impl<'a, T> Placement<'a, T> {
    pub(crate) fn from_columns(columns: Vec<Column<'a, T>>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column<'a, T>] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column<'a, T>> {
        self.columns.get(index)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of placed items.
    pub fn len(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Column::is_empty)
    }

    /// `(column_index, item)` pairs, column by column, in bucket order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, &'a T)> + '_ {
        self.columns
            .iter()
            .flat_map(|column| column.items().map(move |item| (column.index, item)))
    }

    /// Render keys for every placed item, in the same order as [`pairs`].
    ///
    /// [`pairs`]: Placement::pairs
    pub fn keyed_pairs(&self, keys: &KeyResolver<T>) -> Vec<(String, usize, &'a T)>
    where
        T: ContentShape,
    {
        self.columns
            .iter()
            .flat_map(|column| {
                column.items().enumerate().map(move |(position, item)| {
                    (keys.key(column.index, position, item), column.index, item)
                })
            })
            .collect()
    }

    pub fn column_heights(&self) -> Vec<f64> {
        self.columns.iter().map(Column::height).collect()
    }

    pub fn tallest(&self) -> f64 {
        self.columns.iter().map(Column::height).fold(0.0, f64::max)
    }

    pub fn shortest(&self) -> f64 {
        self.columns
            .iter()
            .map(Column::height)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Difference between the tallest and the shortest column.
    pub fn spread(&self) -> f64 {
        self.tallest() - self.shortest()
    }

    /// Owned, reference free copy of the assignment.
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout {
            columns: self
                .columns
                .iter()
                .map(|column| {
                    column
                        .items
                        .iter()
                        .map(|placed| LayoutEntry {
                            index: placed.index,
                            height: placed.height,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutEntry {
    pub index: usize,
    pub height: f64,
}

/// Placement stored as input indices, so it can outlive the borrow of the
/// item slice it was computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnLayout {
    columns: Vec<Vec<LayoutEntry>>,
}

impl ColumnLayout {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Vec<LayoutEntry>] {
        &self.columns
    }

    /// Input indices per column.
    pub fn indices(&self) -> Vec<Vec<usize>> {
        self.columns
            .iter()
            .map(|column| column.iter().map(|entry| entry.index).collect())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hash of the assignment: column count, indices and resolved heights.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.columns.len() as u64).to_le_bytes());
        for column in &self.columns {
            hasher.update(&(column.len() as u64).to_le_bytes());
            for entry in column {
                hasher.update(&(entry.index as u64).to_le_bytes());
                hasher.update(&entry.height.to_bits().to_le_bytes());
            }
        }
        hasher.finalize()
    }

    /// Re-borrow the layout against the items it was computed from. Entries
    /// whose index falls outside `items` are skipped.
    pub fn view<'a, T>(&self, items: &'a [T]) -> Placement<'a, T> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, entries)| {
                let mut column = Column::new(index);
                for entry in entries {
                    if let Some(item) = items.get(entry.index) {
                        column.push(PlacedItem {
                            index: entry.index,
                            item,
                            height: entry.height,
                        });
                    }
                }
                column
            })
            .collect();
        Placement::from_columns(columns)
    }
}
