use std::collections::HashMap;

use crate::item::Item;

/// Sparse map of absolute index → measured size, plus the running average used to
/// estimate items that have never been measured.
///
/// The span (`min_index`/`max_index`) covers every index ever recorded, not just the
/// currently resident ones; clipped items keep their size record so paddings can be
/// recomputed exactly.
#[derive(Debug)]
pub struct Cache {
    sizes: HashMap<i64, f64>,
    min_index: Option<i64>,
    max_index: Option<i64>,
    average: Option<f64>,
    /// Configured fixed-size hint; stands in for the average until a size is recorded.
    item_size: Option<f64>,
}

impl Cache {
    pub fn new(item_size: Option<f64>) -> Self {
        Self {
            sizes: HashMap::new(),
            min_index: None,
            max_index: None,
            average: None,
            item_size,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn min_index(&self) -> Option<i64> {
        self.min_index
    }

    pub fn max_index(&self) -> Option<i64> {
        self.max_index
    }

    /// Recorded running average, falling back to the configured item size hint.
    ///
    /// `None` until at least one size has been recorded and no hint is configured.
    pub fn average_size(&self) -> Option<f64> {
        self.average.or(self.item_size)
    }

    /// Records (or overwrites) the size for the item's index and extends the span.
    ///
    /// The running average is not refreshed here; call [`Self::recalculate_average_size`]
    /// once per batch.
    pub fn add<T>(&mut self, item: &Item<T>) {
        let Some(size) = item.size else {
            return;
        };
        self.insert(item.index, size);
    }

    pub(crate) fn insert(&mut self, index: i64, size: f64) {
        self.sizes.insert(index, size);
        self.min_index = Some(self.min_index.map_or(index, |min| min.min(index)));
        self.max_index = Some(self.max_index.map_or(index, |max| max.max(index)));
    }

    /// Recomputes the mean over all recorded sizes. Returns whether the average changed,
    /// which is what decides whether a dependent re-layout pass is worth running.
    pub fn recalculate_average_size(&mut self) -> bool {
        if self.sizes.is_empty() {
            return false;
        }
        let total: f64 = self.sizes.values().sum();
        let next = total / self.sizes.len() as f64;
        let changed = self.average != Some(next);
        self.average = Some(next);
        changed
    }

    pub fn get(&self, index: i64) -> Option<f64> {
        self.sizes.get(&index).copied()
    }

    /// Point delete. Does not shift other indexes; see [`Self::remove_and_shift`] for the
    /// variant matching `Buffer::remove_item`'s renumbering.
    pub fn remove(&mut self, index: i64) {
        self.sizes.remove(&index);
        self.refresh_span();
    }

    /// Deletes the record at `index` and renumbers every record with a greater index down
    /// by one, keeping cached sizes attached to the items they measure when the buffer
    /// renumbers its tail.
    pub fn remove_and_shift(&mut self, index: i64) {
        self.sizes.remove(&index);
        let shifted: Vec<(i64, f64)> = self
            .sizes
            .drain()
            .map(|(i, size)| if i > index { (i - 1, size) } else { (i, size) })
            .collect();
        self.sizes.extend(shifted);
        self.refresh_span();
    }

    pub fn reset(&mut self) {
        self.sizes.clear();
        self.min_index = None;
        self.max_index = None;
        self.average = None;
    }

    fn refresh_span(&mut self) {
        self.min_index = self.sizes.keys().min().copied();
        self.max_index = self.sizes.keys().max().copied();
    }
}
