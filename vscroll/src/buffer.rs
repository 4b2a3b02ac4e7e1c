use crate::cache::Cache;
use crate::item::Item;
use crate::settings::Settings;
use crate::types::BufferInfo;

type ItemsSubscriber<T> = Box<dyn Fn(&[Item<T>])>;

/// The ordered window of currently materialized items.
///
/// Invariants, for every reachable state:
/// - resident items are ascending and contiguous in index (no gaps);
/// - `abs_min_index <= first_index <= last_index <= abs_max_index` whenever non-empty
///   (for whichever bounds are known).
///
/// `abs_min_index`/`abs_max_index` start at the user-configured bounds and narrow as
/// BOF/EOF are discovered; `min_index_user`/`max_index_user` never move.
pub struct Buffer<T> {
    items: Vec<Item<T>>,
    subscribers: Vec<ItemsSubscriber<T>>,

    pub(crate) cache: Cache,
    pub(crate) min_index_user: Option<i64>,
    pub(crate) max_index_user: Option<i64>,
    pub(crate) abs_min_index: Option<i64>,
    pub(crate) abs_max_index: Option<i64>,

    start_index: i64,
}

impl<T> Buffer<T> {
    pub(crate) fn new(settings: &Settings, start_index: i64) -> Self {
        let mut buffer = Self {
            items: Vec::new(),
            subscribers: Vec::new(),
            cache: Cache::new(settings.item_size),
            min_index_user: settings.min_index,
            max_index_user: settings.max_index,
            abs_min_index: settings.min_index,
            abs_max_index: settings.max_index,
            start_index,
        };
        buffer.reset(false, None);
        buffer
    }

    /// Clears the window. On reload the old items are hidden first so the rendering
    /// surface can drop them in one pass.
    pub(crate) fn reset(&mut self, reload: bool, start_index: Option<i64>) {
        if reload {
            for item in &mut self.items {
                item.hide();
            }
            self.emit();
        }
        self.items.clear();
        self.cache.reset();
        self.abs_min_index = self.min_index_user;
        self.abs_max_index = self.max_index_user;
        if let Some(index) = start_index {
            self.start_index = index;
        }
        self.emit();
    }

    pub fn items(&self) -> &[Item<T>] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Item<T>] {
        &mut self.items
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn average_size(&self) -> Option<f64> {
        self.cache.average_size()
    }

    /// Whether any size information exists at all (a measurement or a configured hint).
    pub(crate) fn has_item_size(&self) -> bool {
        self.average_size().is_some()
    }

    /// Cache span start, falling back to the start index before anything was recorded.
    pub(crate) fn min_index(&self) -> i64 {
        self.cache.min_index().unwrap_or(self.start_index)
    }

    pub(crate) fn max_index(&self) -> i64 {
        self.cache.max_index().unwrap_or(self.start_index)
    }

    /// Beginning-of-data: the first resident item sits on the absolute minimum bound.
    /// An empty buffer counts as BOF whenever that bound is known at all.
    pub fn bof(&self) -> bool {
        match self.items.first() {
            Some(first) => Some(first.index) == self.abs_min_index,
            None => self.abs_min_index.is_some(),
        }
    }

    pub fn eof(&self) -> bool {
        match self.items.last() {
            Some(last) => Some(last.index) == self.abs_max_index,
            None => self.abs_max_index.is_some(),
        }
    }

    pub fn first_index(&self) -> Option<i64> {
        self.items.first().map(|item| item.index)
    }

    pub fn last_index(&self) -> Option<i64> {
        self.items.last().map(|item| item.index)
    }

    pub fn get(&self, index: i64) -> Option<&Item<T>> {
        self.items.iter().find(|item| item.index == index)
    }

    pub(crate) fn get_mut(&mut self, index: i64) -> Option<&mut Item<T>> {
        self.items.iter_mut().find(|item| item.index == index)
    }

    /// Inserts a contiguous block, but only when it attaches exactly at the current front
    /// or back (or the buffer is empty). Returns `false` and changes nothing otherwise;
    /// the caller is expected to already know where the block belongs.
    pub(crate) fn set_items(&mut self, items: Vec<Item<T>>) -> bool {
        let (Some(block_first), Some(block_last)) =
            (items.first().map(|i| i.index), items.last().map(|i| i.index))
        else {
            return false;
        };
        if self.items.is_empty() {
            self.items = items;
        } else if block_last + 1 == self.items[0].index {
            let mut merged = items;
            merged.append(&mut self.items);
            self.items = merged;
        } else if block_first - 1 == self.items[self.items.len() - 1].index {
            self.items.extend(items);
        } else {
            return false;
        }
        self.emit();
        true
    }

    /// Unconditional concatenation; adjacency must have been established upstream.
    pub(crate) fn append(&mut self, items: Vec<Item<T>>) {
        self.items.extend(items);
        self.emit();
    }

    pub(crate) fn prepend(&mut self, items: Vec<Item<T>>) {
        let mut merged = items;
        merged.append(&mut self.items);
        self.items = merged;
        self.emit();
    }

    /// Removes the item at `index`, renumbers every later item down by one (the tail
    /// shifts to preserve contiguity) and narrows `abs_max_index` by one. The cache is
    /// renumbered in lockstep so size records stay attached to the items they measure.
    ///
    /// O(buffer size), and it changes the identity of every later item; removing a range
    /// therefore means calling this once per item, re-scanning between calls.
    pub(crate) fn remove_item(&mut self, index: i64) {
        self.items.retain(|item| item.index != index);
        for item in &mut self.items {
            if item.index > index {
                item.renumber(item.index - 1);
            }
        }
        self.abs_max_index = self.abs_max_index.map(|max| max - 1);
        self.cache.remove_and_shift(index);
        self.emit();
    }

    /// Removes the item at `index` without renumbering. Used for clipping off a
    /// contiguous edge, where the remaining items are untouched and the size record must
    /// survive for padding recomputation.
    pub(crate) fn drop_item(&mut self, index: i64) {
        self.items.retain(|item| item.index != index);
        self.emit();
    }

    pub fn first_visible_item(&self) -> Option<&Item<T>> {
        self.items.iter().find(|item| !item.invisible)
    }

    pub fn last_visible_item(&self) -> Option<&Item<T>> {
        self.items.iter().rev().find(|item| !item.invisible)
    }

    /// Records a measured size on both the item and the cache. Returns `false` when
    /// `index` is not resident.
    pub(crate) fn set_size(&mut self, index: i64, size: f64) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.index == index) else {
            return false;
        };
        item.size = Some(size);
        self.cache.insert(index, size);
        true
    }

    /// Makes a rendered item visible. Membership did not change, so no notification;
    /// callers batch one [`Self::notify`] at the end.
    pub(crate) fn reveal(&mut self, index: i64) {
        if let Some(item) = self.items.iter_mut().find(|item| item.index == index) {
            item.invisible = false;
        }
    }

    pub(crate) fn notify(&self) {
        self.emit();
    }

    /// Cached size for `index`, falling back to the running average, then the configured
    /// item size.
    pub(crate) fn size_by_index(&self, index: i64) -> Option<f64> {
        self.cache.get(index).or_else(|| self.average_size())
    }

    pub(crate) fn check_average_size(&mut self) -> bool {
        self.cache.recalculate_average_size()
    }

    /// The index the next appended item should take: one past the last resident item.
    /// When empty, falls back to the cache span (or start index) unless the caller
    /// asserts true EOF, in which case the absolute bound wins.
    pub(crate) fn get_index_to_append(&self, eof: bool) -> i64 {
        let base = if eof {
            self.abs_max_index.unwrap_or_else(|| self.max_index())
        } else if let Some(last) = self.last_index() {
            last
        } else {
            self.max_index()
        };
        if self.items.is_empty() { base } else { base + 1 }
    }

    pub(crate) fn get_index_to_prepend(&self, bof: bool) -> i64 {
        let base = if bof {
            self.abs_min_index.unwrap_or_else(|| self.min_index())
        } else if let Some(first) = self.first_index() {
            first
        } else {
            self.min_index()
        };
        if self.items.is_empty() { base } else { base - 1 }
    }

    /// Registers a rendering-surface subscriber; it is called synchronously after every
    /// content mutation, and immediately on registration with the current items.
    pub(crate) fn subscribe(&mut self, f: impl Fn(&[Item<T>]) + 'static) {
        f(&self.items);
        self.subscribers.push(Box::new(f));
    }

    fn emit(&self) {
        for subscriber in &self.subscribers {
            subscriber(&self.items);
        }
    }

    pub fn info(&self) -> BufferInfo {
        BufferInfo {
            first_index: self.first_index(),
            last_index: self.last_index(),
            size: self.size(),
            abs_min_index: self.abs_min_index,
            abs_max_index: self.abs_max_index,
            average_size: self.average_size(),
            bof: self.bof(),
            eof: self.eof(),
        }
    }
}

impl<T> core::fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.items.len())
            .field("first_index", &self.first_index())
            .field("last_index", &self.last_index())
            .field("abs_min_index", &self.abs_min_index)
            .field("abs_max_index", &self.abs_max_index)
            .finish_non_exhaustive()
    }
}
