use crate::types::Direction;

/// One materialized record: its absolute dataset index, the payload, and what the
/// rendering surface has measured for it so far.
///
/// Identity is the index while the item is resident; `Buffer::remove_item` renumbers the
/// tail, so an item's index (and `node_id`) can change over its lifetime.
#[derive(Clone, Debug)]
pub struct Item<T> {
    pub index: i64,
    pub data: T,
    /// Measured size in pixels, `None` until the rendering surface reports one.
    pub size: Option<f64>,
    /// Inserted-but-not-yet-measured items are kept invisible so they don't flash at a
    /// wrong position before Adjust runs.
    pub invisible: bool,
    pub(crate) to_remove: bool,
    pub(crate) remove_direction: Option<Direction>,
    /// Identifier the rendering surface tags its node with; tracks the index.
    pub node_id: String,
}

impl<T> Item<T> {
    pub fn new(index: i64, data: T) -> Self {
        Self {
            index,
            data,
            size: None,
            invisible: true,
            to_remove: false,
            remove_direction: None,
            node_id: index.to_string(),
        }
    }

    /// Size if measured, else the supplied fallback.
    pub fn size_or(&self, fallback: f64) -> f64 {
        self.size.unwrap_or(fallback)
    }

    pub(crate) fn hide(&mut self) {
        self.invisible = true;
    }

    pub(crate) fn renumber(&mut self, index: i64) {
        self.index = index;
        self.node_id = index.to_string();
    }
}
