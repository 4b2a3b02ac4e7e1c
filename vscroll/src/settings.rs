/// Configuration for a scrolling session.
///
/// Construct with [`Settings::default`] and the `with_*` builders, then hand it to
/// `Workflow::new`, which validates it once and keeps it immutable for the session's
/// lifetime. Out-of-range values are a fatal construction error, never a runtime one.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// The index the window is initially centered on. Clamped into
    /// `[min_index, max_index]` at session start.
    pub start_index: i64,
    /// Hard lower bound of the dataset, `None` when unbounded.
    pub min_index: Option<i64>,
    /// Hard upper bound of the dataset, `None` when unbounded.
    pub max_index: Option<i64>,
    /// Minimum number of items per fetch request; also the fallback window size when no
    /// item size information exists yet.
    pub buffer_size: usize,
    /// Out-of-viewport margin kept rendered, as a fraction of the viewport size.
    pub padding: f64,
    /// Optional fixed item size hint, in pixels. Seeds the average before anything has
    /// been measured.
    pub item_size: Option<f64>,
    /// Infinite mode: nothing is ever clipped, and fetch windows are snapped adjacent to
    /// the buffer so no gaps open up.
    pub infinite: bool,
    /// Document-level scrolling: the list's offset inside the scroll container is added
    /// to the start delta.
    pub window_viewport: bool,
    /// Scroll events are debounced by this many milliseconds before a workflow cycle
    /// starts. Zero fires immediately.
    pub scroll_debounce_ms: u64,
    /// Distinguishes sessions in log lines and loop identifiers.
    pub instance_index: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_index: 1,
            min_index: None,
            max_index: None,
            buffer_size: 5,
            padding: 0.5,
            item_size: None,
            infinite: false,
            window_viewport: false,
            scroll_debounce_ms: 40,
            instance_index: 1,
        }
    }
}

impl Settings {
    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_bounds(mut self, min_index: Option<i64>, max_index: Option<i64>) -> Self {
        self.min_index = min_index;
        self.max_index = max_index;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_item_size(mut self, item_size: f64) -> Self {
        self.item_size = Some(item_size);
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    pub fn with_window_viewport(mut self, window_viewport: bool) -> Self {
        self.window_viewport = window_viewport;
        self
    }

    pub fn with_scroll_debounce_ms(mut self, scroll_debounce_ms: u64) -> Self {
        self.scroll_debounce_ms = scroll_debounce_ms;
        self
    }

    pub fn with_instance_index(mut self, instance_index: usize) -> Self {
        self.instance_index = instance_index;
        self
    }

    /// Validates the configuration. `Workflow::new` calls this; it is public so hosts can
    /// surface configuration problems before wiring a session up.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.buffer_size < 1 {
            return Err(SettingsError::BufferSize(self.buffer_size));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(SettingsError::Padding(self.padding));
        }
        if let Some(size) = self.item_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(SettingsError::ItemSize(size));
            }
        }
        if let (Some(min), Some(max)) = (self.min_index, self.max_index) {
            if min > max {
                return Err(SettingsError::Bounds { min, max });
            }
        }
        Ok(())
    }
}

/// A fatal configuration error, reported once at session construction.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("buffer_size must be at least 1, got {0}")]
    BufferSize(usize),
    #[error("padding must be finite and non-negative, got {0}")]
    Padding(f64),
    #[error("item_size must be finite and positive, got {0}")]
    ItemSize(f64),
    #[error("min_index ({min}) must not exceed max_index ({max})")]
    Bounds { min: i64, max: i64 },
}
