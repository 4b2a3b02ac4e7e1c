use crate::settings::Settings;
use crate::types::{Direction, ViewportInfo};

/// The host boundary: everything the engine needs from the scroll container and the
/// rendering surface, and nothing else. These are the only points where the core touches
/// layout state.
///
/// Implementations are expected to be cheap; the engine reads positions and sizes many
/// times per loop.
pub trait Viewport {
    /// Current scroll position of the host container, in pixels.
    fn scroll_position(&self) -> f64;

    fn set_scroll_position(&mut self, value: f64);

    /// Size of the viewport along the scroll axis.
    fn size(&self) -> f64;

    /// Offset of the list inside the scroll container; non-zero for document-level
    /// scrolling setups.
    fn offset(&self) -> f64 {
        0.0
    }

    /// Measured size of the rendered item at `index`, or `None` if the rendering surface
    /// has not mounted it (yet).
    fn item_size(&self, index: i64) -> Option<f64>;

    /// Writes the size of one of the two padding spacers.
    fn set_padding_size(&mut self, direction: Direction, size: f64);
}

/// The two pixel accumulators standing in for content outside the rendered window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Paddings {
    pub backward: f64,
    pub forward: f64,
}

impl Paddings {
    pub fn by_direction(&mut self, direction: Direction) -> &mut f64 {
        match direction {
            Direction::Backward => &mut self.backward,
            Direction::Forward => &mut self.forward,
        }
    }

    pub fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Backward => self.backward,
            Direction::Forward => self.forward,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Engine-side wrapper over the host [`Viewport`]: keeps the authoritative padding
/// mirror, the start delta computed by PreFetch, and the buffer-padding margin.
pub(crate) struct ViewportAdapter {
    host: Box<dyn Viewport>,
    pub paddings: Paddings,
    /// Pixels of virtual content standing before the first rendered item, recomputed
    /// each loop by PreFetch.
    pub start_delta: f64,
    padding_ratio: f64,
    window_viewport: bool,
}

impl ViewportAdapter {
    pub fn new(host: Box<dyn Viewport>, settings: &Settings) -> Self {
        Self {
            host,
            paddings: Paddings::default(),
            start_delta: 0.0,
            padding_ratio: settings.padding,
            window_viewport: settings.window_viewport,
        }
    }

    pub fn scroll_position(&self) -> f64 {
        self.host.scroll_position()
    }

    pub fn set_scroll_position(&mut self, value: f64) {
        let value = value.max(0.0);
        if self.host.scroll_position() == value {
            strace!(value, "setting scroll position [cancelled]");
            return;
        }
        self.host.set_scroll_position(value);
        strace!(value, "setting scroll position");
    }

    pub fn size(&self) -> f64 {
        self.host.size()
    }

    /// List offset inside the scroll container; zero unless document-level scrolling is
    /// configured.
    pub fn offset(&self) -> f64 {
        if self.window_viewport {
            self.host.offset()
        } else {
            0.0
        }
    }

    pub fn item_size(&self, index: i64) -> Option<f64> {
        self.host.item_size(index)
    }

    /// The out-of-viewport margin that is kept rendered, in pixels.
    pub fn buffer_padding(&self) -> f64 {
        self.host.size() * self.padding_ratio
    }

    pub fn add_padding(&mut self, direction: Direction, size: f64) {
        *self.paddings.by_direction(direction) += size;
        let value = self.paddings.get(direction);
        self.host.set_padding_size(direction, value);
    }

    pub fn set_padding(&mut self, direction: Direction, size: f64) {
        let size = size.max(0.0);
        *self.paddings.by_direction(direction) = size;
        self.host.set_padding_size(direction, size);
    }

    /// Zeroes both paddings and the scroll position; used at session start and reload.
    pub fn reset(&mut self) {
        self.paddings.reset();
        self.host.set_padding_size(Direction::Backward, 0.0);
        self.host.set_padding_size(Direction::Forward, 0.0);
        self.host.set_scroll_position(0.0);
        self.start_delta = 0.0;
    }

    pub fn info(&self) -> ViewportInfo {
        ViewportInfo {
            scroll_position: self.host.scroll_position(),
            size: self.host.size(),
            backward_padding: self.paddings.backward,
            forward_padding: self.paddings.forward,
        }
    }
}

impl core::fmt::Debug for ViewportAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportAdapter")
            .field("paddings", &self.paddings)
            .field("start_delta", &self.start_delta)
            .field("padding_ratio", &self.padding_ratio)
            .field("window_viewport", &self.window_viewport)
            .finish_non_exhaustive()
    }
}
