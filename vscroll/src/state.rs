use std::time::Instant;

use crate::settings::Settings;
use crate::signal::Signal;
use crate::types::{Direction, ItemAdapter, Process};

/// Pending-fetch window and bookkeeping for the current loop.
#[derive(Debug)]
pub(crate) struct FetchModel {
    /// First/last index of the range to fetch; `None` when nothing survived planning.
    pub first_index: Option<i64>,
    pub last_index: Option<i64>,
    pub direction: Option<Direction>,
    /// The planned window straddled a resident block; the skipped run should be picked
    /// up by a follow-up loop.
    pub has_another_pack: bool,
    /// Indexes of items staged for the Render step (freshly fetched, appended, or
    /// re-measured replacements).
    pub items: Vec<i64>,
    /// Render should re-measure rather than first-measure (check flow).
    pub is_replace: bool,
    /// A fetch succeeded during this loop.
    pub success: bool,
    /// Total datasource calls over the session.
    pub call_count: usize,
}

impl FetchModel {
    fn new() -> Self {
        Self {
            first_index: None,
            last_index: None,
            direction: None,
            has_another_pack: false,
            items: Vec::new(),
            is_replace: false,
            success: false,
            call_count: 0,
        }
    }

    /// Clears everything per-loop; the session-wide call counter survives.
    pub fn reset(&mut self) {
        let call_count = self.call_count;
        *self = Self::new();
        self.call_count = call_count;
    }

    pub fn range(&self) -> Option<(i64, i64)> {
        match (self.first_index, self.last_index) {
            (Some(first), Some(last)) if first <= last => Some((first, last)),
            _ => None,
        }
    }

    pub fn should_fetch(&self) -> bool {
        self.range().is_some()
    }

    pub fn count(&self) -> usize {
        self.range()
            .map_or(0, |(first, last)| (last - first + 1) as usize)
    }

    pub fn replace(&mut self, indexes: Vec<i64>) {
        self.items = indexes;
        self.is_replace = true;
    }
}

/// Pending-clip flags for the current loop.
#[derive(Debug)]
pub(crate) struct ClipModel {
    pub do_clip: bool,
    /// Set by explicit removal: the clip also shrinks the dataset (renumbering removal
    /// instead of edge eviction).
    pub simulate: bool,
    pub force: bool,
    /// User-clip direction masks.
    pub force_forward: bool,
    pub force_backward: bool,
    /// Suppresses clipping for this loop (set by the check flow so a resize is
    /// reconciled before any eviction).
    pub no_clip: bool,
    /// Items were clipped during this loop.
    pub did_clip: bool,
    pub call_count: usize,
}

impl ClipModel {
    fn new() -> Self {
        Self {
            do_clip: false,
            simulate: false,
            force: false,
            force_forward: false,
            force_backward: false,
            no_clip: false,
            did_clip: false,
            call_count: 0,
        }
    }

    pub fn reset(&mut self) {
        let call_count = self.call_count;
        *self = Self::new();
        self.call_count = call_count;
    }

    pub fn forced(&self) -> bool {
        self.force_forward || self.force_backward
    }
}

/// How the current loop was triggered.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WorkflowOptions {
    /// The buffer was empty when the loop started.
    pub empty: bool,
    /// The loop was started on behalf of a scroll event.
    pub scroll: bool,
    /// A scroll event arrived mid-cycle; the cycle resolves into another loop instead of
    /// terminating.
    pub keep_scroll: bool,
    /// The scroll signal was fired by the debounce timer rather than directly.
    pub by_timer: bool,
    /// Skip fetch planning entirely (user-clip flow).
    pub no_fetch: bool,
}

impl WorkflowOptions {
    pub fn set(&mut self, origin: Process, buffer_empty: bool, by_timer: bool) {
        *self = Self {
            empty: buffer_empty,
            scroll: origin == Process::Scroll,
            keep_scroll: false,
            by_timer,
            no_fetch: origin == Process::UserClip,
        };
    }
}

/// Scroll-event record, advanced by the host's `on_scroll`/`tick` calls.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ScrollState {
    /// The loop-opening scroll signal came from the debounce timer, not directly from
    /// the event.
    pub fired_by_timer: bool,
}

impl ScrollState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The authoritative per-cycle scratchpad, one per session.
pub(crate) struct State<T> {
    pub fetch: FetchModel,
    pub clip: ClipModel,
    pub workflow_options: WorkflowOptions,
    pub scroll_state: ScrollState,

    /// The index to initially center on, clamped to the configured bounds.
    pub start_index: i64,

    pub inner_loop_count: usize,
    pub is_initial_loop: bool,
    pub cycle_count: usize,
    pub is_initial_cycle: bool,

    /// Backward padding captured before Render mutated anything, for the Adjust delta.
    pub bwd_padding_before_render: f64,
    pub position_before_render: f64,

    init_time: Instant,

    is_loading: Signal<bool>,
    loop_pending: Signal<bool>,
    workflow_pending: Signal<bool>,
    pub first_visible: Signal<ItemAdapter<T>>,
    pub last_visible: Signal<ItemAdapter<T>>,
}

impl<T: Clone> State<T> {
    pub fn new(settings: &Settings) -> Self {
        let mut state = Self {
            fetch: FetchModel::new(),
            clip: ClipModel::new(),
            workflow_options: WorkflowOptions::default(),
            scroll_state: ScrollState::default(),
            start_index: settings.start_index,
            inner_loop_count: 0,
            is_initial_loop: false,
            cycle_count: 1,
            is_initial_cycle: false,
            bwd_padding_before_render: 0.0,
            position_before_render: 0.0,
            init_time: Instant::now(),
            is_loading: Signal::new(false),
            loop_pending: Signal::new(false),
            workflow_pending: Signal::new(false),
            first_visible: Signal::new(ItemAdapter::empty()),
            last_visible: Signal::new(ItemAdapter::empty()),
        };
        state.set_current_start_index(settings.start_index, settings);
        state
    }

    /// Clamps the requested start index into the configured `[min_index, max_index]`.
    pub fn set_current_start_index(&mut self, new_start_index: i64, settings: &Settings) {
        let mut index = new_start_index;
        if let Some(min) = settings.min_index {
            if index < min {
                sdebug!(index, min, "start index raised to min_index");
                index = min;
            }
        }
        if let Some(max) = settings.max_index {
            if index > max {
                sdebug!(index, max, "start index lowered to max_index");
                index = max;
            }
        }
        self.start_index = index;
    }

    pub fn time_ms(&self) -> u64 {
        self.init_time.elapsed().as_millis() as u64
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.get()
    }

    pub fn set_is_loading(&mut self, value: bool) {
        self.is_loading.set(value);
    }

    pub fn set_loop_pending(&mut self, value: bool) {
        self.loop_pending.set(value);
    }

    pub fn workflow_pending(&self) -> bool {
        self.workflow_pending.get()
    }

    pub fn set_workflow_pending(&mut self, value: bool) {
        self.workflow_pending.set(value);
    }

    pub fn is_loading_signal(&self) -> Signal<bool> {
        self.is_loading.clone()
    }

    pub fn loop_pending_signal(&self) -> Signal<bool> {
        self.loop_pending.clone()
    }

    pub fn workflow_pending_signal(&self) -> Signal<bool> {
        self.workflow_pending.clone()
    }
}

impl<T> core::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("State")
            .field("start_index", &self.start_index)
            .field("cycle_count", &self.cycle_count)
            .field("inner_loop_count", &self.inner_loop_count)
            .field("fetch", &self.fetch)
            .field("clip", &self.clip)
            .field("workflow_options", &self.workflow_options)
            .finish_non_exhaustive()
    }
}
