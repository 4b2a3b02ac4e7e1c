use vscroll::{
    BufferInfo, ClipOptions, Datasource, FixOptions, Item, ItemAdapter, Settings, SettingsError,
    Signal, Viewport, ViewportInfo, Workflow, WorkflowError,
};

/// The public control surface of one scrolling session.
///
/// Every mutating call injects a signal into the workflow queue; nothing here touches
/// buffer or viewport state directly. Bad arguments are reported through the workflow's
/// error log (see [`Adapter::errors`]) and terminate the cycle cleanly — no call on this
/// type panics.
///
/// The adapter owns the [`Workflow`]; hosts that need the lower-level surface (scroll
/// events, ticks, item subscriptions) reach it through [`Adapter::workflow`].
pub struct Adapter<T> {
    workflow: Workflow<T>,
}

impl<T: Clone + 'static> Adapter<T> {
    /// Validates the settings and starts a session.
    pub fn new(
        settings: Settings,
        datasource: impl Datasource<T> + 'static,
        viewport: impl Viewport + 'static,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            workflow: Workflow::new(settings, datasource, viewport)?,
        })
    }

    pub fn from_workflow(workflow: Workflow<T>) -> Self {
        Self { workflow }
    }

    pub fn workflow(&self) -> &Workflow<T> {
        &self.workflow
    }

    /// Resets the session and refills the window around the configured start index.
    pub fn reload(&self) {
        self.workflow.reload(None);
    }

    /// Resets the session and refills the window around `start_index` (clamped to the
    /// configured bounds).
    pub fn reload_from(&self, start_index: i64) {
        self.workflow.reload(Some(start_index));
    }

    /// Adds items after the end of the dataset. Items materialize only when the window
    /// is at EOF; otherwise they extend the dataset virtually.
    pub fn append(&self, items: Vec<T>) {
        self.workflow.append(items, false);
    }

    /// Like [`Self::append`], additionally asserting that these are the dataset's very
    /// last items.
    pub fn append_eof(&self, items: Vec<T>) {
        self.workflow.append(items, true);
    }

    /// Adds items before the beginning of the dataset, preserving their order.
    pub fn prepend(&self, items: Vec<T>) {
        self.workflow.prepend(items, false);
    }

    pub fn prepend_bof(&self, items: Vec<T>) {
        self.workflow.prepend(items, true);
    }

    /// Re-measures resident items and reconciles size changes.
    pub fn check(&self) {
        self.workflow.check();
    }

    /// Removes every resident item the predicate matches. One contiguous series per
    /// call; later items are renumbered down to keep the window gapless.
    pub fn remove(&self, predicate: impl Fn(&Item<T>) -> bool + 'static) {
        self.workflow.remove(predicate);
    }

    /// Clips out-of-viewport items in both directions.
    pub fn clip(&self) {
        self.workflow.clip(ClipOptions::default());
    }

    pub fn clip_with(&self, options: ClipOptions) {
        self.workflow.clip(options);
    }

    /// Applies user corrections (bounds, item updater, scroll position).
    pub fn fix(&self, options: FixOptions<T>) {
        self.workflow.fix(options);
    }

    pub fn dispose(&self) {
        self.workflow.dispose();
    }

    pub fn is_loading(&self) -> bool {
        self.workflow.is_loading()
    }

    /// Loading-state signal; the subscriber is called with the current value
    /// immediately and on every change.
    pub fn is_loading_signal(&self) -> Signal<bool> {
        self.workflow.is_loading_signal()
    }

    pub fn first_visible(&self) -> ItemAdapter<T> {
        self.workflow.first_visible_signal().get()
    }

    pub fn last_visible(&self) -> ItemAdapter<T> {
        self.workflow.last_visible_signal().get()
    }

    pub fn first_visible_signal(&self) -> Signal<ItemAdapter<T>> {
        self.workflow.first_visible_signal()
    }

    pub fn last_visible_signal(&self) -> Signal<ItemAdapter<T>> {
        self.workflow.last_visible_signal()
    }

    pub fn buffer_info(&self) -> BufferInfo {
        self.workflow.buffer_info()
    }

    pub fn viewport_info(&self) -> ViewportInfo {
        self.workflow.viewport_info()
    }

    /// The append-only error log (validation and fetch failures, with loop ids).
    pub fn errors(&self) -> Vec<WorkflowError> {
        self.workflow.errors()
    }
}

impl<T> core::fmt::Debug for Adapter<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Adapter")
            .field("workflow", &self.workflow)
            .finish()
    }
}
