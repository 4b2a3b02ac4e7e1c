use crate::buffer::Buffer;
use crate::datasource::Datasource;
use crate::settings::Settings;
use crate::state::State;
use crate::viewport::ViewportAdapter;

/// The shared context every process step works on: settings, state, buffer, viewport and
/// the datasource, exclusively owned by one workflow at a time.
pub(crate) struct Scroller<T> {
    pub settings: Settings,
    pub state: State<T>,
    pub buffer: Buffer<T>,
    pub viewport: ViewportAdapter,
    pub datasource: Box<dyn Datasource<T>>,
}

impl<T: Clone> Scroller<T> {
    pub fn new(
        settings: Settings,
        datasource: Box<dyn Datasource<T>>,
        viewport: ViewportAdapter,
    ) -> Self {
        let state = State::new(&settings);
        let buffer = Buffer::new(&settings, state.start_index);
        let mut scroller = Self {
            settings,
            state,
            buffer,
            viewport,
            datasource,
        };
        scroller.viewport.reset();
        scroller
    }

    /// `"{instance}-{cycle}-{loop}"`, the identifier log lines and error records carry.
    pub fn loop_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.settings.instance_index, self.state.cycle_count, self.state.inner_loop_count
        )
    }
}
