use crate::scroller::Scroller;
use crate::types::{Payload, Process, ProcessSubject};

/// Reacts to a settled scroll event: clears the debounce record and re-enters the state
/// machine. The dispatcher decides (via `keep_scroll`) whether this continues the
/// current cycle with another loop or opens a fresh cycle.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>) -> Option<ProcessSubject<T>> {
    let position = scroller.viewport.scroll_position();
    strace!(position, "scroll");
    scroller.state.scroll_state.reset();
    Some(ProcessSubject::next(Process::Scroll, Payload::None))
}
