use crate::scroller::Scroller;
use crate::types::{Payload, Process, ProcessSubject};

/// Tears the window down for a fresh start: re-clamps the start index, resets buffer,
/// cache, paddings and scroll position. The workflow has already bumped its epoch by the
/// time this runs, so any in-flight fetch continuation of the old session is void.
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    start_index: Option<i64>,
) -> Option<ProcessSubject<T>> {
    let index = start_index.unwrap_or(scroller.settings.start_index);
    scroller
        .state
        .set_current_start_index(index, &scroller.settings);
    let start = scroller.state.start_index;
    scroller.buffer.reset(true, Some(start));
    scroller.viewport.reset();
    scroller.state.fetch.reset();
    scroller.state.clip.reset();
    scroller.state.scroll_state.reset();
    sdebug!(start_index = start, "reload");
    Some(ProcessSubject::next(Process::Reload, Payload::Flag(false)))
}
