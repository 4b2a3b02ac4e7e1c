use crate::scroller::Scroller;
use crate::types::{Payload, Process, ProcessSubject};

/// Opens one loop inside the current cycle: bumps the loop counter, rebuilds the
/// workflow options for the originating process and clears the per-loop models.
///
/// Adapter-triggered flows stage fetch/clip state *before* the loop begins (check fills
/// the replace list, remove flags items, user clip arms the force masks, append stages
/// the inserted indexes), so those models survive here.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>, origin: Process) -> Option<ProcessSubject<T>> {
    let buffer_empty = scroller.buffer.is_empty();
    let state = &mut scroller.state;
    state.inner_loop_count += 1;
    state.set_loop_pending(true);
    let by_timer = state.scroll_state.fired_by_timer;
    state.workflow_options.set(origin, buffer_empty, by_timer);
    match origin {
        Process::Append | Process::Prepend => state.clip.reset(),
        Process::Check => {}
        Process::Remove | Process::UserClip => state.fetch.reset(),
        _ => {
            state.fetch.reset();
            state.clip.reset();
        }
    }
    strace!(origin = %origin, loop_count = state.inner_loop_count, "loop started");
    Some(ProcessSubject::next(Process::Start, Payload::Origin(origin)))
}
