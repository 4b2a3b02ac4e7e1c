use crate::scroller::Scroller;
use crate::types::{Payload, Process, ProcessStatus, ProcessSubject};

/// Opens a workflow cycle: raises the pending/loading flags and hands over to Start with
/// the originating process as payload.
///
/// `origin` is `None` for the very first cycle (constructor-driven).
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    origin: Option<Process>,
) -> Option<ProcessSubject<T>> {
    let is_initial = matches!(origin, None | Some(Process::Reload));
    let state = &mut scroller.state;
    state.is_initial_cycle = is_initial;
    state.is_initial_loop = is_initial;
    state.set_workflow_pending(true);
    state.set_is_loading(true);
    Some(ProcessSubject::new(
        Process::Start,
        ProcessStatus::Start,
        Payload::Origin(origin.unwrap_or(Process::Init)),
    ))
}
