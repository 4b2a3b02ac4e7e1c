use crate::datasource::FetchHandle;
use crate::scroller::Scroller;
use crate::types::{Process, ProcessSubject};

/// Issues the planned window to the datasource. This is the workflow's only suspension
/// point: the continuation is handed over as a [`FetchHandle`] and the state machine
/// goes idle until the handle resolves (or forever, if the datasource drops it).
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    handle: FetchHandle<T>,
) -> Option<ProcessSubject<T>> {
    let Some((first, _)) = scroller.state.fetch.range() else {
        return Some(ProcessSubject::error(
            Process::Fetch,
            "no fetch interval to request",
        ));
    };
    let count = scroller.state.fetch.count();
    scroller.state.fetch.call_count += 1;
    sdebug!(first, count, call = scroller.state.fetch.call_count, "datasource call");
    scroller.datasource.get(first, count, handle);
    None
}
