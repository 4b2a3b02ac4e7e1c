use crate::scroller::Scroller;
use crate::types::{ItemAdapter, Payload, Process, ProcessSubject};

/// Closes one loop: clears the loop-pending flag, publishes the first/last visible
/// items, resets the per-loop models and decides whether the cycle resolves into
/// another loop or terminates.
///
/// The cycle continues while the loop made progress (fetched, clipped, replaced, or
/// left a second missing run behind) or a deferred scroll is waiting; the first loop
/// that changes nothing ends the cycle. Error loops always terminate.
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    origin: Option<Process>,
    errored: bool,
) -> Option<ProcessSubject<T>> {
    let Scroller { buffer, state, .. } = scroller;
    state.set_loop_pending(false);
    state.is_initial_loop = false;

    let first = buffer
        .first_visible_item()
        .map(|item| ItemAdapter {
            index: Some(item.index),
            data: Some(item.data.clone()),
        })
        .unwrap_or_else(ItemAdapter::empty);
    let last = buffer
        .last_visible_item()
        .map(|item| ItemAdapter {
            index: Some(item.index),
            data: Some(item.data.clone()),
        })
        .unwrap_or_else(ItemAdapter::empty);
    state.first_visible.set(first);
    state.last_visible.set(last);

    // a forced (user) clip must not count as progress: looping again would immediately
    // re-fetch what was just evicted
    let progressed = state.fetch.success
        || !state.fetch.items.is_empty()
        || (state.clip.did_clip && !state.clip.forced())
        || state.fetch.has_another_pack;
    let keep_scroll = state.workflow_options.keep_scroll;
    state.fetch.reset();
    state.clip.reset();

    if errored {
        return Some(ProcessSubject::done(Process::End, Payload::None));
    }
    if progressed || keep_scroll {
        strace!(progressed, keep_scroll, "loop done, cycle continues");
        Some(ProcessSubject::next(
            Process::End,
            Payload::Origin(origin.unwrap_or(Process::End)),
        ))
    } else {
        strace!("loop done, cycle ends");
        Some(ProcessSubject::done(Process::End, Payload::None))
    }
}
