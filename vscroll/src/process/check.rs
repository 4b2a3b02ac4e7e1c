use crate::scroller::Scroller;
use crate::types::{Payload, Process, ProcessSubject};

/// Re-measures every resident item and, if any size changed, stages the bounding range
/// of changed items for a render-replace pass with clipping suppressed for this loop, so
/// the resize is reconciled before anything is evicted.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>) -> Option<ProcessSubject<T>> {
    let Scroller {
        buffer,
        viewport,
        state,
        ..
    } = scroller;

    let mut changed: Vec<(i64, f64)> = Vec::new();
    for item in buffer.items() {
        if let Some(size) = viewport.item_size(item.index) {
            if item.size != Some(size) {
                changed.push((item.index, size));
            }
        }
    }
    let mut min: Option<i64> = None;
    let mut max: Option<i64> = None;
    for (index, size) in changed {
        buffer.set_size(index, size);
        min = Some(min.map_or(index, |m| m.min(index)));
        max = Some(max.map_or(index, |m| m.max(index)));
    }

    let (Some(min), Some(max)) = (min, max) else {
        sdebug!("check: no item changed its size");
        return Some(ProcessSubject::done(Process::Check, Payload::None));
    };

    state.clip.no_clip = true;
    let indexes = buffer
        .items()
        .iter()
        .map(|item| item.index)
        .filter(|index| *index >= min && *index <= max)
        .collect();
    state.fetch.replace(indexes);
    sdebug!(min, max, "check: sizes changed");
    Some(ProcessSubject::next(Process::Check, Payload::None))
}
