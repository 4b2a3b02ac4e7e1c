use crate::scroller::Scroller;
use crate::types::{Direction, ItemsPredicate, Payload, Process, ProcessSubject};

/// Flags every resident item matching the predicate for a simulated clip: the following
/// Clip step removes them from the dataset (renumbering the tail) and converts their
/// space into forward padding.
///
/// Only a contiguous series can be removed per call; removing disjoint items means one
/// call per series, as the renumbering shifts later indexes down in between.
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    predicate: ItemsPredicate<T>,
) -> Option<ProcessSubject<T>> {
    let mut need_to_update = scroller.state.clip.do_clip;
    for item in scroller.buffer.items_mut() {
        if predicate(item) {
            item.to_remove = true;
            item.remove_direction = Some(Direction::Forward);
            need_to_update = true;
        }
    }

    if !need_to_update {
        sdebug!("remove: no items matched");
        return Some(ProcessSubject::done(Process::Remove, Payload::None));
    }

    let clip = &mut scroller.state.clip;
    clip.do_clip = true;
    clip.simulate = true;
    Some(ProcessSubject::next(Process::Remove, Payload::None))
}
