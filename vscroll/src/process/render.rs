use crate::scroller::Scroller;
use crate::types::{Payload, Process, ProcessSubject};

/// Folds the rendering surface's measurements back in for every staged item: records the
/// size, reveals the item, and refreshes the running average. Captures the pre-render
/// padding/position so Adjust can keep the view anchored afterwards.
///
/// Measurement falls back to the cached/average size when the surface has no number yet;
/// an item with no size information at all is an error, since the planner could never
/// place it.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>) -> Option<ProcessSubject<T>> {
    let Scroller {
        buffer,
        viewport,
        state,
        ..
    } = scroller;
    state.bwd_padding_before_render = viewport.paddings.backward;
    state.position_before_render = viewport.scroll_position();

    let indexes = state.fetch.items.clone();
    for index in &indexes {
        let measured = viewport
            .item_size(*index)
            .or_else(|| buffer.size_by_index(*index));
        let Some(size) = measured else {
            return Some(ProcessSubject::error(
                Process::Render,
                format!("no size for item {index}"),
            ));
        };
        if !buffer.set_size(*index, size) {
            return Some(ProcessSubject::error(
                Process::Render,
                format!("item {index} to render is not in the buffer"),
            ));
        }
        // replaced items (check flow) are visible already
        if !state.fetch.is_replace {
            buffer.reveal(*index);
        }
    }
    if buffer.check_average_size() {
        strace!(average = ?buffer.average_size(), "average item size changed");
    }
    if !indexes.is_empty() {
        buffer.notify();
    }
    sdebug!(rendered = indexes.len(), replace = state.fetch.is_replace, "render");
    Some(ProcessSubject::next(
        Process::Render,
        Payload::Flag(state.clip.no_clip),
    ))
}
