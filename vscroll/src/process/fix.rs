use crate::scroller::Scroller;
use crate::types::{FixOptions, Payload, Process, ProcessSubject};

/// Applies user-requested corrections: absolute bounds, an item updater, and/or a new
/// scroll position. Bad arguments terminate the cycle through the error path instead of
/// touching any state.
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    options: FixOptions<T>,
) -> Option<ProcessSubject<T>> {
    if let Some(position) = options.scroll_position {
        if !position.is_finite() {
            return Some(ProcessSubject::error(
                Process::Fix,
                format!("scroll_position must be a finite number, got {position}"),
            ));
        }
    }
    if let (Some(min), Some(max)) = (options.min_index, options.max_index) {
        if min > max {
            return Some(ProcessSubject::error(
                Process::Fix,
                format!("min_index ({min}) must not exceed max_index ({max})"),
            ));
        }
    }

    if let Some(min) = options.min_index {
        scroller.buffer.abs_min_index = Some(min);
    }
    if let Some(max) = options.max_index {
        scroller.buffer.abs_max_index = Some(max);
    }
    if let Some(mut updater) = options.updater {
        for item in scroller.buffer.items_mut() {
            updater(item);
        }
        scroller.buffer.notify();
    }
    if let Some(position) = options.scroll_position {
        scroller.viewport.set_scroll_position(position);
    }
    Some(ProcessSubject::next(Process::Fix, Payload::None))
}
