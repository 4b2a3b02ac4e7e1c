use crate::scroller::Scroller;
use crate::types::{Direction, Payload, Process, ProcessSubject};

/// Settles the loop's geometry: recomputes both paddings exactly from the known bounds
/// and recorded sizes, and corrects the scroll position so the items in view do not move
/// when content was inserted before them.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>) -> Option<ProcessSubject<T>> {
    let Scroller {
        buffer,
        viewport,
        state,
        ..
    } = scroller;
    let average = buffer.average_size().unwrap_or(0.0);

    // with a known bound the padding is the exact stand-in for the virtual items on
    // that side; with an unbounded side the clip-accumulated value stays
    if let (Some(first), Some(min)) = (buffer.first_index(), buffer.abs_min_index) {
        let mut backward = 0.0;
        for index in min..first {
            backward += buffer.cache.get(index).unwrap_or(average);
        }
        viewport.set_padding(Direction::Backward, backward);
    }
    if let (Some(last), Some(max)) = (buffer.last_index(), buffer.abs_max_index) {
        let mut forward = 0.0;
        for index in (last + 1)..=max {
            forward += buffer.cache.get(index).unwrap_or(average);
        }
        viewport.set_padding(Direction::Forward, forward);
    }

    let backward_now = viewport.paddings.backward;
    if state.is_initial_loop {
        // the backward padding is exactly the content standing before the start index,
        // so this places the start index at the top of the viewport
        viewport.set_scroll_position(backward_now);
    } else if state.fetch.direction == Some(Direction::Backward) && !state.fetch.items.is_empty()
    {
        let inserted: f64 = state
            .fetch
            .items
            .iter()
            .filter_map(|index| buffer.cache.get(*index))
            .sum();
        let delta = (backward_now + inserted) - state.bwd_padding_before_render;
        if delta.abs() > f64::EPSILON {
            viewport.set_scroll_position(state.position_before_render + delta);
            sdebug!(delta, "scroll position adjusted");
        }
    }

    Some(ProcessSubject::done(Process::Adjust, Payload::None))
}
