use crate::scroller::Scroller;
use crate::types::{Direction, Payload, Process, ProcessSubject};

/// Decides which resident items fall far enough out of view to be evicted, and flags
/// them for Clip. Skipped entirely in infinite mode (unless a user clip forced it) and
/// when the check flow disabled clipping for this loop.
///
/// Positions are reckoned in the same frame the fetch planner uses — origin at the start
/// index, scroll position shifted by the start delta — so a clip decision can never
/// contradict the window that was just planned. An ordinary clip keeps the padded margin
/// rendered; a forced (user) clip trims down to the bare viewport, honoring the
/// direction masks.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>) -> Option<ProcessSubject<T>> {
    let Scroller {
        buffer,
        viewport,
        state,
        settings,
        ..
    } = scroller;
    let clip = &mut state.clip;

    if clip.no_clip {
        clip.do_clip = false;
        sdebug!("skipping clip [no clip option]");
        return Some(ProcessSubject::next(Process::PreClip, Payload::Flag(false)));
    }
    let forced = clip.forced();
    if settings.infinite && !forced {
        clip.do_clip = false;
        sdebug!("skipping clip [infinite mode]");
        return Some(ProcessSubject::next(Process::PreClip, Payload::Flag(false)));
    }

    let relative_position = viewport.scroll_position() - viewport.start_delta;
    let margin = if forced { 0.0 } else { viewport.buffer_padding() };
    let window_start = relative_position - margin;
    let window_end = relative_position + viewport.size() + margin;
    let allow_backward = !forced || clip.force_backward;
    let allow_forward = !forced || clip.force_forward;
    let average = buffer.average_size().unwrap_or(0.0);

    // position of the first resident item, walking from the start index
    let mut item_start = 0.0;
    if let Some(first) = buffer.first_index() {
        let start_index = state.start_index;
        if first >= start_index {
            for index in start_index..first {
                item_start += buffer.size_by_index(index).unwrap_or(average);
            }
        } else {
            for index in first..start_index {
                item_start -= buffer.size_by_index(index).unwrap_or(average);
            }
        }
    }

    let mut marked = 0usize;
    for item in buffer.items_mut() {
        let item_end = item_start + item.size_or(average);
        if item_end < window_start && allow_backward {
            item.to_remove = true;
            item.remove_direction = Some(Direction::Backward);
            marked += 1;
        } else if item_start > window_end && allow_forward {
            item.to_remove = true;
            item.remove_direction = Some(Direction::Forward);
            marked += 1;
        }
        item_start = item_end;
    }
    clip.do_clip = marked > 0;
    sdebug!(marked, "pre clip");
    Some(ProcessSubject::next(
        Process::PreClip,
        Payload::Flag(clip.do_clip),
    ))
}
