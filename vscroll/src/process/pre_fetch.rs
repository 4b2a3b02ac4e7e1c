use crate::scroller::Scroller;
use crate::types::{Direction, Payload, Process, ProcessSubject};

/// Plans the next fetch: given the scroll position and the resident window, computes the
/// contiguous index range that must be requested, or decides that nothing is missing.
///
/// The steps run in a fixed order:
/// 1. start delta — pixels of virtual content standing before the start index;
/// 2. index-window scan — walk outward from the start index until the accumulated
///    positions cross the padded viewport window;
/// 3. skip already-buffered indexes, preferring the larger missing run when the window
///    straddles the resident block;
/// 4. (infinite mode) snap the window adjacent to the buffer so no gap opens up;
/// 5. extend undersized windows up to `buffer_size`, then re-run step 3;
/// 6. fix the fetch direction.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>, origin: Process) -> Option<ProcessSubject<T>> {
    if scroller.state.workflow_options.no_fetch {
        sdebug!("skipping fetch [no fetch option]");
        return Some(ProcessSubject::done(
            Process::PreFetch,
            Payload::Origin(origin),
        ));
    }

    set_start_delta(scroller);
    set_fetch_indexes(scroller);
    skip_buffered_items(scroller);
    if scroller.settings.infinite {
        check_buffer_gaps(scroller);
    }
    check_fetch_pack_size(scroller);
    set_fetch_direction(scroller);

    let fetch = &scroller.state.fetch;
    if fetch.should_fetch() {
        sdebug!(
            count = fetch.count(),
            first = fetch.first_index,
            "going to fetch"
        );
        Some(ProcessSubject::next(
            Process::PreFetch,
            Payload::Origin(origin),
        ))
    } else {
        Some(ProcessSubject::done(
            Process::PreFetch,
            Payload::Origin(origin),
        ))
    }
}

/// Sums the sizes of everything between the absolute minimum index and the start index,
/// so the planner knows how many pixels of virtual content precede the first rendered
/// item. Document-level scrolling adds the list's offset in the container on top.
fn set_start_delta<T: Clone>(scroller: &mut Scroller<T>) {
    let Scroller {
        buffer,
        viewport,
        state,
        settings,
        ..
    } = scroller;
    viewport.start_delta = 0.0;
    if !buffer.has_item_size() {
        return;
    }
    let average = buffer.average_size().unwrap_or(0.0);
    let min_index = buffer.abs_min_index.unwrap_or_else(|| buffer.min_index());
    for index in min_index..state.start_index {
        viewport.start_delta += buffer.cache.get(index).unwrap_or(average);
    }
    if settings.window_viewport {
        let offset = viewport.offset();
        viewport.start_delta += offset;
    }
    strace!(start_delta = viewport.start_delta, "start delta");
}

fn set_fetch_indexes<T: Clone>(scroller: &mut Scroller<T>) {
    let padding_delta = scroller.viewport.buffer_padding();
    let relative_position = scroller.viewport.scroll_position() - scroller.viewport.start_delta;
    let start_position = relative_position - padding_delta;
    let end_position = relative_position + scroller.viewport.size() + padding_delta;
    let first_position = set_first_index(scroller, start_position);
    set_last_index(scroller, first_position, end_position);
}

/// Finds the first index that should be inside the padded window, walking from the start
/// index either forward (positive positions) or backward (negative). Returns the pixel
/// position where that item starts, relative to the start index.
fn set_first_index<T: Clone>(scroller: &mut Scroller<T>, start_position: f64) -> f64 {
    let Scroller { buffer, state, .. } = scroller;
    let mut first_index = state.start_index;
    let mut first_position = 0.0;
    if state.is_initial_loop {
        sdebug!("skipping fetch backward direction [initial loop]");
    } else if !buffer.has_item_size() {
        sdebug!("skipping fetch backward direction [no item size]");
    } else {
        let average = buffer.average_size().unwrap_or(0.0);
        let mut position = 0.0;
        let mut index = first_index;
        if start_position >= 0.0 {
            loop {
                let size = buffer.size_by_index(index).unwrap_or(average);
                if position + size - start_position > 0.0 {
                    first_index = index;
                    first_position = position;
                    break;
                }
                if size <= 0.0 {
                    break;
                }
                position += size;
                index += 1;
                if buffer.abs_max_index.is_some_and(|max| index > max) {
                    // the window starts past the known end; settle on the last item
                    let last_size = buffer.size_by_index(index - 1).unwrap_or(average);
                    first_index = index - 1;
                    first_position = position - last_size;
                    break;
                }
            }
        } else {
            loop {
                index -= 1;
                if buffer.abs_min_index.is_some_and(|min| index < min) {
                    break;
                }
                let size = buffer.size_by_index(index).unwrap_or(average);
                if size <= 0.0 {
                    break;
                }
                position -= size;
                first_index = index;
                first_position = position;
                if position - start_position <= 0.0 {
                    break;
                }
            }
        }
    }
    if let Some(min) = buffer.abs_min_index {
        first_index = first_index.max(min);
    }
    state.fetch.first_index = Some(first_index);
    first_position
}

/// From the first index's position, accumulates sizes until the padded window end is
/// crossed. Without any size information the window is a fixed `buffer_size` items
/// forward from the start index.
fn set_last_index<T: Clone>(scroller: &mut Scroller<T>, start_position: f64, end_position: f64) {
    let Scroller {
        buffer,
        state,
        settings,
        ..
    } = scroller;
    let mut last_index;
    if !buffer.has_item_size() {
        last_index = state.start_index + settings.buffer_size as i64 - 1;
        sdebug!("forcing fetch forward direction [no item size]");
    } else {
        let average = buffer.average_size().unwrap_or(0.0);
        let mut index = state.fetch.first_index.unwrap_or(state.start_index);
        let mut position = start_position;
        loop {
            last_index = index;
            let size = buffer.size_by_index(index).unwrap_or(average);
            position += size;
            if position >= end_position {
                break;
            }
            if size <= 0.0 {
                break;
            }
            if buffer.abs_max_index.is_some_and(|max| index > max) {
                break;
            }
            index += 1;
        }
    }
    if let Some(max) = buffer.abs_max_index {
        last_index = last_index.min(max);
    }
    state.fetch.last_index = Some(last_index);
}

/// Partitions the planned window into maximal runs of indexes that are not already
/// resident; the fetch request is always a single contiguous range, so when the window
/// straddles the buffer the larger missing run wins (ties go to the earlier one) and the
/// other is left for a follow-up loop.
fn skip_buffered_items<T: Clone>(scroller: &mut Scroller<T>) {
    let Scroller { buffer, state, .. } = scroller;
    if buffer.is_empty() {
        return;
    }
    let Some((first, last)) = state.fetch.range() else {
        return;
    };
    let mut packs: Vec<Vec<i64>> = Vec::new();
    let mut current: Vec<i64> = Vec::new();
    for index in first..=last {
        if buffer.get(index).is_none() {
            current.push(index);
        } else if !current.is_empty() {
            packs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        packs.push(current);
    }
    if packs.is_empty() {
        // everything in the window is already resident
        state.fetch.first_index = None;
        state.fetch.last_index = None;
        return;
    }
    let mut pack = &packs[0];
    if packs.len() > 1 {
        state.fetch.has_another_pack = true;
        if packs[1].len() > packs[0].len() {
            pack = &packs[1];
        }
    }
    let (Some(&pack_first), Some(&pack_last)) = (pack.first(), pack.last()) else {
        state.fetch.first_index = None;
        state.fetch.last_index = None;
        return;
    };
    let pack_first = buffer
        .abs_min_index
        .map_or(pack_first, |min| pack_first.max(min));
    let pack_last = buffer
        .abs_max_index
        .map_or(pack_last, |max| pack_last.min(max));
    if state.fetch.first_index != Some(pack_first) || state.fetch.last_index != Some(pack_last) {
        strace!(pack_first, pack_last, "fetch interval after buffer flushing");
    }
    state.fetch.first_index = Some(pack_first);
    state.fetch.last_index = Some(pack_last);
}

/// Infinite mode never clips, so a window that jumped away from the resident range would
/// leave a permanent hole; snap the near boundary adjacent to the buffer instead.
fn check_buffer_gaps<T: Clone>(scroller: &mut Scroller<T>) {
    let Scroller { buffer, state, .. } = scroller;
    if buffer.is_empty() {
        return;
    }
    let Some((fetch_first, fetch_last)) = state.fetch.range() else {
        return;
    };
    if let Some(buffer_last) = buffer.last_index() {
        if fetch_first > buffer_last {
            state.fetch.first_index = Some(buffer_last + 1);
        }
    }
    if let Some(buffer_first) = buffer.first_index() {
        if fetch_last < buffer_first {
            state.fetch.last_index = Some(buffer_first - 1);
        }
    }
    if state.fetch.first_index != Some(fetch_first) || state.fetch.last_index != Some(fetch_last) {
        strace!("fetch interval after buffer filling (no clip case)");
    }
}

/// A window smaller than `buffer_size` is extended — forward when it lies at or past the
/// buffer's start, backward otherwise — clamped to the absolute bounds. The extension
/// may now overlap resident items, so the skip step runs again.
fn check_fetch_pack_size<T: Clone>(scroller: &mut Scroller<T>) {
    let (first, last) = {
        let Scroller {
            buffer,
            state,
            settings,
            ..
        } = scroller;
        let Some((first, last)) = state.fetch.range() else {
            return;
        };
        let diff = settings.buffer_size as i64 - (last - first + 1);
        if diff <= 0 {
            return;
        }
        let forward = buffer.is_empty() || buffer.first_index().is_some_and(|f| last >= f);
        if forward {
            let new_last = buffer
                .abs_max_index
                .map_or(last + diff, |max| (last + diff).min(max));
            if new_last > last {
                state.fetch.last_index = Some(new_last);
            }
        } else {
            let new_first = buffer
                .abs_min_index
                .map_or(first - diff, |min| (first - diff).max(min));
            if new_first < first {
                state.fetch.first_index = Some(new_first);
            }
        }
        (first, last)
    };
    if scroller.state.fetch.first_index != Some(first)
        || scroller.state.fetch.last_index != Some(last)
    {
        strace!("fetch interval after buffer_size adjustment");
        skip_buffered_items(scroller);
    }
}

/// Forward unless the planned window lies strictly before the first resident item.
fn set_fetch_direction<T: Clone>(scroller: &mut Scroller<T>) {
    let Scroller { buffer, state, .. } = scroller;
    if let Some(last) = state.fetch.last_index {
        let mut direction = Direction::Forward;
        if buffer.first_index().is_some_and(|first| last < first) {
            direction = Direction::Backward;
        }
        state.fetch.direction = Some(direction);
        sdebug!(direction = ?direction, "fetch direction");
    }
}
