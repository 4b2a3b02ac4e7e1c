use crate::item::Item;
use crate::scroller::Scroller;
use crate::types::{Direction, Payload, Process, ProcessSubject};

/// Folds a fetch result into the buffer.
///
/// A short read is the implicit end-of-data signal and narrows the absolute bound on the
/// fetch direction's side: forward results align with the start of the requested window,
/// backward results with its end. The inserted block must attach exactly at the buffer's
/// edge; after a far scroll jump the stale residents are virtualized into padding first,
/// so contiguity holds and the scroll position stays consistent.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>, data: Vec<T>) -> Option<ProcessSubject<T>> {
    let Scroller { buffer, state, .. } = scroller;
    let Some((first, last)) = state.fetch.range() else {
        return Some(ProcessSubject::done(Process::PostFetch, Payload::None));
    };
    let requested = state.fetch.count();
    let received = data.len();
    let direction = state.fetch.direction.unwrap_or(Direction::Forward);
    state.fetch.success = true;

    if received == 0 {
        match direction {
            Direction::Forward => {
                let bound = first - 1;
                buffer.abs_max_index = Some(buffer.last_index().map_or(bound, |l| bound.max(l)));
            }
            Direction::Backward => {
                let bound = last + 1;
                buffer.abs_min_index = Some(buffer.first_index().map_or(bound, |f| bound.min(f)));
            }
        }
        sdebug!(first, last, "datasource is empty over the requested interval");
        return Some(ProcessSubject::done(Process::PostFetch, Payload::None));
    }

    let (block_first, block_last) = if received < requested {
        match direction {
            Direction::Forward => {
                let block_last = first + received as i64 - 1;
                buffer.abs_max_index = Some(block_last);
                sdebug!(eof = block_last, "eof discovered");
                (first, block_last)
            }
            Direction::Backward => {
                let block_first = last - received as i64 + 1;
                buffer.abs_min_index = Some(block_first);
                sdebug!(bof = block_first, "bof discovered");
                (block_first, last)
            }
        }
    } else {
        (first, last)
    };

    let mut new_items = Vec::with_capacity(received);
    for (offset, record) in data.into_iter().enumerate() {
        new_items.push(Item::new(block_first + offset as i64, record));
    }

    if !buffer.is_empty() {
        let attaches = buffer.first_index().is_some_and(|f| block_last + 1 == f)
            || buffer.last_index().is_some_and(|l| block_first - 1 == l);
        if !attaches {
            virtualize_residents(scroller, block_first);
        }
    }

    let Scroller { buffer, state, .. } = scroller;
    if !buffer.set_items(new_items) {
        return Some(ProcessSubject::error(
            Process::PostFetch,
            format!("fetched range [{block_first}..{block_last}] does not attach to the buffer"),
        ));
    }
    state.fetch.items = (block_first..=block_last).collect();
    Some(ProcessSubject::next(Process::PostFetch, Payload::None))
}

/// The planned window no longer touches the resident run (possible after a far jump in
/// non-infinite mode): turn every resident item into padding on whichever side of the
/// new block it lies, leaving the buffer empty for the insertion.
fn virtualize_residents<T: Clone>(scroller: &mut Scroller<T>, block_first: i64) {
    let Scroller {
        buffer, viewport, ..
    } = scroller;
    let average = buffer.average_size().unwrap_or(0.0);
    let residents: Vec<(i64, f64, Direction)> = buffer
        .items()
        .iter()
        .map(|item| {
            let side = if item.index < block_first {
                Direction::Backward
            } else {
                Direction::Forward
            };
            (item.index, item.size_or(average), side)
        })
        .collect();
    sdebug!(count = residents.len(), "virtualizing residents around a fetch gap");
    for (index, size, side) in residents {
        viewport.add_padding(side, size);
        buffer.drop_item(index);
    }
}
