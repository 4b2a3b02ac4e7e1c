use crate::item::Item;
use crate::scroller::Scroller;
use crate::types::{Direction, Payload, Process, ProcessSubject};

/// Inserts caller-supplied items at one end of the dataset (`prepend` selects which).
///
/// Two regimes:
/// - the buffer sits at the corresponding edge (or is empty): the items materialize,
///   are staged for Render, and the absolute bound moves with them;
/// - the buffer is somewhere in the middle of the dataset: the items only exist
///   virtually — the bound and the matching padding grow by the estimated size, nothing
///   is rendered until the user scrolls there.
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    items: Vec<T>,
    edge: bool,
    prepend: bool,
) -> Option<ProcessSubject<T>> {
    let process = if prepend {
        Process::Prepend
    } else {
        Process::Append
    };
    if items.is_empty() {
        return Some(ProcessSubject::error(
            process,
            format!("empty list of items to {process}"),
        ));
    }

    let at_edge = if prepend {
        scroller.buffer.bof()
    } else {
        scroller.buffer.eof()
    };
    if !scroller.buffer.is_empty() && !at_edge {
        virtual_insert(scroller, items.len() as i64, prepend);
        return Some(ProcessSubject::next(process, Payload::None));
    }

    let buffer = &mut scroller.buffer;
    scroller.state.fetch.reset();
    let count = items.len() as i64;
    let mut new_items = Vec::with_capacity(items.len());
    let (first, last) = if prepend {
        let anchor = buffer.get_index_to_prepend(edge);
        let first = anchor - (count - 1);
        for (offset, data) in items.into_iter().enumerate() {
            new_items.push(Item::new(first + offset as i64, data));
        }
        (first, anchor)
    } else {
        let first = buffer.get_index_to_append(edge);
        for (offset, data) in items.into_iter().enumerate() {
            new_items.push(Item::new(first + offset as i64, data));
        }
        (first, first + count - 1)
    };

    if buffer.is_empty() {
        buffer.set_items(new_items);
    } else if prepend {
        buffer.prepend(new_items);
    } else {
        buffer.append(new_items);
    }

    // the bound follows the inserted block; an explicit BOF/EOF assertion pins it even
    // when it was unknown before
    if prepend {
        buffer.abs_min_index = match buffer.abs_min_index {
            Some(min) => Some(min.min(first)),
            None if edge => Some(first),
            None => None,
        };
    } else {
        buffer.abs_max_index = match buffer.abs_max_index {
            Some(max) => Some(max.max(last)),
            None if edge => Some(last),
            None => None,
        };
    }

    scroller.state.fetch.items = (first..=last).collect();
    scroller.state.fetch.direction = Some(if prepend {
        Direction::Backward
    } else {
        Direction::Forward
    });
    sdebug!(first, last, prepend, "items inserted");
    Some(ProcessSubject::next(process, Payload::None))
}

fn virtual_insert<T: Clone>(scroller: &mut Scroller<T>, count: i64, prepend: bool) {
    let estimated = scroller.buffer.average_size().unwrap_or(0.0) * count as f64;
    if prepend {
        scroller.buffer.abs_min_index = scroller.buffer.abs_min_index.map(|min| min - count);
        let position = scroller.viewport.scroll_position();
        scroller.viewport.add_padding(Direction::Backward, estimated);
        scroller.viewport.set_scroll_position(position + estimated);
    } else {
        scroller.buffer.abs_max_index = scroller.buffer.abs_max_index.map(|max| max + count);
        scroller.viewport.add_padding(Direction::Forward, estimated);
    }
    sdebug!(count, prepend, estimated, "virtual insert");
}
