use crate::scroller::Scroller;
use crate::types::{Direction, Payload, Process, ProcessSubject};

/// Evicts every item flagged `to_remove`, converting its space into padding on the side
/// of its `remove_direction`.
///
/// A simulated clip (explicit removal) shrinks the dataset itself: the buffer renumbers
/// its tail and the cache follows. An ordinary viewport clip only drops items off the
/// contiguous edge, leaving indexes and size records alone so the padding can later be
/// traded back for re-fetched items. Simulated clips terminate the loop directly.
pub(crate) fn run<T: Clone>(scroller: &mut Scroller<T>) -> Option<ProcessSubject<T>> {
    let simulate = scroller.state.clip.simulate;
    if scroller.state.clip.do_clip {
        do_clip(scroller);
    } else {
        sdebug!("no clip");
    }
    Some(ProcessSubject::next(
        Process::Clip,
        if simulate {
            Payload::Origin(Process::End)
        } else {
            Payload::None
        },
    ))
}

fn do_clip<T: Clone>(scroller: &mut Scroller<T>) {
    let Scroller {
        buffer,
        viewport,
        state,
        ..
    } = scroller;
    let clip = &mut state.clip;
    clip.call_count += 1;
    let average = buffer.average_size().unwrap_or(0.0);
    let mut clipped: Vec<i64> = Vec::new();

    // a simulated removal renumbers the tail, so flagged indexes shift between removals;
    // re-scan for the next flagged item instead of iterating a stale index list
    loop {
        let Some((index, size, direction)) = buffer
            .items()
            .iter()
            .find(|item| item.to_remove)
            .map(|item| {
                (
                    item.index,
                    item.size_or(average),
                    item.remove_direction.unwrap_or(Direction::Forward),
                )
            })
        else {
            break;
        };
        if let Some(item) = buffer.get_mut(index) {
            item.hide();
        }
        viewport.add_padding(direction, size);
        if clip.simulate && !clip.force {
            buffer.remove_item(index);
        } else {
            buffer.drop_item(index);
        }
        clipped.push(index);
    }

    clip.did_clip = !clipped.is_empty();
    sdebug!(
        count = clipped.len(),
        call = clip.call_count,
        backward = viewport.paddings.backward,
        forward = viewport.paddings.forward,
        "clipped items"
    );
}
