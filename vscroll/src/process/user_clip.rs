use crate::scroller::Scroller;
use crate::types::{ClipOptions, Payload, Process, ProcessSubject};

/// Arms an on-demand clip of out-of-viewport items. With no direction restriction both
/// edges are clipped; `forward_only`/`backward_only` mask one side off.
pub(crate) fn run<T: Clone>(
    scroller: &mut Scroller<T>,
    options: ClipOptions,
) -> Option<ProcessSubject<T>> {
    let clip = &mut scroller.state.clip;
    clip.force_forward = !options.backward_only;
    clip.force_backward = !options.forward_only;
    sdebug!(
        force_forward = clip.force_forward,
        force_backward = clip.force_backward,
        "user clip"
    );
    Some(ProcessSubject::next(Process::UserClip, Payload::None))
}
