use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::datasource::{Datasource, FetchHandle};
use crate::item::Item;
use crate::process;
use crate::scroller::Scroller;
use crate::settings::{Settings, SettingsError};
use crate::signal::Signal;
use crate::types::{
    BufferInfo, ClipOptions, FixOptions, ItemAdapter, Payload, Process, ProcessStatus,
    ProcessSubject, ViewportInfo, WorkflowError,
};
use crate::viewport::{Viewport, ViewportAdapter};

struct Queued<T> {
    subject: ProcessSubject<T>,
    epoch: u64,
}

/// Queue, epoch and run-state shared with fetch continuations. Kept apart from the core
/// cell so a continuation can always enqueue, even while a drain holds the core.
struct Shared<T> {
    queue: RefCell<VecDeque<Queued<T>>>,
    epoch: Cell<u64>,
    draining: Cell<bool>,
    disposed: Cell<bool>,
}

struct Core<T> {
    scroller: Scroller<T>,
    cycles_done: usize,
    errors: Vec<WorkflowError>,
    /// Timestamp of the newest undelivered scroll event, for debouncing.
    pending_scroll: Option<u64>,
}

impl<T: Clone> Core<T> {
    /// Cycle complete: the rendering surface has the final buffer contents, the
    /// pending/loading flags drop (unless a settled scroll is about to fire).
    fn done(&mut self) {
        self.cycles_done += 1;
        let state = &mut self.scroller.state;
        state.cycle_count = self.cycles_done + 1;
        state.is_initial_cycle = false;
        state.set_workflow_pending(false);
        if self.pending_scroll.is_none() {
            state.set_is_loading(false);
        }
        sdebug!(cycles = self.cycles_done, "workflow cycle done");
    }
}

/// The state-machine runner: owns the scroller context, serializes one process step per
/// posted signal, and survives overlapping triggers by discarding everything issued
/// under an older epoch.
///
/// A **cycle** runs from `init`/`start` to `end`/`done`; it may contain several
/// **loops** when `end` resolves into `start`/`scroll` instead of terminating.
///
/// The host drives time explicitly: call [`Workflow::on_scroll`] for every scroll event
/// and [`Workflow::tick`] on a frame/timer cadence so debounced scrolls settle. Neither
/// may be called from inside a subscriber callback.
pub struct Workflow<T> {
    shared: Rc<Shared<T>>,
    core: Rc<RefCell<Core<T>>>,
}

impl<T: Clone + 'static> Workflow<T> {
    /// Validates the settings and starts the session; the initial cycle begins
    /// immediately (its fetch resolves whenever the datasource does).
    pub fn new(
        settings: Settings,
        datasource: impl Datasource<T> + 'static,
        viewport: impl Viewport + 'static,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let viewport = ViewportAdapter::new(Box::new(viewport), &settings);
        let scroller = Scroller::new(settings, Box::new(datasource), viewport);
        let workflow = Self {
            shared: Rc::new(Shared {
                queue: RefCell::new(VecDeque::new()),
                epoch: Cell::new(0),
                draining: Cell::new(false),
                disposed: Cell::new(false),
            }),
            core: Rc::new(RefCell::new(Core {
                scroller,
                cycles_done: 0,
                errors: Vec::new(),
                pending_scroll: None,
            })),
        };
        workflow.post(ProcessSubject::new(
            Process::Init,
            ProcessStatus::Start,
            Payload::None,
        ));
        Ok(workflow)
    }

    /// Clears the window and starts over, optionally from a new start index. Interrupts
    /// any in-flight cycle: its pending fetch continuation becomes a no-op.
    pub fn reload(&self, start_index: Option<i64>) {
        self.post_external(ProcessSubject::new(
            Process::Reload,
            ProcessStatus::Start,
            Payload::Reload { start_index },
        ));
    }

    /// Adds items after the end of the dataset. `eof` asserts that these are the very
    /// last items, pinning the absolute bound even when it was unknown.
    pub fn append(&self, items: Vec<T>, eof: bool) {
        self.post_external(ProcessSubject::new(
            Process::Append,
            ProcessStatus::Start,
            Payload::Insert {
                items,
                edge: eof,
                prepend: false,
            },
        ));
    }

    /// Adds items before the beginning of the dataset, preserving their order (the first
    /// element ends up at the lowest index). `bof` asserts the absolute bound.
    pub fn prepend(&self, items: Vec<T>, bof: bool) {
        self.post_external(ProcessSubject::new(
            Process::Prepend,
            ProcessStatus::Start,
            Payload::Insert {
                items,
                edge: bof,
                prepend: true,
            },
        ));
    }

    /// Re-measures resident items and reconciles any size changes.
    pub fn check(&self) {
        self.post_external(ProcessSubject::new(
            Process::Check,
            ProcessStatus::Start,
            Payload::None,
        ));
    }

    /// Removes every resident item matching the predicate (a contiguous series per
    /// call), renumbering the tail.
    pub fn remove(&self, predicate: impl Fn(&Item<T>) -> bool + 'static) {
        self.post_external(ProcessSubject::new(
            Process::Remove,
            ProcessStatus::Start,
            Payload::Remove(Box::new(predicate)),
        ));
    }

    /// Clips out-of-viewport items on demand.
    pub fn clip(&self, options: ClipOptions) {
        self.post_external(ProcessSubject::new(
            Process::UserClip,
            ProcessStatus::Start,
            Payload::Clip(options),
        ));
    }

    /// Applies user corrections (bounds, item updater, scroll position).
    pub fn fix(&self, options: FixOptions<T>) {
        self.post_external(ProcessSubject::new(
            Process::Fix,
            ProcessStatus::Start,
            Payload::Fix(options),
        ));
    }

    /// Host scroll event at `now_ms`. Debounced by `settings.scroll_debounce_ms`; with a
    /// zero debounce the workflow reacts immediately, otherwise on a later [`Self::tick`].
    pub fn on_scroll(&self, now_ms: u64) {
        if self.shared.disposed.get() {
            return;
        }
        let debounce = {
            let mut core = self.core.borrow_mut();
            core.pending_scroll = Some(now_ms);
            core.scroller.settings.scroll_debounce_ms
        };
        if debounce == 0 {
            self.fire_scroll(false);
        }
    }

    /// Advances the debounce clock; fires the pending scroll once it has settled.
    pub fn tick(&self, now_ms: u64) {
        if self.shared.disposed.get() {
            return;
        }
        let fire = {
            let core = self.core.borrow();
            match core.pending_scroll {
                Some(at) => {
                    now_ms.saturating_sub(at) >= core.scroller.settings.scroll_debounce_ms
                }
                None => false,
            }
        };
        if fire {
            self.fire_scroll(true);
        }
    }

    fn fire_scroll(&self, by_timer: bool) {
        let deferred = {
            let mut core = self.core.borrow_mut();
            core.pending_scroll = None;
            core.scroller.state.scroll_state.fired_by_timer = by_timer;
            if core.scroller.state.workflow_pending() {
                // mid-cycle: the cycle picks the scroll up as its next loop
                core.scroller.state.workflow_options.keep_scroll = true;
                true
            } else {
                false
            }
        };
        if !deferred {
            self.post_external(ProcessSubject::next(Process::Scroll, Payload::None));
        }
    }

    /// Ends the session. Queued signals and in-flight fetch continuations are dropped.
    pub fn dispose(&self) {
        self.shared.disposed.set(true);
        self.shared.epoch.set(self.shared.epoch.get() + 1);
        self.shared.queue.borrow_mut().clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }

    pub fn is_loading(&self) -> bool {
        self.core.borrow().scroller.state.is_loading()
    }

    /// Whether the session is still inside its very first cycle (or a reload's).
    pub fn is_initial_cycle(&self) -> bool {
        self.core.borrow().scroller.state.is_initial_cycle
    }

    pub fn is_loading_signal(&self) -> Signal<bool> {
        self.core.borrow().scroller.state.is_loading_signal()
    }

    pub fn loop_pending_signal(&self) -> Signal<bool> {
        self.core.borrow().scroller.state.loop_pending_signal()
    }

    pub fn workflow_pending_signal(&self) -> Signal<bool> {
        self.core.borrow().scroller.state.workflow_pending_signal()
    }

    pub fn first_visible_signal(&self) -> Signal<ItemAdapter<T>> {
        self.core.borrow().scroller.state.first_visible.clone()
    }

    pub fn last_visible_signal(&self) -> Signal<ItemAdapter<T>> {
        self.core.borrow().scroller.state.last_visible.clone()
    }

    /// Subscribes the rendering surface to buffer content changes; called synchronously
    /// on every mutation and immediately with the current items.
    pub fn on_items(&self, f: impl Fn(&[Item<T>]) + 'static) {
        self.core.borrow_mut().scroller.buffer.subscribe(f);
    }

    /// Clones the resident items out, for inspection.
    pub fn items(&self) -> Vec<Item<T>> {
        self.core.borrow().scroller.buffer.items().to_vec()
    }

    pub fn buffer_info(&self) -> BufferInfo {
        self.core.borrow().scroller.buffer.info()
    }

    pub fn viewport_info(&self) -> ViewportInfo {
        self.core.borrow().scroller.viewport.info()
    }

    /// The append-only error log.
    pub fn errors(&self) -> Vec<WorkflowError> {
        self.core.borrow().errors.clone()
    }

    pub fn cycles_done(&self) -> usize {
        self.core.borrow().cycles_done
    }

    /// Enqueues under the current epoch and runs the machine.
    fn post(&self, subject: ProcessSubject<T>) {
        if self.shared.disposed.get() {
            return;
        }
        strace!(
            process = %subject.process,
            status = %subject.status,
            "signal"
        );
        self.shared.queue.borrow_mut().push_back(Queued {
            subject,
            epoch: self.shared.epoch.get(),
        });
        drain(&self.shared, &self.core);
    }

    /// An external trigger opens a new epoch: whatever the in-flight cycle still had
    /// queued — including its eventual fetch continuation — is stale from here on.
    fn post_external(&self, subject: ProcessSubject<T>) {
        if self.shared.disposed.get() {
            return;
        }
        self.shared.epoch.set(self.shared.epoch.get() + 1);
        self.post(subject);
    }
}

impl<T> core::fmt::Debug for Workflow<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Workflow")
            .field("epoch", &self.shared.epoch.get())
            .field("queued", &self.shared.queue.borrow().len())
            .field("disposed", &self.shared.disposed.get())
            .finish_non_exhaustive()
    }
}

/// Runs queued signals to exhaustion, one step at a time. Re-entrant calls (a fetch
/// resolving synchronously inside its own dispatch) only enqueue; the active drain picks
/// the new signal up.
fn drain<T: Clone + 'static>(shared: &Rc<Shared<T>>, core: &Rc<RefCell<Core<T>>>) {
    if shared.draining.get() {
        return;
    }
    shared.draining.set(true);
    loop {
        let next = shared.queue.borrow_mut().pop_front();
        let Some(queued) = next else {
            break;
        };
        if queued.epoch != shared.epoch.get() {
            strace!(
                process = %queued.subject.process,
                "stale signal dropped"
            );
            continue;
        }
        if let Some(successor) = dispatch(shared, core, queued.subject, queued.epoch) {
            // successors continue the current chain ahead of anything queued meanwhile
            shared.queue.borrow_mut().push_front(Queued {
                subject: successor,
                epoch: queued.epoch,
            });
        }
    }
    shared.draining.set(false);
}

/// The fixed, total transition table: every reachable `(process, status)` pair maps to
/// exactly one next action. Errors short-circuit into End after being recorded.
fn dispatch<T: Clone + 'static>(
    shared: &Rc<Shared<T>>,
    core_rc: &Rc<RefCell<Core<T>>>,
    subject: ProcessSubject<T>,
    epoch: u64,
) -> Option<ProcessSubject<T>> {
    use Process as P;
    use ProcessStatus as S;

    let mut core = core_rc.borrow_mut();
    let ProcessSubject {
        process,
        status,
        payload,
    } = subject;

    if status == S::Error {
        let message = match payload {
            Payload::Error(message) => message,
            _ => String::from("unknown error"),
        };
        swarn!(process = %process, message = %message, "workflow error");
        let time_ms = core.scroller.state.time_ms();
        let loop_id = core.scroller.loop_id();
        core.errors.push(WorkflowError {
            process,
            message,
            time_ms,
            loop_id,
        });
        return process::end::run(&mut core.scroller, Some(process), true);
    }

    let scroller = &mut core.scroller;
    match (process, status) {
        (P::Init, S::Start) => process::init::run(scroller, payload.origin()),
        (P::Start, S::Start) => {
            let origin = payload.origin().unwrap_or(P::Init);
            process::start::run(scroller, origin)
        }
        (P::Start, S::Next) => {
            let origin = payload.origin().unwrap_or(P::Init);
            match origin {
                P::Append | P::Prepend | P::Check => process::render::run(scroller),
                P::Remove => process::clip::run(scroller),
                _ => process::pre_fetch::run(scroller, origin),
            }
        }
        (P::Scroll, S::Next) => {
            if scroller.state.workflow_options.keep_scroll {
                process::start::run(scroller, P::Scroll)
            } else {
                process::init::run(scroller, Some(P::Scroll))
            }
        }
        (P::Reload, S::Start) => {
            let start_index = match payload {
                Payload::Reload { start_index } => start_index,
                _ => None,
            };
            process::reload::run(scroller, start_index)
        }
        (P::Reload, S::Next) => {
            if matches!(payload, Payload::Flag(true)) {
                process::end::run(scroller, Some(P::Reload), false)
            } else {
                process::init::run(scroller, Some(P::Reload))
            }
        }
        (P::Append | P::Prepend, S::Start) => match payload {
            Payload::Insert {
                items,
                edge,
                prepend,
            } => process::append::run(scroller, items, edge, prepend),
            _ => Some(ProcessSubject::error(process, "missing items payload")),
        },
        (P::Append | P::Prepend, S::Next) => process::init::run(scroller, Some(process)),
        (P::Check, S::Start) => process::check::run(scroller),
        (P::Check, S::Next) => process::init::run(scroller, Some(P::Check)),
        (P::Check, S::Done) => process::end::run(scroller, Some(P::Check), false),
        (P::Remove, S::Start) => match payload {
            Payload::Remove(predicate) => process::remove::run(scroller, predicate),
            _ => Some(ProcessSubject::error(process, "missing predicate payload")),
        },
        (P::Remove, S::Next) => process::init::run(scroller, Some(P::Remove)),
        (P::Remove, S::Done) => process::end::run(scroller, Some(P::Remove), false),
        (P::UserClip, S::Start) => match payload {
            Payload::Clip(options) => process::user_clip::run(scroller, options),
            _ => Some(ProcessSubject::error(process, "missing clip options payload")),
        },
        (P::UserClip, S::Next) => process::init::run(scroller, Some(P::UserClip)),
        (P::Fix, S::Start) => match payload {
            Payload::Fix(options) => process::fix::run(scroller, options),
            _ => Some(ProcessSubject::error(process, "missing fix options payload")),
        },
        (P::Fix, S::Next) => process::init::run(scroller, Some(P::Fix)),
        (P::PreFetch, S::Next | S::Done) => {
            let origin = payload.origin().unwrap_or(P::Init);
            if origin == P::UserClip {
                // the user-clip flow borrows the planner state and goes straight to
                // eviction, fetch or no fetch
                process::pre_clip::run(scroller)
            } else if status == S::Next {
                let handle = FetchHandle::new(epoch, make_deliver(shared, core_rc));
                process::fetch::run(scroller, handle)
            } else {
                process::end::run(scroller, Some(P::PreFetch), false)
            }
        }
        (P::Fetch, S::Next) => match payload {
            Payload::Items(items) => process::post_fetch::run(scroller, items),
            _ => Some(ProcessSubject::error(process, "missing fetched items payload")),
        },
        (P::PostFetch, S::Next) => process::render::run(scroller),
        (P::PostFetch, S::Done) => process::end::run(scroller, Some(P::PostFetch), false),
        (P::Render, S::Next) => {
            if matches!(payload, Payload::Flag(true)) {
                process::adjust::run(scroller)
            } else {
                process::pre_clip::run(scroller)
            }
        }
        (P::PreClip, S::Next) => {
            if matches!(payload, Payload::Flag(true)) {
                process::clip::run(scroller)
            } else {
                process::adjust::run(scroller)
            }
        }
        (P::Clip, S::Next) => {
            if payload.origin() == Some(P::End) {
                process::end::run(scroller, Some(P::Clip), false)
            } else {
                process::adjust::run(scroller)
            }
        }
        (P::Adjust, S::Done) => process::end::run(scroller, Some(P::Adjust), false),
        (P::End, S::Next) => {
            if scroller.state.workflow_options.keep_scroll {
                process::scroll::run(scroller)
            } else {
                process::start::run(scroller, P::End)
            }
        }
        (P::End, S::Done) => {
            core.done();
            None
        }
        _ => {
            swarn!(process = %process, status = %status, "unhandled signal");
            None
        }
    }
}

/// Builds the continuation a [`FetchHandle`] delivers through: it re-checks the epoch,
/// enqueues the fetch result as a signal and wakes the runner if it is idle.
fn make_deliver<T: Clone + 'static>(
    shared: &Rc<Shared<T>>,
    core: &Rc<RefCell<Core<T>>>,
) -> Rc<dyn Fn(u64, Result<Vec<T>, String>)> {
    let shared = Rc::clone(shared);
    let core: Weak<RefCell<Core<T>>> = Rc::downgrade(core);
    Rc::new(move |epoch, result| {
        if shared.disposed.get() || epoch != shared.epoch.get() {
            strace!("stale fetch result discarded");
            return;
        }
        let subject = match result {
            Ok(items) => ProcessSubject::next(Process::Fetch, Payload::Items(items)),
            Err(message) => ProcessSubject::error(Process::Fetch, message),
        };
        shared.queue.borrow_mut().push_back(Queued { subject, epoch });
        if let Some(core) = core.upgrade() {
            drain(&shared, &core);
        }
    })
}
