use core::fmt;

use crate::item::Item;

/// Scroll-axis direction, from the buffer's point of view.
///
/// `Backward` points at lower indexes (content before the window), `Forward` at higher
/// indexes (content after the window).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Backward => Self::Forward,
            Self::Forward => Self::Backward,
        }
    }
}

/// The named processes of the workflow state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Process {
    Init,
    Start,
    Scroll,
    Reload,
    Append,
    Prepend,
    Check,
    Remove,
    UserClip,
    Fix,
    PreFetch,
    Fetch,
    PostFetch,
    Render,
    PreClip,
    Clip,
    Adjust,
    End,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Scroll => "scroll",
            Self::Reload => "reload",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Check => "check",
            Self::Remove => "remove",
            Self::UserClip => "userClip",
            Self::Fix => "fix",
            Self::PreFetch => "preFetch",
            Self::Fetch => "fetch",
            Self::PostFetch => "postFetch",
            Self::Render => "render",
            Self::PreClip => "preClip",
            Self::Clip => "clip",
            Self::Adjust => "adjust",
            Self::End => "end",
        };
        f.write_str(name)
    }
}

/// Status attached to every process signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessStatus {
    Start,
    Next,
    Done,
    Error,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Next => "next",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A predicate applied to every resident item by `remove`.
pub type ItemsPredicate<T> = Box<dyn Fn(&Item<T>) -> bool>;

/// Options for the user-triggered clip call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipOptions {
    /// Clip only items past the forward edge of the viewport.
    pub forward_only: bool,
    /// Clip only items before the backward edge of the viewport.
    pub backward_only: bool,
}

/// Options for the user-triggered fix call.
///
/// Every field is optional; only the supplied ones are applied, in the order they are
/// declared here.
pub struct FixOptions<T> {
    /// New scroll position, in pixels. Must be finite.
    pub scroll_position: Option<f64>,
    /// New absolute minimum index of the dataset.
    pub min_index: Option<i64>,
    /// New absolute maximum index of the dataset.
    pub max_index: Option<i64>,
    /// A mutation applied to every resident item.
    pub updater: Option<Box<dyn FnMut(&mut Item<T>)>>,
}

impl<T> Default for FixOptions<T> {
    fn default() -> Self {
        Self {
            scroll_position: None,
            min_index: None,
            max_index: None,
            updater: None,
        }
    }
}

impl<T> fmt::Debug for FixOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixOptions")
            .field("scroll_position", &self.scroll_position)
            .field("min_index", &self.min_index)
            .field("max_index", &self.max_index)
            .field("updater", &self.updater.as_ref().map(|_| ".."))
            .finish()
    }
}

/// A recorded workflow error: which process failed, why, and when.
#[derive(Clone, Debug)]
pub struct WorkflowError {
    pub process: Process,
    pub message: String,
    /// Milliseconds since the session was constructed.
    pub time_ms: u64,
    /// `"{instance}-{cycle}-{loop}"`, matching the log lines.
    pub loop_id: String,
}

/// The first/last-visible-item view published through the adapter signals.
///
/// Equality is defined by index alone: two snapshots pointing at the same absolute index
/// compare equal even if the payload has been swapped underneath. This mirrors the
/// notify-on-index-change contract of the visibility signals.
#[derive(Clone, Debug)]
pub struct ItemAdapter<T> {
    pub index: Option<i64>,
    pub data: Option<T>,
}

impl<T> ItemAdapter<T> {
    pub fn empty() -> Self {
        Self {
            index: None,
            data: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_none()
    }
}

impl<T> Default for ItemAdapter<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for ItemAdapter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

/// Read-only buffer statistics exposed through the adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferInfo {
    pub first_index: Option<i64>,
    pub last_index: Option<i64>,
    pub size: usize,
    pub abs_min_index: Option<i64>,
    pub abs_max_index: Option<i64>,
    pub average_size: Option<f64>,
    pub bof: bool,
    pub eof: bool,
}

/// Read-only viewport statistics exposed through the adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportInfo {
    pub scroll_position: f64,
    pub size: f64,
    pub backward_padding: f64,
    pub forward_padding: f64,
}

/// One signal travelling through the workflow queue.
pub(crate) struct ProcessSubject<T> {
    pub process: Process,
    pub status: ProcessStatus,
    pub payload: Payload<T>,
}

impl<T> ProcessSubject<T> {
    pub(crate) fn new(process: Process, status: ProcessStatus, payload: Payload<T>) -> Self {
        Self {
            process,
            status,
            payload,
        }
    }

    pub(crate) fn next(process: Process, payload: Payload<T>) -> Self {
        Self::new(process, ProcessStatus::Next, payload)
    }

    pub(crate) fn done(process: Process, payload: Payload<T>) -> Self {
        Self::new(process, ProcessStatus::Done, payload)
    }

    pub(crate) fn error(process: Process, message: impl Into<String>) -> Self {
        Self::new(process, ProcessStatus::Error, Payload::Error(message.into()))
    }
}

/// Data riding along with a signal.
///
/// The loose shape mirrors the original wire format: most transitions carry nothing or the
/// process that originated the cycle, a few carry a routing flag or the arguments of an
/// adapter call.
pub(crate) enum Payload<T> {
    None,
    /// The process a cycle/loop was started on behalf of.
    Origin(Process),
    Error(String),
    /// Routing flag: `no_clip` after render, `do_clip` after pre-clip, `finalize` after
    /// reload, `Origin(End)` equivalent is expressed via `Origin`.
    Flag(bool),
    /// Fetched records delivered by the datasource continuation.
    Items(Vec<T>),
    Reload {
        start_index: Option<i64>,
    },
    Insert {
        items: Vec<T>,
        /// BOF/EOF assertion supplied by the caller.
        edge: bool,
        prepend: bool,
    },
    Remove(ItemsPredicate<T>),
    Clip(ClipOptions),
    Fix(FixOptions<T>),
}

impl<T> Payload<T> {
    pub(crate) fn origin(&self) -> Option<Process> {
        match self {
            Self::Origin(process) => Some(*process),
            _ => None,
        }
    }
}
