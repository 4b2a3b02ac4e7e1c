//! A headless windowed scrolling engine with on-demand data fetching.
//!
//! For the public control facade (`Adapter`) and ready-made datasources, see the
//! `vscroll-adapter` crate.
//!
//! This crate keeps a bounded window of items materialized out of a dataset that is too
//! large (or unbounded) to hold at once: it plans which index range must be fetched next,
//! asks a caller-supplied [`Datasource`] for it, folds measured item sizes back in, evicts
//! items that drift far out of view, and converts their space into virtual padding so the
//! scroll position stays put. All of that is coordinated by a push-driven state machine
//! ([`Workflow`]) that runs one process step per posted signal.
//!
//! It is UI-agnostic. A UI layer is expected to provide:
//! - a [`Viewport`]: scroll position get/set, viewport size, measured item sizes,
//!   padding element sizes
//! - a [`Datasource`]: one asynchronous `get(start_index, count)` with exactly one
//!   success-or-error continuation per call
//! - scroll events and a timer tick (`Workflow::on_scroll` / `Workflow::tick`)
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod buffer;
mod cache;
mod datasource;
mod item;
mod process;
mod scroller;
mod settings;
mod signal;
mod state;
mod types;
mod viewport;
mod workflow;

#[cfg(test)]
mod tests;

pub use buffer::Buffer;
pub use cache::Cache;
pub use datasource::{Datasource, FetchHandle};
pub use item::Item;
pub use settings::{Settings, SettingsError};
pub use signal::Signal;
pub use types::{
    BufferInfo, ClipOptions, Direction, FixOptions, ItemAdapter, ItemsPredicate, Process,
    ProcessStatus, ViewportInfo, WorkflowError,
};
pub use viewport::Viewport;
pub use workflow::Workflow;
