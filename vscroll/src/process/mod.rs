//! The process library: each module hosts one step of the scroll workflow as a function
//! of the shared context, returning the signal that drives the state machine onward.
//!
//! `fetch` is the only process that suspends; it hands its continuation to the
//! datasource instead of returning a signal.

pub(crate) mod adjust;
pub(crate) mod append;
pub(crate) mod check;
pub(crate) mod clip;
pub(crate) mod end;
pub(crate) mod fetch;
pub(crate) mod fix;
pub(crate) mod init;
pub(crate) mod post_fetch;
pub(crate) mod pre_clip;
pub(crate) mod pre_fetch;
pub(crate) mod reload;
pub(crate) mod remove;
pub(crate) mod render;
pub(crate) mod scroll;
pub(crate) mod start;
pub(crate) mod user_clip;
