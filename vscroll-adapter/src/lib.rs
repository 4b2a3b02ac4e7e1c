//! Public control facade and datasource helpers for the `vscroll` crate.
//!
//! The `vscroll` crate is UI-agnostic and focuses on the scroll workflow engine. This
//! crate provides the thin outward-facing surface a host application talks to:
//!
//! - [`Adapter`]: reload / append / prepend / check / remove / clip / fix, plus
//!   read-only observable signals (loading state, first/last visible item) and
//!   buffer/viewport statistics
//! - [`ArrayDatasource`]: a ready-made in-memory datasource for demos and tests
//!
//! This crate is intentionally framework-agnostic (no DOM/TUI bindings).
#![forbid(unsafe_code)]

mod adapter;
mod array;


pub use adapter::Adapter;
pub use array::ArrayDatasource;
