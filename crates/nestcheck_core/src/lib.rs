//! Provide the small, pure building blocks the nestcheck harness is built on and exercised with.
//!
//! This crate is intentionally dependency-light. It contains:
//! - [`buffer`]: an append-only text buffer with indentation-prefixed concatenation, used to build
//!   the nested test report.
//! - [`strings`]: string utilities (search/replace with a substitution count, in-place trimming,
//!   balanced-parenthesis scanning) that the built-in self-test suite verifies.
//!
//! ## Notes
//!
//! - No IO, no global state, no harness-specific types. Everything here is deterministic.

#![deny(clippy::unwrap_used)]

pub mod buffer;
pub mod strings;

pub use buffer::ReportBuffer;
pub use strings::{ParenScan, find_unmatched_close, find_unmatched_open, replace_counted, rstrip_in_place, strip_in_place};
