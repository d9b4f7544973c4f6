//! nestcheck: a nested test harness with crash-safe execution.
//!
//! Tests are opened and closed on a stack. Closing a test folds its outcome and rendered text
//! into its parent, so the final report is an indented tree in which passing subtrees collapse
//! to a single line and failures show their diagnostics. Test bodies can run in a forked child
//! process, turning a segfault or abort in the code under test into an ordinary failure.
//!
//! ```rust
//! use nestcheck::{HarnessConfig, TestRunner};
//!
//! let mut t = TestRunner::new(HarnessConfig::new().with_disable_colors(true));
//! t.push("String");
//! t.push("trim");
//! t.check_str("abc".trim(), "abc").unwrap();
//! assert!(t.parent_pop().unwrap());
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli`, `harness` and
//!   `isolation` modules enforce `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! ## Unsafe code
//!
//! `unsafe` is confined to [`isolation`]: `fork`, `waitpid`, `dup2`, `_exit` and the shared-memory mapping.

pub mod cli;
pub mod errors;
pub mod harness;
pub mod isolation;
pub mod suites;

pub use errors::{HarnessError, HarnessResult};
pub use harness::{HarnessConfig, Isolation, NodeId, TestNode, TestRunner, TestStack};
pub use isolation::{ChildStatus, CrashFlag, CrashSafeExecutor, IsolatedRun, RawStream, SharedFlag};
pub use nestcheck_core::ReportBuffer;
