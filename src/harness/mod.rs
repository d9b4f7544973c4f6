//! Nested test harness.
//!
//! A [`TestRunner`] tracks a stack of named tests. Each `push` opens a test, each `pop` closes
//! the innermost one with a pass/fail outcome and folds its rendered text into the parent (or,
//! for a root test, into the final report). Rendering happens bottom-up: a test's text only
//! reaches its parent once the test itself pops.
//!
//! ```rust
//! use nestcheck::{HarnessConfig, TestRunner};
//!
//! let mut t = TestRunner::new(HarnessConfig::new().with_disable_colors(true));
//! t.push("A");
//! t.push("B");
//! t.pop(false).unwrap();
//! t.parent_pop().unwrap();
//! assert!(t.report().starts_with("A "));
//! assert!(t.report().contains("    B "));
//! ```
//!
//! ## Diagnostics
//!
//! Diagnostics are written through the [`NodeId`] returned by `push`
//! ([`TestRunner::diagnostics`]), or with the [`diag!`](crate::diag) macro. They are only shown
//! when that test fails, or always with `show_all_children`.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod checks;
pub mod config;
pub mod node;
pub mod render;
pub mod stack;

use nestcheck_core::ReportBuffer;

use crate::errors::{HarnessError, HarnessResult};
use crate::isolation::{CrashFlag, CrashSafeExecutor};

pub use config::{HarnessConfig, Isolation};
pub use node::{NodeId, TestNode};
pub use stack::TestStack;

/// Owns the test stack, the cumulative report and the configuration.
#[derive(Debug)]
pub struct TestRunner {
    config: HarnessConfig,
    stack: TestStack,
    report: ReportBuffer,
    last_success: bool,
    executor: CrashSafeExecutor,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl TestRunner {
    pub fn new(config: HarnessConfig) -> Self {
        let executor = CrashSafeExecutor::new(&config);
        Self {
            config,
            stack: TestStack::new(),
            report: ReportBuffer::new(),
            last_success: true,
            executor,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Open a test named `name` as a child of the active test.
    ///
    /// Use [`test_push!`](crate::test_push) for an interpolated name.
    pub fn push(&mut self, name: impl AsRef<str>) -> NodeId {
        let name = name.as_ref();
        let id = self.stack.push(name, self.config.name_width, self.config.fill_char);
        tracing::trace!(name, depth = self.stack.depth(), "push");
        id
    }

    /// Close the active test with `success` and fold it into its parent.
    ///
    /// ## Returns
    /// - `Ok(success)`, so callers can chain the outcome.
    ///
    /// ## Errors
    /// - [`HarnessError::EmptyStack`] when no test is open.
    pub fn pop(&mut self, success: bool) -> HarnessResult<bool> {
        let index = self.stack.pop_index().ok_or(HarnessError::EmptyStack)?;
        self.last_success = success;
        let parent = self.stack.top_index();

        if let Some(parent) = parent {
            let parent = self.stack.node_at_mut(parent);
            parent.children_success = parent.children_success && success;
        }

        let colors = !self.config.disable_colors;
        let show_detail = self.config.show_all_children || !success;
        let indent = self.config.indent_width;

        let node = self.stack.node_at_mut(index);
        node.output.cat(&render::status_marker(success, colors));
        node.output.push('\n');
        if show_detail {
            let TestNode {
                output, error, children, ..
            } = &mut *node;
            output.cat_indented(error, indent);
            output.cat_buffer(children);
        }

        // Move the rendered text out so the parent can borrow the arena mutably; the buffer goes
        // back afterwards so the slot keeps its allocation for reuse.
        let rendered = std::mem::take(&mut node.output);
        match parent {
            Some(parent) => self.stack.node_at_mut(parent).children.cat_indented(&rendered, indent),
            None => self.report.cat_buffer(&rendered),
        }
        self.stack.node_at_mut(index).output = rendered;
        self.stack.release(index);

        tracing::trace!(
            success,
            depth = self.stack.depth(),
            free = self.stack.free_count(),
            "pop"
        );
        Ok(success)
    }

    /// Close the active test, passing only if all of its children passed.
    pub fn parent_pop(&mut self) -> HarnessResult<bool> {
        let index = self.stack.top_index().ok_or(HarnessError::EmptyStack)?;
        let success = self.stack.node_at(index).children_success;
        self.pop(success)
    }

    /// Handle of the active test.
    pub fn active(&self) -> Option<NodeId> {
        self.stack.top()
    }

    /// Diagnostic sink of an open test; `None` once it has popped.
    pub fn diagnostics(&mut self, id: NodeId) -> Option<&mut ReportBuffer> {
        self.stack.get_mut(id).map(|node| &mut node.error)
    }

    pub fn node(&self, id: NodeId) -> Option<&TestNode> {
        self.stack.get(id)
    }

    pub fn stack(&self) -> &TestStack {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// No test is open.
    pub fn is_idle(&self) -> bool {
        self.stack.depth() == 0
    }

    /// Outcome recorded by the most recent pop.
    pub fn last_success(&self) -> bool {
        self.last_success
    }

    /// Report text of every finished root test so far.
    pub fn report(&self) -> &str {
        self.report.as_str()
    }

    pub fn finish(self) -> String {
        if !self.is_idle() {
            tracing::warn!(depth = self.depth(), "finishing with tests still open");
        }
        self.report.into_string()
    }

    pub fn executor(&self) -> &CrashSafeExecutor {
        &self.executor
    }

    /// Run `body` through the configured executor on behalf of test `node`.
    ///
    /// Failure diagnostics (abnormal exit, captured output) are appended to the node's error text.
    /// The caller still decides when to pop.
    pub fn run_isolated<F>(&mut self, node: NodeId, body: F) -> HarnessResult<bool>
    where
        F: FnOnce(&CrashFlag<'_>),
    {
        let sink = self.stack.get_mut(node).ok_or(HarnessError::StaleNode)?;
        self.executor.run(&mut sink.error, body)
    }

    /// Like [`run_isolated`](Self::run_isolated), then runs `body` again in this process if the
    /// isolated run passed, so its side effects apply to the caller's state.
    pub fn run_isolated_then_apply<F>(&mut self, node: NodeId, body: F) -> HarnessResult<bool>
    where
        F: FnMut(&CrashFlag<'_>),
    {
        let sink = self.stack.get_mut(node).ok_or(HarnessError::StaleNode)?;
        self.executor.run_then_apply(&mut sink.error, body)
    }
}

/// Push a test with a `format!`-style name.
///
/// ```rust
/// use nestcheck::{TestRunner, test_push};
/// let mut t = TestRunner::default();
/// let case = 3;
/// test_push!(t, "case {case} of {}", 5);
/// assert_eq!(t.depth(), 1);
/// ```
#[macro_export]
macro_rules! test_push {
    ($runner:expr, $($arg:tt)+) => {
        $runner.push(::std::format!($($arg)+))
    };
}

/// Append formatted text to a test's diagnostics, if it is still open.
#[macro_export]
macro_rules! diag {
    ($runner:expr, $node:expr, $($arg:tt)+) => {
        if let ::std::option::Option::Some(sink) = $runner.diagnostics($node) {
            sink.cat_fmt(::std::format_args!($($arg)+));
        }
    };
}
