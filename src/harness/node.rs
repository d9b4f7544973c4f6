//! Test nodes and the handles that address them.

use nestcheck_core::ReportBuffer;

/// Handle to a test node in the runner's arena.
///
/// Handles are generation-checked: once the node pops and its slot is recycled, the old handle
/// stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

/// One entry in the test hierarchy.
#[derive(Debug, Default)]
pub struct TestNode {
    /// Padded name, then the status marker and any rendered detail once popped.
    pub(crate) output: ReportBuffer,
    /// Diagnostics written while this node is active.
    pub(crate) error: ReportBuffer,
    /// Rendered output of retired direct children, already indented.
    pub(crate) children: ReportBuffer,
    /// AND of every retired direct child's outcome.
    pub(crate) children_success: bool,
}

impl TestNode {
    /// Reset all mutable state and write the padded display name.
    pub(crate) fn reset(&mut self, name: &str, name_width: usize, fill: char) {
        self.children_success = true;
        self.children.clear();
        self.error.clear();

        self.output.set(name);
        self.output.push(' ');
        // Markers start at `name_width`; the last column is the separating space.
        while self.output.char_len() < name_width.saturating_sub(1) {
            self.output.push(fill);
        }
        self.output.push(' ');
    }

    pub fn output(&self) -> &ReportBuffer {
        &self.output
    }

    pub fn error(&self) -> &ReportBuffer {
        &self.error
    }

    pub fn children(&self) -> &ReportBuffer {
        &self.children
    }

    pub fn children_success(&self) -> bool {
        self.children_success
    }
}
