//! Harness configuration

use std::path::PathBuf;

/// Column at which `OK` / `FAILED` markers start.
pub const DEFAULT_NAME_WIDTH: usize = 40;
/// Columns added per nesting level.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// How crash-safe bodies are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Isolation {
    /// Fork a child process per body; crashes become failures.
    #[default]
    Subprocess,
    /// Run bodies directly in the harness process. No output capture, no crash protection.
    /// Useful under a debugger.
    InProcess,
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Width of the padded name column, including the trailing space
    pub name_width: usize,
    /// Number of spaces per nesting level
    pub indent_width: usize,
    /// Character used to pad names up to the marker column
    pub fill_char: char,
    /// Render every child result, not only those under a failed test
    pub show_all_children: bool,
    /// Plain `OK` / `FAILED` markers without ANSI colors
    pub disable_colors: bool,
    /// Execution mode for crash-safe bodies
    pub isolation: Isolation,
    /// Directory for capture files; the system temp dir when `None`
    pub capture_dir: Option<PathBuf>,
    /// Prefix of shared-memory segment names
    pub flag_prefix: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            name_width: DEFAULT_NAME_WIDTH,
            indent_width: DEFAULT_INDENT_WIDTH,
            fill_char: '.',
            show_all_children: false,
            disable_colors: false,
            isolation: Isolation::Subprocess,
            capture_dir: None,
            flag_prefix: "nestcheck".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_fill_char(mut self, fill: char) -> Self {
        self.fill_char = fill;
        self
    }

    /// Always render child results
    pub fn with_show_all_children(mut self, show: bool) -> Self {
        self.show_all_children = show;
        self
    }

    /// Disable ANSI colors in status markers
    pub fn with_disable_colors(mut self, disable: bool) -> Self {
        self.disable_colors = disable;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = Some(dir.into());
        self
    }

    pub fn with_flag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.flag_prefix = prefix.into();
        self
    }
}
