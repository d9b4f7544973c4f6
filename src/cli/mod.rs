//! CLI module for the nestcheck self-test binary
//!
//! Runs the built-in suites through a [`TestRunner`] and prints the report on stdout.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! `execute` returns `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.
//!
//! ## Exit codes
//!
//! - `0`: every suite passed
//! - `1`: at least one test failed
//! - `2`: the harness itself failed (bad capture dir, temp files, shared memory, fork)

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::errors::HarnessError;
use crate::harness::{HarnessConfig, Isolation, TestRunner};
use crate::suites::{self, Suite};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    pub const FATAL: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        let report = miette::Report::new(err);
        CliError::new(format!("{report:?}"), ExitCode::FATAL)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the nestcheck self-test suites
#[derive(Parser, Debug)]
#[command(name = "nestcheck")]
#[command(version = VERSION)]
#[command(about = "Nested test harness with crash-safe execution", long_about = None)]
pub struct Cli {
    /// Suite to run
    #[arg(long, value_enum, default_value_t = Suite::All)]
    pub suite: Suite,

    /// Show every child result, not only those under failures
    #[arg(long = "show-all")]
    pub show_all: bool,

    /// Disable ANSI colors in the report
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Run crash-safe bodies in this process (no fork, no capture)
    #[arg(long = "in-process")]
    pub in_process: bool,

    /// Directory for captured child output (default: system temp dir)
    #[arg(long = "capture-dir", value_name = "DIR")]
    pub capture_dir: Option<PathBuf>,
}

impl Cli {
    /// Build the harness configuration from the flags.
    pub fn config(&self) -> HarnessConfig {
        let isolation = if self.in_process {
            Isolation::InProcess
        } else {
            Isolation::Subprocess
        };
        let mut config = HarnessConfig::new()
            .with_show_all_children(self.show_all)
            .with_disable_colors(self.no_color)
            .with_isolation(isolation);
        if let Some(dir) = &self.capture_dir {
            config = config.with_capture_dir(dir.clone());
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Run the selected suites and print the report.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    if let Some(dir) = &cli.capture_dir {
        if !dir.is_dir() {
            return Err(CliError::new(
                format!("Error: capture directory '{}' does not exist", dir.display()),
                ExitCode::FATAL,
            ));
        }
    }

    let config = cli.config();
    tracing::debug!(suite = ?cli.suite, ?config, "running suites");

    let mut runner = TestRunner::new(config);
    let passed = suites::run_suite(&mut runner, cli.suite)?;
    let report = runner.finish();

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(report.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::failure(format!("Error writing report: {e}")))?;

    if passed {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::info!("some tests failed");
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["nestcheck"]).unwrap();
        assert_eq!(cli.suite, Suite::All);
        assert!(!cli.show_all);
        assert!(!cli.no_color);
        assert!(!cli.in_process);
        assert!(cli.capture_dir.is_none());
    }

    #[test]
    fn test_cli_parse_suite() {
        let cli = Cli::try_parse_from(["nestcheck", "--suite", "strings"]).unwrap();
        assert_eq!(cli.suite, Suite::Strings);

        let cli = Cli::try_parse_from(["nestcheck", "--suite", "isolation"]).unwrap();
        assert_eq!(cli.suite, Suite::Isolation);

        assert!(Cli::try_parse_from(["nestcheck", "--suite", "bogus"]).is_err());
    }

    #[test]
    fn test_cli_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "nestcheck",
            "--show-all",
            "--no-color",
            "--in-process",
            "--capture-dir",
            "/tmp/caps",
        ])
        .unwrap();
        let config = cli.config();
        assert!(config.show_all_children);
        assert!(config.disable_colors);
        assert_eq!(config.isolation, Isolation::InProcess);
        assert_eq!(config.capture_dir, Some(PathBuf::from("/tmp/caps")));
    }

    #[test]
    fn test_missing_capture_dir_is_fatal() {
        let cli = Cli::try_parse_from(["nestcheck", "--capture-dir", "/definitely/not/here"]).unwrap();
        let err = execute(cli).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FATAL);
        assert!(err.message.contains("does not exist"));
    }

    #[test]
    fn test_harness_error_is_fatal() {
        let err = CliError::from(HarnessError::EmptyStack);
        assert_eq!(err.exit_code, ExitCode::FATAL);
        assert!(err.message.contains("no active test"));
    }
}
