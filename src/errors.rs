//! Harness error type.
//!
//! Test failures are never errors: they are recorded as `success = false` and rendered in the
//! report. `HarnessError` only covers misuse of the test stack and infrastructure faults
//! (temp files, shared memory, fork, wait), which end the run.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the harness itself.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("pop called with no active test")]
    #[diagnostic(
        code(nestcheck::empty_stack),
        help("every pop must be paired with an earlier push")
    )]
    EmptyStack,

    #[error("test handle no longer refers to an active test")]
    #[diagnostic(
        code(nestcheck::stale_node),
        help("handles returned by push are only valid until that test pops")
    )]
    StaleNode,

    #[error("invalid shared flag name {name:?}")]
    #[diagnostic(code(nestcheck::shared_flag_name))]
    InvalidFlagName {
        name: String,
        #[source]
        source: std::ffi::NulError,
    },

    #[error("failed to create shared flag {name}")]
    #[diagnostic(
        code(nestcheck::shared_flag),
        help("a stale segment may be left in /dev/shm, or shared memory is unavailable")
    )]
    SharedFlag {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to create capture file")]
    #[diagnostic(code(nestcheck::capture))]
    Capture(#[source] io::Error),

    #[error("failed to read captured output from {}", path.display())]
    #[diagnostic(code(nestcheck::capture_read))]
    CaptureRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("fork failed")]
    #[diagnostic(code(nestcheck::fork))]
    Fork(#[source] io::Error),

    #[error("waiting for child {pid} failed")]
    #[diagnostic(code(nestcheck::wait))]
    Wait {
        pid: i32,
        #[source]
        source: io::Error,
    },
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
