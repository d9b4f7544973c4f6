//! Temporary files that receive an isolated child's stdout and stderr.

use std::fs;
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

use crate::errors::{HarnessError, HarnessResult};

/// Capture files for one isolated run. Dropping them deletes both files.
#[derive(Debug)]
pub(crate) struct CaptureFiles {
    stdout: NamedTempFile,
    stderr: NamedTempFile,
}

impl CaptureFiles {
    /// Create both files in `dir`, or in the system temp dir when `None`.
    pub(crate) fn create(dir: Option<&Path>) -> HarnessResult<Self> {
        Ok(Self {
            stdout: temp_file("nestcheck-stdout-", dir)?,
            stderr: temp_file("nestcheck-stderr-", dir)?,
        })
    }

    /// Point file descriptors 1 and 2 at the capture files.
    ///
    /// Only called in the forked child, after which the child never returns into harness code.
    pub(crate) fn redirect_std_streams(&self) -> io::Result<()> {
        redirect(self.stdout.as_file().as_raw_fd(), libc::STDOUT_FILENO)?;
        redirect(self.stderr.as_file().as_raw_fd(), libc::STDERR_FILENO)
    }

    pub(crate) fn read_stdout(&self) -> HarnessResult<String> {
        read_lossy(self.stdout.path())
    }

    pub(crate) fn read_stderr(&self) -> HarnessResult<String> {
        read_lossy(self.stderr.path())
    }

    /// Delete both files now, logging rather than failing if removal does not succeed.
    pub(crate) fn remove(self) {
        for file in [self.stdout, self.stderr] {
            let path = file.path().to_path_buf();
            if let Err(error) = file.close() {
                tracing::warn!(path = %path.display(), %error, "failed to remove capture file");
            }
        }
    }
}

fn temp_file(prefix: &str, dir: Option<&Path>) -> HarnessResult<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(prefix).suffix(".log");
    let file = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    file.map_err(HarnessError::Capture)
}

fn redirect(from: libc::c_int, to: libc::c_int) -> io::Result<()> {
    // SAFETY: `from` is an open descriptor owned by a live `NamedTempFile`; `dup2` only
    // replaces the standard stream descriptor `to`.
    if unsafe { libc::dup2(from, to) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// Read by path rather than through the shared descriptor: the child advanced its offset.
fn read_lossy(path: &Path) -> HarnessResult<String> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| HarnessError::CaptureRead {
            path: path.to_path_buf(),
            source,
        })
}
