//! Unbuffered writers on file descriptors 1 and 2.
//!
//! `std::io::Stdout` and `Stderr` sit behind process-wide locks, and `Stdout` buffers by line.
//! After a fork from a multi-threaded parent those locks may be copied in a held state, and a
//! partial line still in the buffer is lost if the child crashes. A [`RawStream`] writes straight
//! to the descriptor with `write(2)`, so each call either reaches the capture file or fails.

use std::io::{self, Write};

/// Unbuffered, lock-free writer on a standard stream descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStream {
    fd: libc::c_int,
}

impl RawStream {
    pub fn stdout() -> Self {
        Self {
            fd: libc::STDOUT_FILENO,
        }
    }

    pub fn stderr() -> Self {
        Self {
            fd: libc::STDERR_FILENO,
        }
    }

    pub fn fd(&self) -> libc::c_int {
        self.fd
    }
}

impl Write for RawStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            // SAFETY: `buf` is a valid slice for `buf.len()` bytes; the descriptor is only written.
            let written = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
            if written >= 0 {
                return Ok(written as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
