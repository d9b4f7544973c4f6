//! Named shared-memory boolean that survives a fork.
//!
//! Ordinary memory is copied on fork, so writes made by the child never reach the parent. The flag
//! lives in a POSIX shared-memory object mapped `MAP_SHARED` before the fork; both processes see
//! the same byte. Dropping the flag unmaps it and unlinks the name.

use std::ffi::CString;
use std::io;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::errors::{HarnessError, HarnessResult};

static NEXT_FLAG: AtomicU64 = AtomicU64::new(0);

/// Build a name unique to this process and invocation, e.g. `/nestcheck_4211_0`.
pub(crate) fn unique_name(prefix: &str) -> String {
    let seq = NEXT_FLAG.fetch_add(1, Ordering::Relaxed);
    format!("/{}_{}_{}", prefix, std::process::id(), seq)
}

/// A mapped, named shared-memory flag.
#[derive(Debug)]
pub struct SharedFlag {
    name: String,
    c_name: CString,
    cell: NonNull<AtomicBool>,
}

impl SharedFlag {
    /// Create the segment `name` (which must start with `/`) and set the flag to `initial`.
    ///
    /// ## Errors
    /// - [`HarnessError::InvalidFlagName`] if `name` contains a NUL byte.
    /// - [`HarnessError::SharedFlag`] if the segment already exists or cannot be sized or mapped.
    pub fn create(name: &str, initial: bool) -> HarnessResult<Self> {
        let c_name = CString::new(name).map_err(|source| HarnessError::InvalidFlagName {
            name: name.to_string(),
            source,
        })?;
        let fail = |source: io::Error| HarnessError::SharedFlag {
            name: name.to_string(),
            source,
        };

        let size = std::mem::size_of::<AtomicBool>();

        // SAFETY: `c_name` is a valid NUL-terminated string for the duration of the call.
        let fd = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                0o600 as libc::c_uint,
            )
        };
        if fd < 0 {
            return Err(fail(io::Error::last_os_error()));
        }

        // SAFETY: `fd` is the descriptor just returned by `shm_open`; the mapping is checked
        // against `MAP_FAILED` before use and the descriptor is closed on every path.
        let mapped = unsafe {
            let result = if libc::ftruncate(fd, size as libc::off_t) != 0 {
                Err(io::Error::last_os_error())
            } else {
                let ptr = libc::mmap(
                    std::ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_SHARED,
                    fd,
                    0,
                );
                if ptr == libc::MAP_FAILED {
                    Err(io::Error::last_os_error())
                } else {
                    Ok(ptr)
                }
            };
            libc::close(fd);
            result
        };

        let ptr = match mapped {
            Ok(ptr) => ptr,
            Err(err) => {
                // SAFETY: the name was created above and nothing else refers to it yet.
                unsafe { libc::shm_unlink(c_name.as_ptr()) };
                return Err(fail(err));
            }
        };

        let Some(cell) = NonNull::new(ptr.cast::<AtomicBool>()) else {
            // SAFETY: as above.
            unsafe { libc::shm_unlink(c_name.as_ptr()) };
            return Err(fail(io::Error::other("mmap returned a null mapping")));
        };

        let flag = Self {
            name: name.to_string(),
            c_name,
            cell,
        };
        flag.cell().store(initial, Ordering::SeqCst);
        Ok(flag)
    }

    /// The mapped cell. Valid for the lifetime of `self`, in the parent and in a forked child.
    pub fn cell(&self) -> &AtomicBool {
        // SAFETY: `cell` points at a live `MAP_SHARED` mapping of at least one byte, page aligned,
        // which stays mapped until `drop`. `AtomicBool` has the size and alignment of `u8`.
        unsafe { self.cell.as_ref() }
    }

    pub fn get(&self) -> bool {
        self.cell().load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SharedFlag {
    fn drop(&mut self) {
        // SAFETY: the mapping and name were created in `create` and are released exactly once.
        unsafe {
            if libc::munmap(self.cell.as_ptr().cast(), std::mem::size_of::<AtomicBool>()) != 0 {
                tracing::warn!(name = %self.name, error = %io::Error::last_os_error(), "munmap failed");
            }
            if libc::shm_unlink(self.c_name.as_ptr()) != 0 {
                tracing::warn!(name = %self.name, error = %io::Error::last_os_error(), "shm_unlink failed");
            }
        }
    }
}
