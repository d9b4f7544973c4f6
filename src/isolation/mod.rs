//! Crash-safe execution of test bodies.
//!
//! [`CrashSafeExecutor::run`] forks a child process for the body, so a segfault or abort in the
//! code under test becomes a test failure instead of taking the harness down. One invocation:
//!
//! 1. create two capture files and a named shared-memory flag set to `true`;
//! 2. fork; the child redirects stdout/stderr into the capture files, runs the body and exits
//!    without ever returning into harness code;
//! 3. the parent waits for that child and classifies the result:
//!    - normal exit: the flag's final value;
//!    - any other termination: failure, with an "exited abnormally" diagnostic;
//! 4. on failure only, captured stdout/stderr are read and appended to the diagnostics;
//! 5. the capture files and the shared-memory segment are removed on every path.
//!
//! There is no timeout. A body that hangs hangs the harness.
//!
//! ## Output from bodies
//!
//! Bodies should write through [`CrashFlag::stdout`] and [`CrashFlag::stderr`]. These are
//! unbuffered and take no locks, so bytes written just before a crash still land in the capture
//! file. `print!` and `std::io::stdout()` go through process-wide locks: when the parent has other
//! threads, one of them may hold a lock at fork time and the child then blocks on it forever.
//! Avoid them inside isolated bodies.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod capture;
pub mod raw_stream;
pub mod shared_flag;

use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use nestcheck_core::ReportBuffer;

use crate::errors::{HarnessError, HarnessResult};
use crate::harness::config::{HarnessConfig, Isolation};
use crate::harness::render::{CYAN, colorize};
use capture::CaptureFiles;
pub use raw_stream::RawStream;
pub use shared_flag::SharedFlag;

/// Exit code of a child whose body panicked.
pub const CHILD_PANICKED: i32 = 101;
/// Exit code of a child that could not redirect its standard streams.
pub const CHILD_SETUP_FAILED: i32 = 125;

/// Columns by which captured output is indented under its label.
const CAPTURE_INDENT: usize = 2;

/// Handle through which a test body reports its outcome.
///
/// In an isolated run this is backed by shared memory, so a value written by the child is still
/// visible to the parent after the child exits.
#[derive(Debug, Clone, Copy)]
pub struct CrashFlag<'a> {
    cell: &'a AtomicBool,
}

impl<'a> CrashFlag<'a> {
    pub fn new(cell: &'a AtomicBool) -> Self {
        Self { cell }
    }

    /// Mark the body as failed.
    pub fn fail(&self) {
        self.set(false);
    }

    /// Fail unless `condition` holds. Returns `condition`.
    pub fn check(&self, condition: bool) -> bool {
        if !condition {
            self.fail();
        }
        condition
    }

    pub fn set(&self, success: bool) {
        self.cell.store(success, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.cell.load(Ordering::SeqCst)
    }

    /// Unbuffered writer on the body's stdout (the capture file in an isolated run).
    pub fn stdout(&self) -> RawStream {
        RawStream::stdout()
    }

    /// Unbuffered writer on the body's stderr (the capture file in an isolated run).
    pub fn stderr(&self) -> RawStream {
        RawStream::stderr()
    }
}

/// How an isolated body terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// The child called `exit` with this code.
    Exited(i32),
    /// The child did not exit normally. `signal` is set when it was killed by one.
    Abnormal { raw: i32, signal: Option<i32> },
    /// The body ran in the harness process.
    InProcess,
}

impl ChildStatus {
    fn from_wait_status(raw: libc::c_int) -> Self {
        if libc::WIFEXITED(raw) {
            ChildStatus::Exited(libc::WEXITSTATUS(raw))
        } else {
            let signal = libc::WIFSIGNALED(raw).then(|| libc::WTERMSIG(raw));
            ChildStatus::Abnormal { raw, signal }
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, ChildStatus::Abnormal { .. })
    }
}

/// Result of one executor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolatedRun {
    pub success: bool,
    pub status: ChildStatus,
}

/// Runs test bodies either in a forked child or, for debugging, in-process.
#[derive(Debug, Clone)]
pub struct CrashSafeExecutor {
    isolation: Isolation,
    capture_dir: Option<PathBuf>,
    flag_prefix: String,
    colors: bool,
}

impl Default for CrashSafeExecutor {
    fn default() -> Self {
        Self::new(&HarnessConfig::default())
    }
}

impl CrashSafeExecutor {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            isolation: config.isolation,
            capture_dir: config.capture_dir.clone(),
            flag_prefix: config.flag_prefix.clone(),
            colors: !config.disable_colors,
        }
    }

    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Run `body` and return whether it passed.
    ///
    /// Failure diagnostics are appended to `diagnostics`.
    pub fn run<F>(&self, diagnostics: &mut ReportBuffer, body: F) -> HarnessResult<bool>
    where
        F: FnOnce(&CrashFlag<'_>),
    {
        self.execute(diagnostics, body).map(|run| run.success)
    }

    /// Run `body` isolated and, only if that passed, run it again in this process.
    ///
    /// The second run exists for its side effects on the caller's state; its flag is not consulted.
    pub fn run_then_apply<F>(&self, diagnostics: &mut ReportBuffer, mut body: F) -> HarnessResult<bool>
    where
        F: FnMut(&CrashFlag<'_>),
    {
        let success = self.run(diagnostics, &mut body)?;
        if success {
            let cell = AtomicBool::new(true);
            body(&CrashFlag::new(&cell));
        }
        Ok(success)
    }

    /// Run `body` and return the outcome together with how it terminated.
    #[tracing::instrument(skip_all, fields(isolation = ?self.isolation))]
    pub fn execute<F>(&self, diagnostics: &mut ReportBuffer, body: F) -> HarnessResult<IsolatedRun>
    where
        F: FnOnce(&CrashFlag<'_>),
    {
        match self.isolation {
            Isolation::Subprocess => self.execute_forked(diagnostics, body),
            Isolation::InProcess => Ok(execute_in_process(diagnostics, body)),
        }
    }

    fn execute_forked<F>(&self, diagnostics: &mut ReportBuffer, body: F) -> HarnessResult<IsolatedRun>
    where
        F: FnOnce(&CrashFlag<'_>),
    {
        // Both guards clean up on drop, which covers every early return below.
        let captures = CaptureFiles::create(self.capture_dir.as_deref())?;
        let flag = SharedFlag::create(&shared_flag::unique_name(&self.flag_prefix), true)?;

        // std's stdout buffer is copied into the child but never flushed there, so pending parent
        // output is not duplicated and the parent does not need the stream lock before forking.
        // SAFETY: the child only touches state created before the fork (capture descriptors and
        // the shared mapping), runs the body, and leaves through `_exit` without unwinding into
        // or returning to harness code.
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(HarnessError::Fork(io::Error::last_os_error()));
        }
        if pid == 0 {
            run_child(&captures, flag.cell(), body);
        }

        tracing::debug!(pid, flag = flag.name(), "forked isolated body");
        let status = wait_for(pid)?;

        let mut success = flag.get();
        if let ChildStatus::Abnormal { raw, signal } = status {
            success = false;
            tracing::warn!(pid, raw, ?signal, "isolated body exited abnormally");
            match signal {
                Some(signal) => diagnostics.cat_fmt(format_args!(
                    "Child exited abnormally with status: {raw} (signal {signal})\n"
                )),
                None => diagnostics.cat_fmt(format_args!("Child exited abnormally with status: {raw}\n")),
            }
        }

        if !success {
            self.append_capture(diagnostics, "stdout:", &captures.read_stdout()?);
            self.append_capture(diagnostics, "stderr:", &captures.read_stderr()?);
        }

        tracing::debug!(pid, ?status, success, "reaped isolated body");
        captures.remove();
        drop(flag);

        Ok(IsolatedRun { success, status })
    }

    fn append_capture(&self, diagnostics: &mut ReportBuffer, label: &str, captured: &str) {
        if captured.is_empty() {
            return;
        }
        diagnostics.cat(&colorize(label, CYAN, self.colors));
        diagnostics.push('\n');
        diagnostics.cat_indented_str(captured, CAPTURE_INDENT);
        if !captured.ends_with('\n') {
            diagnostics.push('\n');
        }
    }
}

fn execute_in_process<F>(diagnostics: &mut ReportBuffer, body: F) -> IsolatedRun
where
    F: FnOnce(&CrashFlag<'_>),
{
    let cell = AtomicBool::new(true);
    let flag = CrashFlag::new(&cell);
    if panic::catch_unwind(AssertUnwindSafe(|| body(&flag))).is_err() {
        flag.fail();
        diagnostics.cat("Body panicked\n");
    }
    IsolatedRun {
        success: flag.get(),
        status: ChildStatus::InProcess,
    }
}

/// Child side of the fork. Never returns.
fn run_child<F>(captures: &CaptureFiles, cell: &AtomicBool, body: F) -> !
where
    F: FnOnce(&CrashFlag<'_>),
{
    let flag = CrashFlag::new(cell);
    if captures.redirect_std_streams().is_err() {
        flag.fail();
        // SAFETY: terminates the child immediately; no harness state is shared back.
        unsafe { libc::_exit(CHILD_SETUP_FAILED) };
    }

    // The default hook locks std's stderr, which another parent thread may have held at fork.
    panic::set_hook(Box::new(|info| {
        let _ = writeln!(RawStream::stderr(), "{info}");
    }));

    let code = match panic::catch_unwind(AssertUnwindSafe(|| body(&flag))) {
        Ok(()) => 0,
        Err(_) => {
            flag.fail();
            CHILD_PANICKED
        }
    };

    // No flush of std's streams here: that would take their locks. See the module docs.
    // SAFETY: `_exit` skips destructors and atexit handlers, so the parent's capture files and
    // shared segment are not removed from the child.
    unsafe { libc::_exit(code) }
}

fn wait_for(pid: libc::pid_t) -> HarnessResult<ChildStatus> {
    let mut raw: libc::c_int = 0;
    loop {
        // SAFETY: `raw` is a valid out-pointer; `pid` is our own child.
        let reaped = unsafe { libc::waitpid(pid, &mut raw, 0) };
        if reaped == pid {
            return Ok(ChildStatus::from_wait_status(raw));
        }
        let source = io::Error::last_os_error();
        if source.kind() != io::ErrorKind::Interrupted {
            return Err(HarnessError::Wait { pid, source });
        }
    }
}
