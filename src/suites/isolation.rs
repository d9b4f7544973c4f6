//! Crash-safe executor suite.
//!
//! Bodies that are expected to fail run against a scratch diagnostics buffer, so an expected
//! failure does not leak its captured output into the report. The scratch text is only copied
//! into the test when the expectation does not hold.

use std::fs;
use std::io::Write;
use std::path::Path;

use nestcheck_core::ReportBuffer;

use crate::diag;
use crate::errors::HarnessResult;
use crate::harness::{Isolation, NodeId, TestRunner};
use crate::isolation::CrashFlag;

const CAPTURE_PREFIX: &str = "nestcheck-std";

pub fn isolation_tests(t: &mut TestRunner) -> HarnessResult<bool> {
    t.push("Crash-safe execution");
    let executor = t.executor().clone();
    let forked = executor.isolation() == Isolation::Subprocess;
    let capture_dir = t.config().capture_dir.clone().unwrap_or_else(std::env::temp_dir);
    let leftovers_before = capture_files_in(&capture_dir);

    {
        let node = t.push("clean exit passes");
        let success = t.run_isolated(node, |_| {})?;
        t.pop(success)?;
    }

    {
        let node = t.push("cleared flag fails");
        let mut scratch = ReportBuffer::new();
        let success = executor.run(&mut scratch, |flag| flag.fail())?;
        expect_outcome(t, node, &scratch, !success, "body passed")?;
    }

    {
        let node = t.push("panic fails");
        let mut scratch = ReportBuffer::new();
        let success = executor.run(&mut scratch, |_| panic!("deliberate panic"))?;
        expect_outcome(t, node, &scratch, !success, "panicking body passed")?;
    }

    if forked {
        {
            let node = t.push("abort detected");
            let mut scratch = ReportBuffer::new();
            // SAFETY: runs in the forked child; aborting only terminates that process.
            let run = executor.execute(&mut scratch, |_| unsafe { libc::abort() })?;
            let described = scratch.as_str().contains("exited abnormally");
            let holds = !run.success && run.status.is_abnormal() && described;
            expect_outcome(t, node, &scratch, holds, "abort not reported")?;
        }

        {
            let node = t.push("output captured on failure");
            let mut scratch = ReportBuffer::new();
            let success = executor.run(&mut scratch, |flag| {
                let _ = writeln!(flag.stdout(), "captured line");
                let _ = writeln!(flag.stderr(), "captured error");
                flag.fail();
            })?;
            let text = scratch.as_str();
            let captured = text.contains("captured line") && text.contains("captured error");
            expect_outcome(t, node, &scratch, !success && captured, "output missing")?;
        }

        {
            let node = t.push("partial line kept across crash");
            let mut scratch = ReportBuffer::new();
            let success = executor.run(&mut scratch, |flag| {
                let _ = write!(flag.stdout(), "partial before crash");
                // SAFETY: runs in the forked child; aborting only terminates that process.
                unsafe { libc::abort() }
            })?;
            let kept = scratch.as_str().contains("stdout:\n  partial before crash\n");
            expect_outcome(t, node, &scratch, !success && kept, "partial line lost")?;
        }

        {
            let node = t.push("output ignored on success");
            let mut scratch = ReportBuffer::new();
            let success = executor.run(&mut scratch, |flag| {
                let _ = writeln!(flag.stdout(), "not shown");
            })?;
            expect_outcome(t, node, &scratch, success && scratch.is_empty(), "unexpected output")?;
        }
    }

    {
        let node = t.push("then-apply");
        let mut applied = 0;
        let success = t.run_isolated_then_apply(node, |_: &CrashFlag<'_>| applied += 1)?;
        // A forked run increments a copy; only the in-parent run is visible here.
        let expected = if forked { 1 } else { 2 };
        if applied != expected {
            diag!(t, node, "Expected {expected} visible runs, got {applied}\n");
        }
        t.pop(success && applied == expected)?;
    }

    {
        let node = t.push("then-apply skipped on failure");
        let mut scratch = ReportBuffer::new();
        let mut applied = 0;
        let success = executor.run_then_apply(&mut scratch, |flag: &CrashFlag<'_>| {
            applied += 1;
            flag.fail();
        })?;
        let expected = if forked { 0 } else { 1 };
        expect_outcome(t, node, &scratch, !success && applied == expected, "body was applied")?;
    }

    if forked {
        let node = t.push("no capture files left");
        let leftovers = capture_files_in(&capture_dir);
        if leftovers > leftovers_before {
            let leaked = leftovers - leftovers_before;
            diag!(t, node, "{leaked} capture files left in {}\n", capture_dir.display());
        }
        t.pop(leftovers <= leftovers_before)?;
    }

    t.parent_pop()
}

/// Pop `node` with `holds`; when it does not hold, attach `what` and the scratch diagnostics.
fn expect_outcome(
    t: &mut TestRunner,
    node: NodeId,
    scratch: &ReportBuffer,
    holds: bool,
    what: &str,
) -> HarnessResult<bool> {
    if !holds {
        if let Some(sink) = t.diagnostics(node) {
            sink.cat(what);
            sink.push('\n');
            sink.cat_buffer(scratch);
        }
    }
    t.pop(holds)
}

fn capture_files_in(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|entry| entry.file_name().to_string_lossy().starts_with(CAPTURE_PREFIX))
                .count()
        })
        .unwrap_or(0)
}
