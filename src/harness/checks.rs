//! Equality checks that close the active test.
//!
//! Each check compares, writes a mismatch description into the active test's diagnostics and
//! pops it with the result.

use std::fmt::Debug;

use super::TestRunner;
use crate::errors::{HarnessError, HarnessResult};

impl TestRunner {
    /// Compare two strings and pop the active test.
    pub fn check_str(&mut self, actual: &str, expected: &str) -> HarnessResult<bool> {
        let success = actual == expected;
        if !success {
            self.active_sink()?
                .cat_fmt(format_args!("Expected: '{expected}'\n     got: '{actual}'\n"));
        }
        self.pop(success)
    }

    /// Like [`check_str`](Self::check_str), but renders both sides escaped so whitespace and control
    /// characters are visible.
    pub fn check_str_escaped(&mut self, actual: &str, expected: &str) -> HarnessResult<bool> {
        let success = actual == expected;
        if !success {
            self.active_sink()?
                .cat_fmt(format_args!("Expected: {expected:?}\n     got: {actual:?}\n"));
        }
        self.pop(success)
    }

    /// Compare any two values and pop the active test.
    pub fn check_eq<T: PartialEq + Debug>(&mut self, actual: T, expected: T) -> HarnessResult<bool> {
        let success = actual == expected;
        if !success {
            self.active_sink()?
                .cat_fmt(format_args!("Expected: {expected:?}\n     got: {actual:?}\n"));
        }
        self.pop(success)
    }

    fn active_sink(&mut self) -> HarnessResult<&mut nestcheck_core::ReportBuffer> {
        let id = self.active().ok_or(HarnessError::EmptyStack)?;
        self.diagnostics(id).ok_or(HarnessError::StaleNode)
    }
}
