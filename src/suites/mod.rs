//! Built-in self-test suites.
//!
//! Each suite opens one root test and reports through the given [`TestRunner`]. Suites only
//! return `Err` for harness faults; failing checks end up in the report.

pub mod isolation;
pub mod strings;

use crate::errors::HarnessResult;
use crate::harness::TestRunner;

/// Which built-in suites to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Suite {
    /// String utilities and the report buffer
    Strings,
    /// Crash-safe execution
    Isolation,
    /// Every suite
    #[default]
    All,
}

/// Run `suite` and return whether every root test it opened passed.
pub fn run_suite(t: &mut TestRunner, suite: Suite) -> HarnessResult<bool> {
    match suite {
        Suite::Strings => strings::string_tests(t),
        Suite::Isolation => isolation::isolation_tests(t),
        Suite::All => {
            let strings = strings::string_tests(t)?;
            let isolation = isolation::isolation_tests(t)?;
            Ok(strings && isolation)
        }
    }
}
