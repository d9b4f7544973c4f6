//! Contract tests for the string utilities and the report buffer.
//!
//! The harness only relies on a handful of observable properties of these helpers; this file locks
//! them in across randomly generated inputs.

use nestcheck_core::{ReportBuffer, find_unmatched_close, find_unmatched_open, replace_counted, strip_in_place};
use proptest::prelude::*;

proptest! {
    /// Replacing a needle with itself is the identity and counts every occurrence.
    #[test]
    fn replace_with_self_is_identity(src in "[abX ]{0,40}") {
        let (out, count) = replace_counted(&src, "X", "X");
        prop_assert_eq!(&out, &src);
        prop_assert_eq!(count, src.matches('X').count());
    }

    /// After a replacement the needle no longer occurs when the replacement cannot form it.
    #[test]
    fn replace_removes_needle(src in "[abX]{0,40}") {
        let (out, _) = replace_counted(&src, "X", "");
        prop_assert!(!out.contains('X'));
        prop_assert_eq!(out.len(), src.len() - src.matches('X').count());
    }

    /// Stripping is idempotent.
    #[test]
    fn strip_is_idempotent(src in "[ \ta-c]{0,20}") {
        let mut once = src.clone();
        strip_in_place(&mut once);
        let mut twice = once.clone();
        strip_in_place(&mut twice);
        prop_assert_eq!(once, twice);
    }

    /// A parenthesis reported as found is the right kind of parenthesis.
    #[test]
    fn found_positions_point_at_parens(src in "[()a]{0,30}", k in 0u32..4) {
        let open = find_unmatched_open(&src, src.len(), k);
        if open.found {
            prop_assert_eq!(src.as_bytes()[open.position], b'(');
            prop_assert_eq!(open.unmatched, k);
        } else {
            prop_assert_eq!(open.position, 0);
        }

        let close = find_unmatched_close(&src, 0, k);
        if close.found {
            prop_assert_eq!(src.as_bytes()[close.position], b')');
        } else {
            prop_assert_eq!(close.position, src.len());
        }
    }

    /// Indenting by N adds exactly N columns to every non-empty line.
    #[test]
    fn indentation_adds_columns(lines in prop::collection::vec("[a-z]{1,8}", 0..6), n in 0usize..9) {
        let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let mut buf = ReportBuffer::new();
        buf.cat_indented_str(&text, n);
        prop_assert_eq!(buf.len(), text.len() + n * lines.len());
        for line in buf.as_str().lines() {
            prop_assert!(line.starts_with(&" ".repeat(n)));
        }
    }
}

#[test]
fn zero_k_never_matches_on_any_input() {
    for text in ["", "(", ")", "(()", "())"] {
        assert!(!find_unmatched_open(text, text.len(), 0).found);
        assert!(!find_unmatched_close(text, 0, 0).found);
    }
}
