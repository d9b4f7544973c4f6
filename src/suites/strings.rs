//! String utility suite.

use nestcheck_core::{
    ReportBuffer, find_unmatched_close, find_unmatched_open, replace_counted, rstrip_in_place,
    strip_in_place,
};

use crate::diag;
use crate::errors::HarnessResult;
use crate::harness::TestRunner;

pub fn string_tests(t: &mut TestRunner) -> HarnessResult<bool> {
    t.push("String");

    {
        t.push("set/cat print-like");
        let mut buf = ReportBuffer::new();
        buf.set_fmt(format_args!("{}, and '{}', plus {}", 120, "FOO", 'o'));
        buf.cat_fmt(format_args!(", some appended text {}", 44));
        t.check_str(buf.as_str(), "120, and 'FOO', plus o, some appended text 44")?;
    }

    replace_test(
        t,
        "Simple replacement",
        "some X random string X",
        "X",
        "random",
        "some random random string random",
        2,
    )?;
    replace_test(
        t,
        "Replace to empty string (delete)",
        "some teDELETEMEst with deletemeDELETEME",
        "DELETEME",
        "",
        "some test with deleteme",
        2,
    )?;
    replace_test(t, "Not found", "a string", "other stuff", "", "a string", 0)?;

    t.push("rstrip");
    for (name, input, expected) in [
        ("normal usage", "  Hey there    ", "  Hey there"),
        ("all spaces", "    ", ""),
        ("empty string", "", ""),
        ("no spaces", "something", "something"),
    ] {
        let mut s = input.to_string();
        rstrip_in_place(&mut s);
        t.push(name);
        t.check_str(&s, expected)?;
    }
    t.parent_pop()?;

    t.push("strip");
    for (name, input, expected) in [
        ("normal usage", "  Hey there    ", "Hey there"),
        ("all spaces", "    ", ""),
        ("empty string", "", ""),
        ("no spaces", "something", "something"),
        ("tabs and newlines", "\t line \n", "line"),
    ] {
        let mut s = input.to_string();
        strip_in_place(&mut s);
        t.push(name);
        t.check_str_escaped(&s, expected)?;
    }
    t.parent_pop()?;

    paren_tests(t)?;

    t.parent_pop()
}

fn replace_test(
    t: &mut TestRunner,
    name: &str,
    src: &str,
    find: &str,
    replace: &str,
    expected: &str,
    expected_replacements: usize,
) -> HarnessResult<bool> {
    let node = t.push(name);
    let (res, replacements) = replace_counted(src, find, replace);
    let success = res == expected && replacements == expected_replacements;
    if !success {
        diag!(t, node, "String replacement:\n");
        diag!(t, node, " src: '{src}'\n");
        diag!(t, node, " find: '{find}'\n");
        diag!(t, node, " replace: '{replace}'\n\n");
        diag!(t, node, "Expected: '{expected}'\n     got: '{res}'\n");
        diag!(
            t,
            node,
            "Expected replacements: {expected_replacements}\n                  got: {replacements}\n"
        );
    }
    t.pop(success)
}

fn paren_tests(t: &mut TestRunner) -> HarnessResult<bool> {
    t.push("Parenthesis scan");

    let text = "f(a, (b), c";
    t.push("open skips balanced pair");
    let scan = find_unmatched_open(text, text.len(), 1);
    t.check_eq((scan.found, scan.position), (true, 1))?;

    t.push("open second level");
    let text = "((x) (y";
    let scan = find_unmatched_open(text, text.len(), 2);
    t.check_eq((scan.found, scan.position, scan.unmatched), (true, 0, 2))?;

    t.push("open not found");
    let scan = find_unmatched_open("(a) b", 5, 1);
    t.check_eq((scan.found, scan.position), (false, 0))?;

    t.push("close skips balanced pair");
    let text = "a, (b), c) d";
    let scan = find_unmatched_close(text, 0, 1);
    t.check_eq((scan.found, scan.position), (true, 9))?;

    t.push("close not found");
    let text = "(a) b";
    let scan = find_unmatched_close(text, 0, 1);
    t.check_eq((scan.found, scan.position), (false, text.len()))?;

    t.push("k of zero never matches");
    let open = find_unmatched_open("(", 1, 0);
    let close = find_unmatched_close(")", 0, 0);
    t.check_eq((open.found, close.found), (false, false))?;

    t.parent_pop()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::harness::HarnessConfig;

    #[test]
    fn test_string_suite_passes() {
        let mut t = TestRunner::new(HarnessConfig::new().with_disable_colors(true));
        assert!(string_tests(&mut t).unwrap());
        assert!(t.is_idle());
        assert!(t.report().starts_with("String "));
        assert!(t.report().trim_end().ends_with("OK"));
    }

    #[test]
    fn test_failing_replacement_describes_inputs() {
        let mut t = TestRunner::new(HarnessConfig::new().with_disable_colors(true));
        assert!(!replace_test(&mut t, "wrong", "aXb", "X", "-", "a+b", 1).unwrap());
        let report = t.report();
        assert!(report.contains("    Expected: 'a+b'\n         got: 'a-b'\n"));
        assert!(report.contains(" find: 'X'"));
    }
}
