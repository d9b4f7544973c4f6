//! Report rendering through the public API

use nestcheck::{HarnessConfig, HarnessError, TestRunner, diag, test_push};

fn plain() -> TestRunner {
    TestRunner::new(HarnessConfig::new().with_disable_colors(true))
}

/// Padded name column plus marker, as one report line.
fn line(indent: usize, name: &str, marker: &str) -> String {
    let mut padded = format!("{name} ");
    while padded.chars().count() < 39 {
        padded.push('.');
    }
    format!("{}{padded} {marker}\n", " ".repeat(indent))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn nested_all_pass_renders_root_only() {
    let mut t = plain();
    t.push("A");
    t.push("B");
    assert!(t.pop(true).unwrap());
    assert!(t.parent_pop().unwrap());
    assert_eq!(t.finish(), line(0, "A", "OK"));
}

#[test]
fn failing_child_renders_under_failing_parent() {
    let mut t = plain();
    t.push("A");
    t.push("B");
    t.pop(false).unwrap();
    assert!(!t.parent_pop().unwrap());
    assert_eq!(t.finish(), format!("{}{}", line(0, "A", "FAILED"), line(4, "B", "FAILED")));
}

#[test]
fn name_column_is_forty_wide() {
    let mut t = plain();
    t.push("x");
    t.pop(true).unwrap();
    let report = t.finish();
    assert_eq!(report.find("OK"), Some(40));
}

#[test]
fn long_names_are_not_truncated() {
    let name = "n".repeat(60);
    let mut t = plain();
    t.push(&name);
    t.pop(true).unwrap();
    assert_eq!(t.finish(), format!("{name}  OK\n"));
}

// ============================================================================
// Indentation and filtering
// ============================================================================

#[test]
fn block_indented_by_depth_times_four() {
    let mut t = plain();
    for depth in 0..4 {
        test_push!(t, "level {depth}");
    }
    t.pop(false).unwrap();
    for _ in 0..3 {
        t.parent_pop().unwrap();
    }
    let report = t.finish();
    for (depth, text) in report.lines().enumerate() {
        let leading = text.len() - text.trim_start().len();
        assert_eq!(leading, depth * 4, "line {text:?}");
        assert!(text.trim_start().starts_with(&format!("level {depth} ")));
    }
}

#[test]
fn failing_descendant_shown_through_failing_ancestors() {
    let mut t = plain();
    t.push("root");
    t.push("passing sibling");
    t.push("hidden grandchild");
    t.pop(true).unwrap();
    t.parent_pop().unwrap();
    t.push("mid");
    let leaf = t.push("leaf");
    diag!(t, leaf, "boom\n");
    t.pop(false).unwrap();
    t.parent_pop().unwrap();
    assert!(!t.parent_pop().unwrap());

    let report = t.finish();
    assert!(report.contains(&line(4, "passing sibling", "OK")));
    assert!(!report.contains("hidden grandchild"));
    assert!(report.contains(&line(4, "mid", "FAILED")));
    assert!(report.contains(&format!("{}            boom\n", line(8, "leaf", "FAILED"))));
}

#[test]
fn failing_test_without_children_shows_only_its_error() {
    let mut t = plain();
    let id = t.push("solo");
    diag!(t, id, "first\n");
    diag!(t, id, "second\n");
    t.pop(false).unwrap();
    assert_eq!(
        t.finish(),
        format!("{}    first\n    second\n", line(0, "solo", "FAILED"))
    );
}

#[test]
fn blank_diagnostic_lines_are_indented_too() {
    let mut t = plain();
    t.push("outer");
    let id = t.push("inner");
    diag!(t, id, "above\n\nbelow\n");
    t.pop(false).unwrap();
    t.parent_pop().unwrap();
    let expected = format!(
        "{}{}        above\n        \n        below\n",
        line(0, "outer", "FAILED"),
        line(4, "inner", "FAILED")
    );
    assert_eq!(t.finish(), expected);
}

#[test]
fn stale_handle_does_not_write_into_recycled_node() {
    let mut t = plain();
    let old = t.push("old");
    t.pop(true).unwrap();
    let new = t.push("new");
    diag!(t, old, "leaked\n");
    assert_ne!(old, new);
    t.pop(false).unwrap();
    assert!(!t.finish().contains("leaked"));
}

#[test]
fn run_isolated_with_stale_handle_errors() {
    let mut t = plain();
    let old = t.push("old");
    t.pop(true).unwrap();
    assert!(matches!(t.run_isolated(old, |_| {}), Err(HarnessError::StaleNode)));
}

// ============================================================================
// Colors
// ============================================================================

#[test]
fn colored_report_strips_to_plain() {
    let build = |colors: bool| {
        let mut t = TestRunner::new(HarnessConfig::new().with_disable_colors(!colors));
        t.push("A");
        t.push("B");
        t.pop(false).unwrap();
        t.parent_pop().unwrap();
        t.finish()
    };
    let colored = build(true);
    assert!(colored.contains("\x1b[1;31mFAILED\x1b[0m"));
    assert_eq!(nestcheck::harness::render::strip_ansi(&colored), build(false));
}
