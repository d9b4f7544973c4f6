//! Property-based tests for report aggregation
//!
//! These tests use proptest to verify invariants across many randomly
//! generated push/pop sequences.

use nestcheck::{HarnessConfig, TestRunner};
use proptest::prelude::*;

/// A generated test tree: a name, an outcome for leaves, and children.
#[derive(Debug, Clone)]
struct Tree {
    passed: bool,
    children: Vec<Tree>,
}

fn tree() -> impl Strategy<Value = Tree> {
    let leaf = any::<bool>().prop_map(|passed| Tree {
        passed,
        children: Vec::new(),
    });
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec(inner, 1..4).prop_map(|children| Tree {
            passed: true,
            children,
        })
    })
}

/// Run `tree` through `t`; leaves pop with their outcome, inner nodes with `parent_pop`.
/// `counter` numbers the pushed tests in push order.
fn run(t: &mut TestRunner, tree: &Tree, counter: &mut usize) -> bool {
    let name = format!("t{counter}");
    *counter += 1;
    t.push(name);
    if tree.children.is_empty() {
        return t.pop(tree.passed).unwrap();
    }
    for child in &tree.children {
        run(t, child, counter);
    }
    t.parent_pop().unwrap()
}

fn all_passing(tree: &Tree) -> Tree {
    Tree {
        passed: true,
        children: tree.children.iter().map(all_passing).collect(),
    }
}

fn expected(tree: &Tree) -> bool {
    if tree.children.is_empty() {
        tree.passed
    } else {
        tree.children.iter().all(expected)
    }
}

fn plain(show_all: bool) -> TestRunner {
    TestRunner::new(
        HarnessConfig::new()
            .with_disable_colors(true)
            .with_show_all_children(show_all),
    )
}

// =============================================================================
// Aggregation
// =============================================================================

proptest! {
    /// Property: parent_pop passes exactly when every descendant leaf passed
    #[test]
    fn parent_pop_is_and_of_children(tree in tree()) {
        let mut t = plain(false);
        let mut counter = 0;
        prop_assert_eq!(run(&mut t, &tree, &mut counter), expected(&tree));
        prop_assert!(t.is_idle());
    }

    /// Property: one failing child anywhere among N passing ones fails the parent
    #[test]
    fn single_failure_anywhere_fails_parent(n in 1usize..8, bad in 0usize..8) {
        let mut t = plain(false);
        t.push("parent");
        for i in 0..n {
            t.push(format!("child {i}"));
            t.pop(i != bad).unwrap();
        }
        prop_assert_eq!(t.parent_pop().unwrap(), bad >= n);
    }
}

// =============================================================================
// Rendering
// =============================================================================

proptest! {
    /// Property: with show-all, every pushed test appears on exactly one line with a marker,
    /// indented by four columns per level
    #[test]
    fn show_all_renders_one_line_per_test(tree in tree()) {
        let mut t = plain(true);
        let mut counter = 0;
        run(&mut t, &tree, &mut counter);
        let report = t.finish();

        let lines: Vec<&str> = report.lines().collect();
        prop_assert_eq!(lines.len(), counter);
        for (i, text) in lines.iter().enumerate() {
            let body = text.trim_start();
            prop_assert!(body.starts_with(&format!("t{i} ")), "line {:?}", text);
            prop_assert!(body.ends_with(" OK") || body.ends_with(" FAILED"));
            prop_assert_eq!((text.len() - body.len()) % 4, 0);
        }
    }

    /// Property: a passing root without show-all collapses to a single line
    #[test]
    fn passing_tree_collapses(tree in tree()) {
        let tree = all_passing(&tree);
        let mut t = plain(false);
        let mut counter = 0;
        run(&mut t, &tree, &mut counter);
        prop_assert_eq!(t.finish().lines().count(), 1);
    }
}
