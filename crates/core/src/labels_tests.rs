// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

fn set(labels: &[&str]) -> LabelSet {
    labels.iter().collect()
}

#[yare::parameterized(
    exact_match       = { &["ubuntu"], &["ubuntu"], true },
    superset          = { &["ubuntu", "x64"], &["ubuntu"], true },
    missing_label     = { &["windows", "x64"], &["ubuntu"], false },
    empty_requirement = { &["ubuntu"], &[], true },
    empty_runner      = { &[], &["ubuntu"], false },
    partial_overlap   = { &["ubuntu"], &["ubuntu", "gpu"], false },
)]
fn runner_satisfies_requirement(runner: &[&str], required: &[&str], expected: bool) {
    assert_eq!(set(runner).satisfies(&set(required)), expected);
}

#[test]
fn labels_are_trimmed_and_deduplicated() {
    let labels = set(&[" linux ", "linux", "", "x64"]);
    assert_eq!(labels.to_vec(), vec!["linux".to_string(), "x64".to_string()]);
}

#[test]
fn display_is_sorted() {
    assert_eq!(set(&["x64", "arm"]).to_string(), "[arm,x64]");
}

proptest! {
    #[test]
    fn subset_requirement_always_matches(
        labels in proptest::collection::btree_set("[a-z]{1,6}", 0..8),
        take in 0usize..8,
    ) {
        let runner: LabelSet = labels.iter().collect();
        let required: LabelSet = labels.iter().take(take).collect();
        prop_assert!(runner.satisfies(&required));
    }

    #[test]
    fn label_outside_runner_set_never_matches(
        labels in proptest::collection::btree_set("[a-z]{1,6}", 0..8),
    ) {
        let runner: LabelSet = labels.iter().collect();
        let required = set(&["NOT-A-LABEL"]);
        prop_assert!(!runner.satisfies(&required));
    }
}
