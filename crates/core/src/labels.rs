// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner capability labels and job label requirements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An unordered set of labels such as `{"linux", "x64"}`.
///
/// Runners advertise one; jobs carry one as their `runs_on` requirement.
/// Labels are trimmed and empty labels are discarded on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every label in `required` is present in `self`.
    ///
    /// An empty requirement is satisfied by every runner.
    pub fn satisfies(&self, required: &LabelSet) -> bool {
        required.0.is_subset(&self.0)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Sorted labels, as sent over the wire.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|label| label.as_ref().trim().to_string())
                .filter(|label| !label.is_empty())
                .collect(),
        )
    }
}

impl std::fmt::Display for LabelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", labels.join(","))
    }
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod tests;
