// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::JobFixture;

#[test]
fn builder_defaults() {
    let spec = JobSpec::builder("build").build();
    assert_eq!(spec.name, "build");
    assert_eq!(spec.max_attempts, 1);
    assert!(spec.needs.is_empty());
}

#[test]
fn builder_clamps_zero_attempts() {
    let spec = JobSpec::builder("build").max_attempts(0).build();
    assert_eq!(spec.max_attempts, 1);
}

#[test]
fn spec_deserializes_with_defaults() {
    let spec: JobSpec = serde_json::from_str(r#"{"key":"k","name":"n"}"#).unwrap();
    assert_eq!(spec.max_attempts, 1);
    assert!(spec.runs_on.is_empty());
}

#[test]
fn claimable_only_when_waiting_and_unassigned() {
    let mut job = JobFixture::waiting(1).build();
    assert!(job.is_claimable());

    job.task_id = TaskId::new(9);
    assert!(!job.is_claimable());

    job.task_id = TaskId::NONE;
    job.status = Status::Blocked;
    assert!(!job.is_claimable());
}

#[test]
fn runs_on_uses_label_subset() {
    let job = JobFixture::waiting(1).runs_on(&["ubuntu"]).build();
    assert!(job.runs_on(&["ubuntu", "x64"].iter().collect()));
    assert!(!job.runs_on(&["windows"].iter().collect()));
}

#[test]
fn attempts_left() {
    let mut job = JobFixture::waiting(1).max_attempts(2).build();
    job.attempt = 1;
    assert!(job.has_attempts_left());
    job.attempt = 2;
    assert!(!job.has_attempts_left());
}
