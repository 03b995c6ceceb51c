// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::{OwnerId, RepoId};

fn step() -> TaskStep {
    TaskStep {
        task_id: TaskId::new(1),
        index: 0,
        name: "checkout".into(),
        status: Status::Waiting,
        started_at_ms: None,
        stopped_at_ms: None,
        log_index: 0,
        log_length: 0,
    }
}

#[test]
fn log_filename_shards_by_low_byte() {
    let scope = Scope::repo(OwnerId::new(2), RepoId::new(7));
    assert_eq!(log_filename(&scope, TaskId::new(258), false), "2/7/02/258.log");
    assert_eq!(log_filename(&scope, TaskId::new(255), true), "2/7/ff/255.log.zst");
}

#[yare::parameterized(
    short      = { "build", 255, "build" },
    exact      = { "abc", 3, "abc" },
    ascii_cut  = { "abcdef", 4, "abcd" },
    multibyte  = { "aé", 2, "a" },
)]
fn truncate(input: &str, max: usize, expected: &str) {
    assert_eq!(truncate_name(input, max), expected);
}

#[test]
fn report_with_start_marks_running() {
    let mut s = step();
    s.apply_report(&StepReport { index: 0, started_at_ms: Some(5), ..Default::default() });
    assert_eq!(s.status, Status::Running);
    assert_eq!(s.started_at_ms, Some(5));
}

#[test]
fn report_with_result_is_terminal() {
    let mut s = step();
    s.apply_report(&StepReport {
        index: 0,
        result: TaskResult::Failure,
        started_at_ms: Some(5),
        stopped_at_ms: Some(9),
        log_index: 3,
        log_length: 4,
    });
    assert_eq!(s.status, Status::Failure);
    assert_eq!(s.stopped_at_ms, Some(9));
    assert_eq!((s.log_index, s.log_length), (3, 4));
}

#[test]
fn report_without_times_keeps_previous() {
    let mut s = step();
    s.started_at_ms = Some(1);
    s.apply_report(&StepReport { index: 0, ..Default::default() });
    assert_eq!(s.started_at_ms, Some(1));
    assert_eq!(s.status, Status::Waiting);
}
