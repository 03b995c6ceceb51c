// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    waiting   = { Status::Waiting, false },
    blocked   = { Status::Blocked, false },
    running   = { Status::Running, false },
    success   = { Status::Success, true },
    failure   = { Status::Failure, true },
    cancelled = { Status::Cancelled, true },
    skipped   = { Status::Skipped, true },
)]
fn terminal_statuses(status: Status, done: bool) {
    assert_eq!(status.is_done(), done);
}

#[yare::parameterized(
    unspecified = { TaskResult::Unspecified, None },
    success     = { TaskResult::Success, Some(Status::Success) },
    failure     = { TaskResult::Failure, Some(Status::Failure) },
    cancelled   = { TaskResult::Cancelled, Some(Status::Cancelled) },
    skipped     = { TaskResult::Skipped, Some(Status::Skipped) },
)]
fn result_maps_to_status(result: TaskResult, status: Option<Status>) {
    assert_eq!(result.status(), status);
    if let Some(status) = status {
        assert_eq!(status.as_result(), result);
    }
}

#[test]
fn running_status_reports_unspecified() {
    assert_eq!(Status::Running.as_result(), TaskResult::Unspecified);
}

#[test]
fn status_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&Status::Cancelled).unwrap(), "\"cancelled\"");
    assert_eq!(Status::Blocked.to_string(), "blocked");
}

#[yare::parameterized(
    empty              = { &[], Status::Waiting },
    all_success        = { &[Status::Success, Status::Success], Status::Success },
    success_and_skip   = { &[Status::Success, Status::Skipped], Status::Success },
    all_skipped        = { &[Status::Skipped, Status::Skipped], Status::Skipped },
    failure_wins       = { &[Status::Success, Status::Failure, Status::Cancelled], Status::Failure },
    cancelled          = { &[Status::Success, Status::Cancelled], Status::Cancelled },
    running_dominates  = { &[Status::Failure, Status::Running, Status::Blocked], Status::Running },
    waiting_over_block = { &[Status::Success, Status::Blocked, Status::Waiting], Status::Waiting },
    blocked            = { &[Status::Success, Status::Blocked], Status::Blocked },
)]
fn aggregate(statuses: &[Status], expected: Status) {
    assert_eq!(aggregate_status(statuses.iter().copied()), expected);
}
