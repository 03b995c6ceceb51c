// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job, task and step status state machine.

use serde::{Deserialize, Serialize};

/// Status shared by jobs, tasks and task steps.
///
/// Jobs move `blocked → waiting → running → {success, failure, cancelled}`;
/// `skipped` is reached when a dependency did not succeed. Tasks are
/// created `running` and only ever move to a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Waiting,
    Blocked,
    Running,
    Success,
    Failure,
    Cancelled,
    Skipped,
}

impl Status {
    /// Terminal statuses never change again (short of a requeue).
    pub fn is_done(self) -> bool {
        matches!(self, Status::Success | Status::Failure | Status::Cancelled | Status::Skipped)
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Statuses the abandoned-job sweep looks at.
    pub fn is_unclaimed(self) -> bool {
        matches!(self, Status::Waiting | Status::Blocked)
    }

    /// The result reported back to runners for this status.
    pub fn as_result(self) -> TaskResult {
        match self {
            Status::Success => TaskResult::Success,
            Status::Failure => TaskResult::Failure,
            Status::Cancelled => TaskResult::Cancelled,
            Status::Skipped => TaskResult::Skipped,
            Status::Waiting | Status::Blocked | Status::Running => TaskResult::Unspecified,
        }
    }
}

crate::simple_display! {
    Status {
        Waiting => "waiting",
        Blocked => "blocked",
        Running => "running",
        Success => "success",
        Failure => "failure",
        Cancelled => "cancelled",
        Skipped => "skipped",
    }
}

/// Result a runner reports for a task or step.
///
/// `Unspecified` means "still running" and is what heartbeats carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResult {
    #[default]
    Unspecified,
    Success,
    Failure,
    Cancelled,
    Skipped,
}

impl TaskResult {
    /// The terminal status this result maps to, if any.
    pub fn status(self) -> Option<Status> {
        match self {
            TaskResult::Unspecified => None,
            TaskResult::Success => Some(Status::Success),
            TaskResult::Failure => Some(Status::Failure),
            TaskResult::Cancelled => Some(Status::Cancelled),
            TaskResult::Skipped => Some(Status::Skipped),
        }
    }
}

crate::simple_display! {
    TaskResult {
        Unspecified => "unspecified",
        Success => "success",
        Failure => "failure",
        Cancelled => "cancelled",
        Skipped => "skipped",
    }
}

/// Fold job statuses into one run status.
///
/// Any unfinished job keeps the run unfinished (`running` beats `waiting`
/// beats `blocked`). Once every job is done: any failure wins, then any
/// cancellation; a run of only skipped jobs is skipped, otherwise success.
pub fn aggregate_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let (mut all_skipped, mut any) = (true, false);
    let (mut running, mut waiting, mut blocked) = (false, false, false);
    let (mut failure, mut cancelled) = (false, false);
    for status in statuses {
        any = true;
        all_skipped &= status == Status::Skipped;
        match status {
            Status::Running => running = true,
            Status::Waiting => waiting = true,
            Status::Blocked => blocked = true,
            Status::Failure => failure = true,
            Status::Cancelled => cancelled = true,
            Status::Success | Status::Skipped => {}
        }
    }
    if !any {
        return Status::Waiting;
    }
    if running {
        Status::Running
    } else if waiting {
        Status::Waiting
    } else if blocked {
        Status::Blocked
    } else if failure {
        Status::Failure
    } else if cancelled {
        Status::Cancelled
    } else if all_skipped {
        Status::Skipped
    } else {
        Status::Success
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
