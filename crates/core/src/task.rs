// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task (execution attempt) records, steps and log bookkeeping.

use crate::id::{JobId, RunnerId, TaskId};
use crate::scope::Scope;
use crate::status::{Status, TaskResult};
use crate::token::SaltedToken;
use serde::{Deserialize, Serialize};

/// Byte limit for task step and runner names.
pub const MAX_NAME_BYTES: usize = 255;

/// One execution attempt of a job by a runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    pub attempt: u32,
    pub runner_id: RunnerId,
    pub status: Status,
    pub scope: Scope,
    pub commit_sha: String,
    pub token: SaltedToken,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at_ms: Option<u64>,
    /// Heartbeat: moved by every update the runner sends.
    pub updated_at_ms: u64,
    pub log: TaskLog,
}

impl Task {
    pub fn is_stopped(&self) -> bool {
        self.stopped_at_ms.is_some()
    }
}

/// Where a task's log lives and how far it has been acknowledged.
///
/// `indexes[i]` is the byte offset of row `i`; `length` is the number of
/// acknowledged rows. Both only grow until `in_storage` is set, after which
/// the log is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub filename: String,
    pub size: u64,
    pub length: u64,
    #[serde(default)]
    pub indexes: Vec<u64>,
    #[serde(default)]
    pub in_storage: bool,
    /// Set by retention cleanup once the archived object is deleted.
    #[serde(default)]
    pub expired: bool,
}

/// One ordered step of a task, materialized at claim time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    pub task_id: TaskId,
    pub index: u32,
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at_ms: Option<u64>,
    #[serde(default)]
    pub log_index: u64,
    #[serde(default)]
    pub log_length: u64,
}

/// Step progress reported by a runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: u32,
    #[serde(default)]
    pub result: TaskResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at_ms: Option<u64>,
    #[serde(default)]
    pub log_index: u64,
    #[serde(default)]
    pub log_length: u64,
}

impl TaskStep {
    /// Fold a runner report into this step.
    ///
    /// A step with a start time but no result is running; a result makes it
    /// terminal.
    pub fn apply_report(&mut self, report: &StepReport) {
        if let Some(status) = report.result.status() {
            self.status = status;
        } else if report.started_at_ms.is_some() {
            self.status = Status::Running;
        }
        self.started_at_ms = report.started_at_ms.or(self.started_at_ms);
        self.stopped_at_ms = report.stopped_at_ms.or(self.stopped_at_ms);
        self.log_index = report.log_index;
        self.log_length = report.log_length;
    }
}

/// Archive object name for a task's log.
///
/// Shards by the low byte of the id: `{owner}/{repo}/{id % 256:02x}/{id}.log`,
/// with `.zst` appended when the archive is zstd-compressed.
pub fn log_filename(scope: &Scope, task_id: TaskId, compressed: bool) -> String {
    let id = task_id.get();
    let mut name = format!("{}/{}/{:02x}/{}.log", scope.owner_id, scope.repo_id, id % 256, id);
    if compressed {
        name.push_str(".zst");
    }
    name
}

/// Truncate to at most `max` bytes on a char boundary.
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
