// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Facts recorded in the write-ahead log.
//!
//! Every store transaction commits as a batch of these events. Replaying
//! the log in order through `MaterializedState::apply_event` rebuilds the
//! state, so every event carries absolute values (never "increment by one")
//! and applying one twice has the same effect as applying it once.

use crate::id::{JobId, RepoId, RunnerId, SpecId, TaskId};
use crate::job::{Job, Run};
use crate::labels::LabelSet;
use crate::runner::{RegistrationToken, Runner};
use crate::schedule::{Schedule, ScheduleSpec};
use crate::scope::ScopeKey;
use crate::status::Status;
use crate::task::{StepReport, Task, TaskStep};
use serde::{Deserialize, Serialize};

/// Serializes with `{"type": "entity:verb", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "registration:issued")]
    RegistrationIssued { token: RegistrationToken },

    #[serde(rename = "registration:used")]
    RegistrationUsed { token: String, at_ms: u64 },

    #[serde(rename = "runner:registered")]
    RunnerRegistered { runner: Runner },

    #[serde(rename = "runner:declared")]
    RunnerDeclared { id: RunnerId, labels: LabelSet, version: String, at_ms: u64 },

    #[serde(rename = "run:created")]
    RunCreated { run: Run, jobs: Vec<Job> },

    #[serde(rename = "tasks_version:set")]
    TasksVersionSet { key: ScopeKey, version: u64 },

    /// The claim: job moves to `running` with `task_id = task.id`, the task
    /// and its steps come into existence.
    #[serde(rename = "job:claimed")]
    JobClaimed { task: Task, steps: Vec<TaskStep> },

    /// Job status change. With `expected_task` set it only applies while the
    /// job is still held by that task.
    #[serde(rename = "job:status")]
    JobStatusChanged {
        id: JobId,
        status: Status,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_task: Option<TaskId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stopped_at_ms: Option<u64>,
        at_ms: u64,
    },

    /// Release a job held by `expected_task` back to the queue.
    #[serde(rename = "job:requeued")]
    JobRequeued { id: JobId, expected_task: TaskId, at_ms: u64 },

    #[serde(rename = "task:state")]
    TaskStateUpdated {
        id: TaskId,
        status: Status,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stopped_at_ms: Option<u64>,
        at_ms: u64,
    },

    #[serde(rename = "task:steps")]
    TaskStepsReported { id: TaskId, reports: Vec<StepReport> },

    #[serde(rename = "task:output")]
    TaskOutputRecorded { id: TaskId, key: String, value: String },

    /// Rows appended to a live log. Applies only while the task's log
    /// length still equals `start_length`. Counts as task activity.
    #[serde(rename = "task:log_appended")]
    TaskLogAppended { id: TaskId, start_length: u64, offsets: Vec<u64>, size: u64, at_ms: u64 },

    #[serde(rename = "task:log_archived")]
    TaskLogArchived { id: TaskId },

    #[serde(rename = "task:log_expired")]
    TaskLogExpired { id: TaskId },

    #[serde(rename = "schedule:created")]
    ScheduleCreated { schedule: Schedule, specs: Vec<ScheduleSpec> },

    #[serde(rename = "schedule:spec_advanced")]
    ScheduleSpecAdvanced { id: SpecId, next_ms: u64 },

    #[serde(rename = "schedule:deleted")]
    SchedulesDeleted { repo_id: RepoId },
}

impl Event {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Event::RegistrationIssued { .. } => "registration:issued",
            Event::RegistrationUsed { .. } => "registration:used",
            Event::RunnerRegistered { .. } => "runner:registered",
            Event::RunnerDeclared { .. } => "runner:declared",
            Event::RunCreated { .. } => "run:created",
            Event::TasksVersionSet { .. } => "tasks_version:set",
            Event::JobClaimed { .. } => "job:claimed",
            Event::JobStatusChanged { .. } => "job:status",
            Event::JobRequeued { .. } => "job:requeued",
            Event::TaskStateUpdated { .. } => "task:state",
            Event::TaskStepsReported { .. } => "task:steps",
            Event::TaskOutputRecorded { .. } => "task:output",
            Event::TaskLogAppended { .. } => "task:log_appended",
            Event::TaskLogArchived { .. } => "task:log_archived",
            Event::TaskLogExpired { .. } => "task:log_expired",
            Event::ScheduleCreated { .. } => "schedule:created",
            Event::ScheduleSpecAdvanced { .. } => "schedule:spec_advanced",
            Event::SchedulesDeleted { .. } => "schedule:deleted",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
