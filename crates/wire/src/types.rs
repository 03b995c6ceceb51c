// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload types shared by requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use drover_core::{
    JobId, RunId, RunnerId, Scope, Status, StepReport, TaskId, TaskResult,
};
use serde::{Deserialize, Serialize};

/// Credentials every runner call carries.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerAuth {
    pub uuid: String,
    pub token: String,
}

impl std::fmt::Debug for RunnerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerAuth").field("uuid", &self.uuid).field("token", &"<redacted>").finish()
    }
}

/// A runner as echoed back to it. `token` is only set by `Register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerInfo {
    pub id: RunnerId,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Result and outputs of a needed job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NeedInfo {
    pub result: TaskResult,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
}

/// Work handed to a runner by `FetchTask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: TaskId,
    pub token: String,
    pub job_id: JobId,
    pub run_id: RunId,
    pub job_key: String,
    pub job_name: String,
    pub attempt: u32,
    pub scope: Scope,
    pub commit_sha: String,
    pub payload: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub needs: BTreeMap<String, NeedInfo>,
}

/// What an in-job caller learns from its task token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskContextInfo {
    pub task_id: TaskId,
    pub job_id: JobId,
    pub run_id: RunId,
    pub attempt: u32,
    pub scope: Scope,
    pub commit_sha: String,
}

/// A runner's report on one task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskState {
    pub id: TaskId,
    #[serde(default)]
    pub result: TaskResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at_ms: Option<u64>,
    #[serde(default)]
    pub steps: Vec<StepReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub time: DateTime<Utc>,
    pub content: String,
}

/// Schedule definition for `CreateSchedules`; `payload` is a JSON array
/// of job definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub title: String,
    pub scope: Scope,
    pub workflow_id: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub commit_sha: String,
    pub specs: Vec<String>,
    #[serde(default)]
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobEntry {
    pub id: JobId,
    pub key: String,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunInfo {
    pub id: RunId,
    pub status: Status,
    pub jobs: Vec<JobEntry>,
}

/// Daemon counters reported by `Status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusInfo {
    pub uptime_secs: u64,
    pub runners: usize,
    pub runs: usize,
    pub waiting_jobs: usize,
    pub blocked_jobs: usize,
    pub running_tasks: usize,
    pub schedules: usize,
}
