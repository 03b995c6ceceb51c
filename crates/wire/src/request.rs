// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use drover_core::{JobSpec, RepoId, Scope, TaskId};
use serde::{Deserialize, Serialize};

use super::{LogLine, RunnerAuth, ScheduleRequest, TaskState};

/// Request from a runner or an administrator to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    // ── Runner calls ─────────────────────────────────────────────────────
    Register {
        token: String,
        name: String,
        #[serde(default)]
        version: String,
        #[serde(default)]
        labels: Vec<String>,
    },

    Declare {
        auth: RunnerAuth,
        #[serde(default)]
        labels: Vec<String>,
        #[serde(default)]
        version: String,
    },

    /// Poll for work. `tasks_version` is the last version the runner saw.
    FetchTask {
        auth: RunnerAuth,
        #[serde(default)]
        tasks_version: u64,
    },

    UpdateTask {
        auth: RunnerAuth,
        state: TaskState,
        #[serde(default)]
        outputs: BTreeMap<String, String>,
    },

    UpdateLog {
        auth: RunnerAuth,
        task_id: TaskId,
        #[serde(default)]
        rows: Vec<LogLine>,
        #[serde(default)]
        index: u64,
        #[serde(default)]
        no_more: bool,
    },

    /// Resolve a task token held by a running job to its identity.
    TaskContext { token: String },

    // ── Admin calls (local socket only) ──────────────────────────────────
    PutRegistrationToken { token: String, scope: Scope },

    CreateRun {
        scope: Scope,
        commit_sha: String,
        title: String,
        jobs: Vec<JobSpec>,
    },

    CreateSchedules { schedules: Vec<ScheduleRequest> },

    DeleteSchedules { repo_id: RepoId },

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,
}

impl Request {
    /// Calls only accepted on the local socket.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Request::PutRegistrationToken { .. }
                | Request::CreateRun { .. }
                | Request::CreateSchedules { .. }
                | Request::DeleteSchedules { .. }
                | Request::Status
                | Request::Shutdown
        )
    }

    /// Polls are frequent and logged at debug.
    pub fn is_poll(&self) -> bool {
        matches!(
            self,
            Request::Ping
                | Request::FetchTask { .. }
                | Request::UpdateLog { .. }
                | Request::TaskContext { .. }
        )
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::Hello { .. } => "hello",
            Request::Register { .. } => "register",
            Request::Declare { .. } => "declare",
            Request::FetchTask { .. } => "fetch_task",
            Request::UpdateTask { .. } => "update_task",
            Request::UpdateLog { .. } => "update_log",
            Request::TaskContext { .. } => "task_context",
            Request::PutRegistrationToken { .. } => "put_registration_token",
            Request::CreateRun { .. } => "create_run",
            Request::CreateSchedules { .. } => "create_schedules",
            Request::DeleteSchedules { .. } => "delete_schedules",
            Request::Status => "status",
            Request::Shutdown => "shutdown",
        }
    }
}
