// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use drover_core::{ScheduleId, TaskId, TaskResult};
use serde::{Deserialize, Serialize};

use super::{RunInfo, RunnerInfo, StatusInfo, TaskContextInfo, TaskInfo};

/// Failure class carried by [`Response::Error`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    Internal,
}

drover_core::simple_display! {
    ErrorCode {
        InvalidArgument => "invalid_argument",
        Unauthenticated => "unauthenticated",
        PermissionDenied => "permission_denied",
        NotFound => "not_found",
        AlreadyExists => "already_exists",
        Internal => "internal",
    }
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::InvalidArgument,
        ErrorCode::Unauthenticated,
        ErrorCode::PermissionDenied,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::Internal,
    ];
}

impl std::str::FromStr for ErrorCode {
    type Err = String;

    /// Parse the code's display name, e.g. `"not_found"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.to_string() == s)
            .ok_or_else(|| format!("unknown error code: {s}"))
    }
}

/// Response from daemon to a runner or administrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// Registered or declared runner
    Runner { runner: RunnerInfo },

    /// Poll answer; `task` is absent when there is no work
    Task {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task: Option<Box<TaskInfo>>,
        tasks_version: u64,
    },

    TaskUpdated { id: TaskId, result: TaskResult, sent_outputs: Vec<String> },

    /// Identity of the task behind a task token
    TaskContext { context: TaskContextInfo },

    /// Number of log rows the daemon holds for the task
    LogAck { ack_index: u64 },

    RunCreated { run: RunInfo },

    SchedulesCreated { ids: Vec<ScheduleId> },

    SchedulesDeleted { removed: usize },

    Status { status: StatusInfo },

    /// Error response
    Error { code: ErrorCode, message: String },
}

impl Response {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Response::Error { code, message: message.into() }
    }
}
