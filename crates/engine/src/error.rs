// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors returned by the scheduling services.

use drover_adapters::{ArchiveError, ParseError};
use drover_core::TaskId;
use drover_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed request or unusable registration token.
    #[error("invalid argument: {0}")]
    Validation(String),
    /// Bad credentials, or a runner acting on a task it does not hold.
    #[error("unauthenticated: {0}")]
    Authentication(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    /// Conflict: log rows sent after the log was archived.
    #[error("log of task {0} has been archived")]
    AlreadyArchived(TaskId),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    /// Stable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "invalid_argument",
            ServiceError::Authentication(_) => "unauthenticated",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::AlreadyArchived(_) => "already_exists",
            ServiceError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => ServiceError::not_found(kind, id),
            StoreError::LogArchived(id) => ServiceError::AlreadyArchived(id),
            StoreError::InvalidRun(msg) => ServiceError::Validation(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ArchiveError> for ServiceError {
    fn from(e: ArchiveError) -> Self {
        ServiceError::Internal(format!("archive: {e}"))
    }
}

impl From<ParseError> for ServiceError {
    fn from(e: ParseError) -> Self {
        ServiceError::Validation(e.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Internal(format!("io: {e}"))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
