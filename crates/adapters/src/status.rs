// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commit-status publishing for job state changes.

use async_trait::async_trait;
use drover_core::{JobId, RunId, Scope, Status};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish failed: {0}")]
    Failed(String),
}

/// One job's status against a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub scope: Scope,
    pub commit_sha: String,
    pub run_id: RunId,
    pub job_id: JobId,
    /// `"{run title} / {job name}"`.
    pub context: String,
    pub state: Status,
    pub description: String,
}

impl CommitStatus {
    pub fn describe(state: Status) -> &'static str {
        match state {
            Status::Waiting => "Waiting to run",
            Status::Blocked => "Blocked by required conditions",
            Status::Running => "Has started running",
            Status::Success => "Successful",
            Status::Failure => "Failing after attempts",
            Status::Cancelled => "Has been cancelled",
            Status::Skipped => "Has been skipped",
        }
    }
}

#[async_trait]
pub trait StatusPublisher: Clone + Send + Sync + 'static {
    async fn publish(&self, status: &CommitStatus) -> Result<(), PublishError>;
}

/// Publisher that only records statuses in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogStatusPublisher;

#[async_trait]
impl StatusPublisher for LogStatusPublisher {
    async fn publish(&self, status: &CommitStatus) -> Result<(), PublishError> {
        tracing::info!(
            commit = %status.commit_sha,
            job_id = %status.job_id,
            context = %status.context,
            state = %status.state,
            "commit status"
        );
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CommitStatus, PublishError, StatusPublisher};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeStatusState {
        published: Vec<CommitStatus>,
        fail: bool,
    }

    /// Fake publisher that records every status
    #[derive(Clone, Default)]
    pub struct FakeStatusPublisher {
        inner: Arc<Mutex<FakeStatusState>>,
    }

    impl FakeStatusPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<CommitStatus> {
            self.inner.lock().published.clone()
        }

        pub fn set_fail(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }
    }

    #[async_trait]
    impl StatusPublisher for FakeStatusPublisher {
        async fn publish(&self, status: &CommitStatus) -> Result<(), PublishError> {
            let mut inner = self.inner.lock();
            if inner.fail {
                return Err(PublishError::Failed("injected failure".into()));
            }
            inner.published.push(status.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStatusPublisher;
