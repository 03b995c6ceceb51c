// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run submission and status.

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{Clock, Job, Run, RunId, Status};
use drover_storage::NewRun;

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Insert a run with its job graph and publish the initial statuses.
    pub async fn create_run(&self, new: NewRun) -> Result<(Run, Vec<Job>), ServiceError> {
        let now = self.now_ms();
        let (run, jobs) = self.store.transact(|tx| tx.create_run(new, now))?;
        tracing::info!(
            run_id = %run.id,
            owner_id = %run.scope.owner_id,
            repo_id = %run.scope.repo_id,
            jobs = jobs.len(),
            "run created"
        );
        self.publish_job_statuses(&jobs).await;
        Ok((run, jobs))
    }

    /// Aggregate status of a run's jobs.
    pub fn run_status(&self, id: RunId) -> Result<Status, ServiceError> {
        self.store.read(|s| s.run_status(id)).ok_or_else(|| ServiceError::not_found("run", id))
    }

    pub fn run_jobs(&self, id: RunId) -> Result<Vec<Job>, ServiceError> {
        self.store.read(|s| {
            s.run(id)
                .map(|_| s.jobs_of_run(id).into_iter().cloned().collect())
                .ok_or_else(|| ServiceError::not_found("run", id))
        })
    }
}
