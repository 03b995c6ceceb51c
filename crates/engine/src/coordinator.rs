// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduling facade shared by every connection and timer.

use crate::config::EngineConfig;
use crate::logs::LogSinks;
use crate::token_cache::TokenCache;
use drover_adapters::{
    ArchiveStore, CommitStatus, CronParser, NotifyAdapter, StatusPublisher, WorkflowParser,
};
use drover_core::{Clock, Job, Status};
use drover_storage::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Collaborators handed to [`Coordinator::new`].
pub struct CoordinatorDeps<A, P, N> {
    pub store: Store,
    pub archive: A,
    pub publisher: P,
    pub notifier: N,
    pub parser: Arc<dyn WorkflowParser>,
    pub cron: Arc<dyn CronParser>,
    pub sinks: LogSinks,
}

/// Counts reported by the admin `Status` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub runners: usize,
    pub runs: usize,
    pub waiting_jobs: usize,
    pub blocked_jobs: usize,
    pub running_tasks: usize,
    pub schedules: usize,
}

pub struct Coordinator<A, P, N, C: Clock> {
    pub(crate) store: Store,
    pub(crate) archive: A,
    pub(crate) publisher: P,
    pub(crate) notifier: N,
    pub(crate) parser: Arc<dyn WorkflowParser>,
    pub(crate) cron: Arc<dyn CronParser>,
    pub(crate) sinks: LogSinks,
    pub(crate) tokens: TokenCache,
    pub(crate) config: EngineConfig,
    pub(crate) clock: C,
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(deps: CoordinatorDeps<A, P, N>, config: EngineConfig, tokens: TokenCache, clock: C) -> Self {
        Self {
            store: deps.store,
            archive: deps.archive,
            publisher: deps.publisher,
            notifier: deps.notifier,
            parser: deps.parser,
            cron: deps.cron,
            sinks: deps.sinks,
            tokens,
            config,
            clock,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub fn status_summary(&self) -> StatusSummary {
        self.store.read(|s| StatusSummary {
            runners: s.runners.len(),
            runs: s.runs.len(),
            waiting_jobs: s.jobs.values().filter(|j| j.status == Status::Waiting).count(),
            blocked_jobs: s.jobs.values().filter(|j| j.status == Status::Blocked).count(),
            running_tasks: s.tasks.values().filter(|t| t.status == Status::Running).count(),
            schedules: s.schedules.len(),
        })
    }

    /// Publish the current status of each job. Jobs of scheduled runs are
    /// skipped; failures are logged.
    pub(crate) async fn publish_job_statuses(&self, jobs: &[Job]) {
        let statuses: Vec<CommitStatus> = self.store.read(|s| {
            jobs.iter()
                .filter_map(|job| {
                    let run = s.run(job.run_id)?;
                    if run.schedule_id.is_some() {
                        return None;
                    }
                    let job = s.job(job.id).unwrap_or(job);
                    Some(CommitStatus {
                        scope: job.scope,
                        commit_sha: job.commit_sha.clone(),
                        run_id: job.run_id,
                        job_id: job.id,
                        context: format!("{} / {}", run.title, job.name),
                        state: job.status,
                        description: CommitStatus::describe(job.status).to_string(),
                    })
                })
                .collect()
        });
        for status in statuses {
            if let Err(e) = self.publisher.publish(&status).await {
                tracing::warn!(job_id = %status.job_id, error = %e, "failed to publish commit status");
            }
        }
    }

    /// Jobs by id, as currently stored.
    pub(crate) fn jobs_by_id(&self, ids: &[drover_core::JobId]) -> Vec<Job> {
        self.store.read(|s| ids.iter().filter_map(|id| s.job(*id).cloned()).collect())
    }
}

#[cfg(test)]
#[path = "coordinator_tests/mod.rs"]
mod tests;
