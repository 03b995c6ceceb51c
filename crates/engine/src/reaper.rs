// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reaper: recovers tasks and jobs nobody will finish.
//!
//! Each pass loads at most `reaper_batch_size` ids and moves every row in
//! its own transaction, so one bad row never blocks the rest.

use crate::coordinator::Coordinator;
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{Clock, Status, TaskId};
use serde::{Deserialize, Serialize};

/// What one sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Running tasks without a recent heartbeat, stopped.
    pub zombie: usize,
    /// Running tasks past the endless timeout, stopped.
    pub endless: usize,
    /// Of the stopped tasks, how many had their job requeued for retry.
    pub requeued: usize,
    /// Unclaimed jobs cancelled for inactivity.
    pub abandoned: usize,
    pub logs_expired: usize,
    /// Rows skipped because their transition failed.
    pub failed: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        *self == SweepReport::default()
    }
}

#[derive(Clone, Copy)]
enum StopReason {
    Zombie,
    Endless,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            StopReason::Zombie => "zombie",
            StopReason::Endless => "endless",
        }
    }
}

fn saturating_before(now_ms: u64, timeout: std::time::Duration) -> u64 {
    now_ms.saturating_sub(timeout.as_millis() as u64)
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Run every reaper pass once.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        self.stop_zombie_tasks(&mut report).await;
        self.stop_endless_tasks(&mut report).await;
        self.cancel_abandoned_jobs(&mut report).await;
        self.expire_logs(&mut report).await;
        if !report.is_empty() {
            tracing::info!(?report, "reaper sweep");
        }
        report
    }

    pub async fn stop_zombie_tasks(&self, report: &mut SweepReport) {
        let before = saturating_before(self.now_ms(), self.config.zombie_task_timeout);
        let limit = self.config.reaper_batch_size;
        let ids = self.store.read(|s| s.stale_running_tasks(before, limit));
        let stopped = self.stop_tasks(ids, StopReason::Zombie, report).await;
        report.zombie += stopped;
    }

    pub async fn stop_endless_tasks(&self, report: &mut SweepReport) {
        let before = saturating_before(self.now_ms(), self.config.endless_task_timeout);
        let limit = self.config.reaper_batch_size;
        let ids = self.store.read(|s| s.overdue_running_tasks(before, limit));
        let stopped = self.stop_tasks(ids, StopReason::Endless, report).await;
        report.endless += stopped;
    }

    async fn stop_tasks(&self, ids: Vec<TaskId>, reason: StopReason, report: &mut SweepReport) -> usize {
        let mut stopped = 0;
        for id in ids {
            let now = self.now_ms();
            let outcome = match self.store.transact(|tx| tx.stop_task(id, Status::Failure, now)) {
                Ok(Some(outcome)) => outcome,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(task_id = %id, reason = reason.as_str(), error = %e, "failed to stop task");
                    report.failed += 1;
                    continue;
                }
            };
            stopped += 1;
            tracing::info!(
                task_id = %id,
                job_id = %outcome.job_id,
                reason = reason.as_str(),
                requeued = outcome.requeued,
                "task stopped by reaper"
            );

            if let Err(e) = self.transfer_log(id).await {
                tracing::warn!(task_id = %id, error = %e, "failed to archive log of stopped task");
            }

            let jobs = self.jobs_by_id(&[outcome.job_id]);
            self.publish_job_statuses(&jobs).await;
            if outcome.requeued {
                report.requeued += 1;
            } else if let Some(job) = jobs.first() {
                if let Err(e) = self.advance_run(job.run_id).await {
                    tracing::warn!(job_id = %job.id, error = %e, "failed to resolve dependents");
                }
            }
        }
        stopped
    }

    pub async fn cancel_abandoned_jobs(&self, report: &mut SweepReport) {
        let before = saturating_before(self.now_ms(), self.config.abandoned_job_timeout);
        let limit = self.config.reaper_batch_size;
        let ids = self.store.read(|s| s.abandoned_jobs(before, limit));

        for id in ids {
            let now = self.now_ms();
            let job = match self.store.transact(|tx| tx.cancel_unclaimed_job(id, now)) {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "failed to cancel abandoned job");
                    report.failed += 1;
                    continue;
                }
            };
            report.abandoned += 1;
            tracing::info!(job_id = %id, run_id = %job.run_id, "abandoned job cancelled");
            self.publish_job_statuses(std::slice::from_ref(&job)).await;
            if let Err(e) = self.advance_run(job.run_id).await {
                tracing::warn!(job_id = %id, error = %e, "failed to resolve dependents");
            }
        }
    }

    /// Delete archived logs of tasks stopped longer than the retention.
    pub async fn expire_logs(&self, report: &mut SweepReport) {
        let before = saturating_before(self.now_ms(), self.config.log_retention);
        let limit = self.config.reaper_batch_size;
        let ids = self.store.read(|s| s.expirable_logs(before, limit));

        for id in ids {
            match self.expire_log(id).await {
                Ok(()) => report.logs_expired += 1,
                Err(e) => {
                    tracing::warn!(task_id = %id, error = %e, "failed to expire log");
                    report.failed += 1;
                }
            }
        }
    }
}
