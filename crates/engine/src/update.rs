// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner state reports: heartbeats, step progress, results and outputs.

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{Clock, Job, RunId, Runner, StepReport, TaskId, TaskResult};
use drover_storage::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Output keys longer than this are dropped.
pub const MAX_OUTPUT_KEY_LEN: usize = 255;

/// Output values longer than this (in bytes) are dropped.
pub const MAX_OUTPUT_VALUE_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateUpdate {
    pub task_id: TaskId,
    /// `Unspecified` for a heartbeat.
    #[serde(default)]
    pub result: TaskResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at_ms: Option<u64>,
    #[serde(default)]
    pub steps: Vec<StepReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdateAck {
    pub task_id: TaskId,
    pub result: TaskResult,
    /// Every output key recorded for the task, sorted.
    pub sent_outputs: Vec<String>,
}

fn acceptable_output(task_id: TaskId, key: &str, value: &str) -> bool {
    if key.is_empty() || key.len() > MAX_OUTPUT_KEY_LEN {
        tracing::warn!(%task_id, key_len = key.len(), "dropping output with invalid key");
        return false;
    }
    if value.len() > MAX_OUTPUT_VALUE_LEN {
        tracing::warn!(%task_id, key, value_len = value.len(), "dropping oversized output");
        return false;
    }
    true
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Apply a state report from the runner executing the task.
    ///
    /// Reports for a task that already finished are acknowledged without
    /// changing it, though new outputs are still recorded.
    pub async fn update_task(
        &self,
        runner: &Runner,
        update: TaskStateUpdate,
        outputs: BTreeMap<String, String>,
    ) -> Result<TaskUpdateAck, ServiceError> {
        let task = self.owned_task(runner, update.task_id)?;
        let was_done = task.status.is_done();
        let outputs: Vec<(String, String)> =
            outputs.into_iter().filter(|(k, v)| acceptable_output(task.id, k, v)).collect();

        let now = self.now_ms();
        let (reported, keys) = self.store.transact(|tx| {
            let reported =
                tx.report_task_state(task.id, update.result, update.stopped_at_ms, &update.steps, now)?;
            let mut keys: BTreeSet<String> = tx.state().output_keys(task.id).into_iter().collect();
            for (key, value) in &outputs {
                tx.record_output(task.id, key, value);
                keys.insert(key.clone());
            }
            Ok::<_, StoreError>((reported, keys))
        })?;

        if reported.finished {
            tracing::info!(
                task_id = %task.id,
                job_id = %task.job_id,
                runner_id = %runner.id,
                status = %reported.task.status,
                "task finished"
            );
        } else {
            tracing::debug!(task_id = %task.id, "task heartbeat");
        }

        if !was_done {
            let job = self.jobs_by_id(&[task.job_id]);
            self.publish_job_statuses(&job).await;
        }
        if reported.finished {
            if let Some(job) = self.store.read(|s| s.job(task.job_id).cloned()) {
                self.notify_finished(&job).await;
                self.advance_run(job.run_id).await?;
            }
        }

        Ok(TaskUpdateAck {
            task_id: task.id,
            result: reported.task.status.as_result(),
            sent_outputs: keys.into_iter().collect(),
        })
    }

    async fn notify_finished(&self, job: &Job) {
        let title = format!("{} {}", job.name, job.status);
        let message = format!("job {} of run {} at {} is {}", job.key, job.run_id, job.commit_sha, job.status);
        if let Err(e) = self.notifier.notify(&title, &message).await {
            tracing::warn!(job_id = %job.id, error = %e, "notification failed");
        }
    }

    /// Run jobs-ready resolution for a run and publish what moved.
    pub(crate) async fn advance_run(&self, run_id: RunId) -> Result<(), ServiceError> {
        let now = self.now_ms();
        let ready = self.store.transact(|tx| Ok::<_, StoreError>(tx.resolve_ready_jobs(run_id, now)))?;
        if ready.is_empty() {
            return Ok(());
        }
        tracing::info!(
            %run_id,
            unblocked = ready.unblocked.len(),
            skipped = ready.skipped.len(),
            "run advanced"
        );
        let ids: Vec<_> = ready.unblocked.iter().chain(&ready.skipped).copied().collect();
        let jobs = self.jobs_by_id(&ids);
        self.publish_job_statuses(&jobs).await;
        Ok(())
    }
}
