// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Assignment: matching waiting jobs to polling runners.

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{
    Clock, Event, Job, JobId, RunId, Runner, Scope, Status, TaskId, TaskResult,
};
use drover_storage::{ClaimRequest, Claimed, MaterializedState, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result and outputs of a job the assigned job needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedResult {
    pub result: TaskResult,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
}

/// Everything a runner needs to execute a claimed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task_id: TaskId,
    /// Plaintext task token; only ever sent in this payload.
    pub token: String,
    pub job_id: JobId,
    pub run_id: RunId,
    pub job_key: String,
    pub job_name: String,
    pub attempt: u32,
    pub scope: Scope,
    pub commit_sha: String,
    pub payload: String,
    pub steps: Vec<String>,
    /// Keyed by the needed job's key.
    #[serde(default)]
    pub needs: BTreeMap<String, NeedResult>,
}

/// Answer to a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedTask {
    pub task: Option<TaskPayload>,
    pub tasks_version: u64,
}

fn needs_of(state: &MaterializedState, job: &Job) -> BTreeMap<String, NeedResult> {
    job.needs
        .iter()
        .filter_map(|id| state.job(*id))
        .map(|need| {
            let outputs = if need.task_id.is_none() {
                BTreeMap::new()
            } else {
                state.outputs(need.task_id).cloned().unwrap_or_default()
            };
            (need.key.clone(), NeedResult { result: need.status.as_result(), outputs })
        })
        .collect()
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Poll for work.
    ///
    /// A runner that already saw the current tasks version gets "no task"
    /// without a scan; otherwise [`Coordinator::pick_task`] runs.
    pub async fn fetch_task(
        &self,
        runner: &Runner,
        tasks_version: u64,
    ) -> Result<FetchedTask, ServiceError> {
        let key = runner.scope.version_key();
        let current = self.store.transact(|tx| Ok::<_, StoreError>(tx.ensure_tasks_version(key)))?;

        if tasks_version == current {
            tracing::debug!(runner_id = %runner.id, tasks_version, "no new work");
            return Ok(FetchedTask { task: None, tasks_version: current });
        }

        let task = self.pick_task(runner).await?;
        Ok(FetchedTask { task, tasks_version: current })
    }

    /// Claim the oldest waiting job the runner can execute, if any.
    ///
    /// Only the first label match is tried; losing its claim race yields
    /// "no task" and the runner polls again.
    pub async fn pick_task(&self, runner: &Runner) -> Result<Option<TaskPayload>, ServiceError> {
        let candidate = self.store.read(|s| {
            s.claimable_jobs(&runner.scope).into_iter().find(|j| j.runs_on(&runner.labels)).cloned()
        });
        let Some(job) = candidate else {
            return Ok(None);
        };

        let steps = match self.parser.parse_steps(&job.payload) {
            Ok(steps) => steps,
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "unparsable job payload, failing job");
                self.fail_unparsable_job(&job).await?;
                return Ok(None);
            }
        };

        let now = self.now_ms();
        let compress = self.config.compress_logs();
        let claimed = self.store.transact(|tx| {
            let claimed = tx.claim_job(ClaimRequest {
                job_id: job.id,
                runner,
                step_names: &steps,
                compress_logs: compress,
                at_ms: now,
            })?;
            let needs = tx.state().job(job.id).map(|j| needs_of(tx.state(), j)).unwrap_or_default();
            Ok::<_, StoreError>(claimed.map(|c| (c, needs)))
        })?;

        let Some((Claimed { job, task, token, steps }, needs)) = claimed else {
            return Ok(None);
        };
        tracing::info!(
            runner_id = %runner.id,
            job_id = %job.id,
            task_id = %task.id,
            attempt = task.attempt,
            "task assigned"
        );
        self.publish_job_statuses(std::slice::from_ref(&job)).await;

        Ok(Some(TaskPayload {
            task_id: task.id,
            token,
            job_id: job.id,
            run_id: job.run_id,
            job_key: job.key.clone(),
            job_name: job.name.clone(),
            attempt: task.attempt,
            scope: job.scope,
            commit_sha: job.commit_sha.clone(),
            payload: job.payload.clone(),
            steps: steps.into_iter().map(|s| s.name).collect(),
            needs,
        }))
    }

    /// A job whose payload cannot be parsed would be picked first forever;
    /// fail it and let its dependents be skipped.
    async fn fail_unparsable_job(&self, job: &Job) -> Result<(), ServiceError> {
        let now = self.now_ms();
        let failed = self.store.transact(|tx| {
            if !tx.state().job(job.id).is_some_and(|j| j.is_claimable()) {
                return Ok::<_, StoreError>(false);
            }
            tx.emit(Event::JobStatusChanged {
                id: job.id,
                status: Status::Failure,
                expected_task: None,
                stopped_at_ms: Some(now),
                at_ms: now,
            });
            Ok(true)
        })?;
        if failed {
            let jobs = self.jobs_by_id(&[job.id]);
            self.publish_job_statuses(&jobs).await;
            self.advance_run(job.run_id).await?;
        }
        Ok(())
    }
}

