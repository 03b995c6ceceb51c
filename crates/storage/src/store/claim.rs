// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The guarded claim of a waiting job by a runner.

use super::{StoreError, Txn};
use drover_core::{
    log_filename, truncate_name, Event, Job, JobId, Runner, SaltedToken, Status, Task, TaskLog,
    TaskStep, MAX_NAME_BYTES,
};

pub struct ClaimRequest<'a> {
    pub job_id: JobId,
    pub runner: &'a Runner,
    /// Step names parsed from the job payload, in order.
    pub step_names: &'a [String],
    pub compress_logs: bool,
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Claimed {
    /// The job as it looks after the claim.
    pub job: Job,
    pub task: Task,
    /// Plaintext task token. Exists only here and in the runner's response.
    pub token: String,
    pub steps: Vec<TaskStep>,
}

impl Txn<'_> {
    /// Create a task for `job_id` and bind the job to it.
    ///
    /// The binding only happens while the job is still waiting with no task.
    /// When another claim got there first the prepared task is discarded and
    /// `Ok(None)` is returned.
    pub fn claim_job(&mut self, req: ClaimRequest<'_>) -> Result<Option<Claimed>, StoreError> {
        let job = self
            .state()
            .job(req.job_id)
            .ok_or_else(|| StoreError::not_found(JobId::KIND, req.job_id.get()))?;

        let task_id = self.next_task_id();
        let (token, secret) = SaltedToken::generate();
        let task = Task {
            id: task_id,
            job_id: job.id,
            attempt: job.attempt + 1,
            runner_id: req.runner.id,
            status: Status::Running,
            scope: job.scope,
            commit_sha: job.commit_sha.clone(),
            token: secret,
            started_at_ms: req.at_ms,
            stopped_at_ms: None,
            updated_at_ms: req.at_ms,
            log: TaskLog {
                filename: log_filename(&job.scope, task_id, req.compress_logs),
                ..TaskLog::default()
            },
        };
        let steps: Vec<TaskStep> = req
            .step_names
            .iter()
            .enumerate()
            .map(|(index, name)| TaskStep {
                task_id,
                index: index as u32,
                name: truncate_name(name, MAX_NAME_BYTES),
                status: Status::Waiting,
                started_at_ms: None,
                stopped_at_ms: None,
                log_index: 0,
                log_length: 0,
            })
            .collect();

        if !job.is_claimable() {
            tracing::debug!(job_id = %job.id, task_id = %job.task_id, "claim lost");
            return Ok(None);
        }

        let mut claimed_job = job.clone();
        claimed_job.status = Status::Running;
        claimed_job.task_id = task_id;
        claimed_job.attempt = task.attempt;
        claimed_job.started_at_ms = Some(req.at_ms);
        claimed_job.stopped_at_ms = None;
        claimed_job.updated_at_ms = req.at_ms;

        self.emit(Event::JobClaimed { task: task.clone(), steps: steps.clone() });
        Ok(Some(Claimed { job: claimed_job, task, token, steps }))
    }
}
