// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run creation and job status transitions.

use super::{StoreError, Txn};
use drover_core::{
    truncate_name, Event, Job, JobId, JobSpec, Run, RunId, ScheduleId, Scope, Status, TaskId,
    MAX_NAME_BYTES,
};
use std::collections::{HashMap, HashSet};

/// A workflow run to insert, with its jobs in declaration order.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub scope: Scope,
    pub commit_sha: String,
    pub title: String,
    pub schedule_id: Option<ScheduleId>,
    pub jobs: Vec<JobSpec>,
}

/// Result of one jobs-ready resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyOutcome {
    /// Blocked jobs whose needs all succeeded; now waiting.
    pub unblocked: Vec<JobId>,
    /// Blocked jobs with a need that did not succeed; now skipped.
    pub skipped: Vec<JobId>,
}

impl ReadyOutcome {
    pub fn is_empty(&self) -> bool {
        self.unblocked.is_empty() && self.skipped.is_empty()
    }
}

impl Txn<'_> {
    /// Insert a run and its jobs. Jobs without needs start `waiting`, the
    /// rest `blocked`.
    pub fn create_run(&mut self, new: NewRun, at_ms: u64) -> Result<(Run, Vec<Job>), StoreError> {
        validate_graph(&new.jobs)?;

        let run = Run {
            id: self.next_run_id(),
            scope: new.scope,
            commit_sha: new.commit_sha,
            title: truncate_name(&new.title, MAX_NAME_BYTES),
            schedule_id: new.schedule_id,
            created_at_ms: at_ms,
        };

        let job_ids: Vec<JobId> = new.jobs.iter().map(|_| self.next_job_id()).collect();
        let ids: HashMap<&str, JobId> =
            new.jobs.iter().map(|spec| spec.key.as_str()).zip(job_ids.iter().copied()).collect();
        let jobs: Vec<Job> = new
            .jobs
            .iter()
            .zip(job_ids.iter().copied())
            .map(|(spec, id)| {
                let mut needs: Vec<JobId> =
                    spec.needs.iter().filter_map(|k| ids.get(k.as_str()).copied()).collect();
                needs.sort();
                needs.dedup();
                Job {
                    id,
                    run_id: run.id,
                    scope: run.scope,
                    commit_sha: run.commit_sha.clone(),
                    key: spec.key.clone(),
                    name: truncate_name(&spec.name, MAX_NAME_BYTES),
                    status: if needs.is_empty() { Status::Waiting } else { Status::Blocked },
                    needs,
                    runs_on: spec.runs_on.clone(),
                    payload: spec.payload.clone(),
                    attempt: 0,
                    max_attempts: spec.max_attempts.max(1),
                    task_id: TaskId::NONE,
                    started_at_ms: None,
                    stopped_at_ms: None,
                    created_at_ms: at_ms,
                    updated_at_ms: at_ms,
                }
            })
            .collect();

        let any_waiting = jobs.iter().any(|j| j.status == Status::Waiting);
        self.emit(Event::RunCreated { run: run.clone(), jobs: jobs.clone() });
        if any_waiting {
            self.bump_tasks_version(&run.scope);
        }
        Ok((run, jobs))
    }

    /// Move the blocked jobs of `run_id` whose needs have all finished:
    /// to `waiting` when every need succeeded, to `skipped` otherwise.
    /// Repeats until nothing changes, so skips cascade down the graph.
    pub fn resolve_ready_jobs(&mut self, run_id: RunId, at_ms: u64) -> ReadyOutcome {
        let jobs = self.state().jobs_of_run(run_id);
        let mut status: HashMap<JobId, Status> = jobs.iter().map(|j| (j.id, j.status)).collect();
        let mut outcome = ReadyOutcome::default();

        loop {
            let mut changed = false;
            for job in &jobs {
                if status.get(&job.id) != Some(&Status::Blocked) {
                    continue;
                }
                let needs: Vec<Status> = job
                    .needs
                    .iter()
                    .map(|id| status.get(id).copied().unwrap_or(Status::Skipped))
                    .collect();
                if !needs.iter().all(|s| s.is_done()) {
                    continue;
                }
                if needs.iter().all(|s| s.is_success()) {
                    status.insert(job.id, Status::Waiting);
                    outcome.unblocked.push(job.id);
                } else {
                    status.insert(job.id, Status::Skipped);
                    outcome.skipped.push(job.id);
                }
                changed = true;
            }
            if !changed {
                break;
            }
        }

        for id in &outcome.unblocked {
            self.emit(Event::JobStatusChanged {
                id: *id,
                status: Status::Waiting,
                expected_task: None,
                stopped_at_ms: None,
                at_ms,
            });
        }
        for id in &outcome.skipped {
            self.emit(Event::JobStatusChanged {
                id: *id,
                status: Status::Skipped,
                expected_task: None,
                stopped_at_ms: Some(at_ms),
                at_ms,
            });
        }
        if !outcome.unblocked.is_empty() {
            if let Some(run) = self.state().run(run_id) {
                let scope = run.scope;
                self.bump_tasks_version(&scope);
            }
        }
        outcome
    }

    /// Cancel a job nobody holds. `Ok(None)` when it is no longer waiting
    /// or blocked.
    pub fn cancel_unclaimed_job(&mut self, id: JobId, at_ms: u64) -> Result<Option<Job>, StoreError> {
        let job = self.state().job(id).ok_or_else(|| StoreError::not_found(JobId::KIND, id.get()))?;
        if !job.status.is_unclaimed() || !job.task_id.is_none() {
            return Ok(None);
        }
        self.emit(Event::JobStatusChanged {
            id,
            status: Status::Cancelled,
            expected_task: None,
            stopped_at_ms: Some(at_ms),
            at_ms,
        });
        let mut job = job.clone();
        job.status = Status::Cancelled;
        job.stopped_at_ms = Some(at_ms);
        job.updated_at_ms = at_ms;
        Ok(Some(job))
    }
}

/// Keys unique, needs resolvable, and no dependency cycles.
fn validate_graph(specs: &[JobSpec]) -> Result<(), StoreError> {
    if specs.is_empty() {
        return Err(StoreError::InvalidRun("run has no jobs".into()));
    }
    let mut keys = HashSet::new();
    for spec in specs {
        if spec.key.is_empty() {
            return Err(StoreError::InvalidRun("job key is empty".into()));
        }
        if !keys.insert(spec.key.as_str()) {
            return Err(StoreError::InvalidRun(format!("duplicate job key {:?}", spec.key)));
        }
    }
    for spec in specs {
        if let Some(missing) = spec.needs.iter().find(|k| !keys.contains(k.as_str())) {
            return Err(StoreError::InvalidRun(format!(
                "job {:?} needs unknown job {:?}",
                spec.key, missing
            )));
        }
    }

    // Kahn's algorithm: whatever cannot be peeled off sits on a cycle.
    let mut pending: HashMap<&str, usize> = specs
        .iter()
        .map(|s| (s.key.as_str(), s.needs.iter().collect::<HashSet<_>>().len()))
        .collect();
    let mut ready: Vec<&str> =
        pending.iter().filter(|(_, n)| **n == 0).map(|(k, _)| *k).collect();
    let mut done = 0;
    while let Some(key) = ready.pop() {
        done += 1;
        for spec in specs.iter().filter(|s| s.needs.iter().any(|n| n == key)) {
            if let Some(n) = pending.get_mut(spec.key.as_str()) {
                *n -= 1;
                if *n == 0 {
                    ready.push(spec.key.as_str());
                }
            }
        }
    }
    if done != specs.len() {
        return Err(StoreError::InvalidRun("job needs form a cycle".into()));
    }
    Ok(())
}
