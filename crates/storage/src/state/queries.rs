// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side lookups over the materialized state.

use super::MaterializedState;
use drover_core::{
    aggregate_status, Job, JobId, RegistrationToken, Run, RunId, Runner, RunnerId, Schedule,
    ScheduleSpec, Scope, ScopeKey, Status, Task, TaskId, TaskStep,
};
use std::collections::BTreeMap;

impl MaterializedState {
    pub fn registration_token(&self, token: &str) -> Option<&RegistrationToken> {
        self.registration_tokens.get(token)
    }

    pub fn runner(&self, id: RunnerId) -> Option<&Runner> {
        self.runners.get(&id)
    }

    pub fn runner_by_uuid(&self, uuid: &str) -> Option<&Runner> {
        self.indexes.runner_by_uuid.get(uuid).and_then(|id| self.runners.get(id))
    }

    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs.get(&id)
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn schedule(&self, id: drover_core::ScheduleId) -> Option<&Schedule> {
        self.schedules.get(&id)
    }

    /// Current counter for `key`; 0 when never bumped.
    pub fn tasks_version(&self, key: ScopeKey) -> u64 {
        self.tasks_versions.get(&key).copied().unwrap_or(0)
    }

    /// Unclaimed waiting jobs a runner with `scope` may see, oldest
    /// `(updated, id)` first.
    pub fn claimable_jobs(&self, scope: &Scope) -> Vec<&Job> {
        let mut jobs: Vec<&Job> =
            self.jobs.values().filter(|j| j.is_claimable() && scope.covers(&j.scope)).collect();
        jobs.sort_by_key(|j| (j.updated_at_ms, j.id));
        jobs
    }

    /// Jobs of a run in creation order.
    pub fn jobs_of_run(&self, run_id: RunId) -> Vec<&Job> {
        self.indexes
            .jobs_by_run
            .get(&run_id)
            .map(|ids| ids.iter().filter_map(|id| self.jobs.get(id)).collect())
            .unwrap_or_default()
    }

    /// Aggregate status of a run's jobs; `None` for an unknown run.
    pub fn run_status(&self, run_id: RunId) -> Option<Status> {
        self.runs.get(&run_id)?;
        Some(aggregate_status(self.jobs_of_run(run_id).into_iter().map(|j| j.status)))
    }

    /// Running tasks whose token ends with `last_eight`.
    pub fn running_tasks_by_last_eight(&self, last_eight: &str) -> Vec<&Task> {
        self.indexes
            .running_by_last_eight
            .get(last_eight)
            .map(|ids| ids.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn steps(&self, task_id: TaskId) -> &[TaskStep] {
        self.task_steps.get(&task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn outputs(&self, task_id: TaskId) -> Option<&BTreeMap<String, String>> {
        self.task_outputs.get(&task_id)
    }

    /// Recorded output keys of a task, sorted.
    pub fn output_keys(&self, task_id: TaskId) -> Vec<String> {
        self.outputs(task_id).map(|o| o.keys().cloned().collect()).unwrap_or_default()
    }

    /// Running tasks with no heartbeat since `before_ms`.
    pub fn stale_running_tasks(&self, before_ms: u64, limit: usize) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|t| t.status == Status::Running && t.updated_at_ms < before_ms)
            .take(limit)
            .map(|t| t.id)
            .collect()
    }

    /// Running tasks started before `before_ms`.
    pub fn overdue_running_tasks(&self, before_ms: u64, limit: usize) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|t| t.status == Status::Running && t.started_at_ms < before_ms)
            .take(limit)
            .map(|t| t.id)
            .collect()
    }

    /// Waiting or blocked jobs untouched since `before_ms`.
    pub fn abandoned_jobs(&self, before_ms: u64, limit: usize) -> Vec<JobId> {
        self.jobs
            .values()
            .filter(|j| j.status.is_unclaimed() && j.updated_at_ms < before_ms)
            .take(limit)
            .map(|j| j.id)
            .collect()
    }

    /// Stopped tasks whose logs are past retention and not yet expired.
    pub fn expirable_logs(&self, stopped_before_ms: u64, limit: usize) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|t| {
                !t.log.expired && t.stopped_at_ms.is_some_and(|stopped| stopped < stopped_before_ms)
            })
            .take(limit)
            .map(|t| t.id)
            .collect()
    }

    /// Specs whose next fire time has come, earliest first.
    pub fn due_specs(&self, now_ms: u64) -> Vec<&ScheduleSpec> {
        let mut due: Vec<&ScheduleSpec> =
            self.schedule_specs.values().filter(|s| s.is_due(now_ms)).collect();
        due.sort_by_key(|s| (s.next_ms, s.id));
        due
    }
}
