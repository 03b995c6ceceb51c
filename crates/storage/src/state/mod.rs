// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

mod jobs;
mod queries;
mod runners;
mod schedules;
mod tasks;

use drover_core::{
    Event, Job, JobId, RegistrationToken, Run, RunId, Runner, RunnerId, Schedule, ScheduleId,
    ScopeKey, SpecId, Task, TaskId, TaskStep,
};
use drover_core::ScheduleSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Highest id handed out per table. Ids are allocated by transactions and
/// carried in events, so replay only has to track the maximum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub runner: u64,
    pub run: u64,
    pub job: u64,
    pub task: u64,
    pub schedule: u64,
    pub spec: u64,
}

/// Lookup tables derived from the primary maps. Not persisted; rebuilt after
/// a snapshot load and maintained by `apply_event`.
#[derive(Debug, Default, Clone)]
pub(crate) struct Indexes {
    pub(crate) runner_by_uuid: HashMap<String, RunnerId>,
    /// Token last-eight → running tasks with that suffix.
    pub(crate) running_by_last_eight: HashMap<String, BTreeSet<TaskId>>,
    pub(crate) jobs_by_run: HashMap<RunId, Vec<JobId>>,
}

/// Materialized state built from WAL operations
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    /// Keyed by the token string.
    #[serde(default)]
    pub registration_tokens: HashMap<String, RegistrationToken>,
    #[serde(default)]
    pub runners: BTreeMap<RunnerId, Runner>,
    #[serde(default)]
    pub runs: BTreeMap<RunId, Run>,
    #[serde(default)]
    pub jobs: BTreeMap<JobId, Job>,
    #[serde(default)]
    pub tasks: BTreeMap<TaskId, Task>,
    #[serde(default)]
    pub task_steps: HashMap<TaskId, Vec<TaskStep>>,
    #[serde(default)]
    pub task_outputs: HashMap<TaskId, BTreeMap<String, String>>,
    #[serde(default)]
    pub schedules: BTreeMap<ScheduleId, Schedule>,
    #[serde(default)]
    pub schedule_specs: BTreeMap<SpecId, ScheduleSpec>,
    #[serde(default)]
    pub tasks_versions: HashMap<ScopeKey, u64>,
    #[serde(default)]
    pub last_ids: IdCounters,
    #[serde(skip)]
    pub(crate) indexes: Indexes,
}

impl MaterializedState {
    /// Apply an event to derive state changes.
    ///
    /// # Idempotency Requirement
    ///
    /// **All event handlers MUST be idempotent.** Replay after a crash may
    /// re-apply entries a snapshot already covers, so applying an event twice
    /// must leave the same state as applying it once:
    /// - Use assignment (`=`) or `max` instead of increments
    /// - Guard inserts with existence checks
    /// - Guard conditional transitions on the value they expect to replace
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::RegistrationIssued { .. }
            | Event::RegistrationUsed { .. }
            | Event::RunnerRegistered { .. }
            | Event::RunnerDeclared { .. } => runners::apply(self, event),

            Event::RunCreated { .. }
            | Event::TasksVersionSet { .. }
            | Event::JobStatusChanged { .. }
            | Event::JobRequeued { .. } => jobs::apply(self, event),

            Event::JobClaimed { .. }
            | Event::TaskStateUpdated { .. }
            | Event::TaskStepsReported { .. }
            | Event::TaskOutputRecorded { .. }
            | Event::TaskLogAppended { .. }
            | Event::TaskLogArchived { .. }
            | Event::TaskLogExpired { .. } => tasks::apply(self, event),

            Event::ScheduleCreated { .. }
            | Event::ScheduleSpecAdvanced { .. }
            | Event::SchedulesDeleted { .. } => schedules::apply(self, event),
        }
    }

    /// Recompute the derived lookup tables from the primary maps.
    pub fn rebuild_indexes(&mut self) {
        let mut indexes = Indexes::default();
        for runner in self.runners.values() {
            indexes.runner_by_uuid.insert(runner.uuid.clone(), runner.id);
        }
        for task in self.tasks.values().filter(|t| !t.status.is_done()) {
            indexes
                .running_by_last_eight
                .entry(task.token.last_eight.clone())
                .or_default()
                .insert(task.id);
        }
        for job in self.jobs.values() {
            indexes.jobs_by_run.entry(job.run_id).or_default().push(job.id);
        }
        self.indexes = indexes;
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
