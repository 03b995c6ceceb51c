// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::state::{IdCounters, MaterializedState};
use drover_core::{
    Event, JobId, RunId, RunnerId, ScheduleId, Scope, ScopeKey, SpecId, TaskId,
};
use std::collections::{HashMap, HashSet};

/// An open transaction: a read view plus the events decided so far.
///
/// Ids and tasks-version values handed out here account for earlier
/// allocations in the same transaction, so a batch never reuses a value.
pub struct Txn<'a> {
    state: &'a MaterializedState,
    events: Vec<Event>,
    ids: IdCounters,
    versions: HashMap<ScopeKey, u64>,
    outputs: HashSet<(TaskId, String)>,
}

impl<'a> Txn<'a> {
    pub(crate) fn new(state: &'a MaterializedState) -> Self {
        Self {
            state,
            events: Vec::new(),
            ids: state.last_ids,
            versions: HashMap::new(),
            outputs: HashSet::new(),
        }
    }

    /// The state as of the start of the transaction.
    pub fn state(&self) -> &'a MaterializedState {
        self.state
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn next_runner_id(&mut self) -> RunnerId {
        self.ids.runner += 1;
        RunnerId::new(self.ids.runner)
    }

    pub fn next_run_id(&mut self) -> RunId {
        self.ids.run += 1;
        RunId::new(self.ids.run)
    }

    pub fn next_job_id(&mut self) -> JobId {
        self.ids.job += 1;
        JobId::new(self.ids.job)
    }

    pub fn next_task_id(&mut self) -> TaskId {
        self.ids.task += 1;
        TaskId::new(self.ids.task)
    }

    pub fn next_schedule_id(&mut self) -> ScheduleId {
        self.ids.schedule += 1;
        ScheduleId::new(self.ids.schedule)
    }

    pub fn next_spec_id(&mut self) -> SpecId {
        self.ids.spec += 1;
        SpecId::new(self.ids.spec)
    }

    pub fn tasks_version(&self, key: ScopeKey) -> u64 {
        self.versions.get(&key).copied().unwrap_or_else(|| self.state.tasks_version(key))
    }

    /// Signal new work at `scope`: bump the global, owner and repo counters.
    pub fn bump_tasks_version(&mut self, scope: &Scope) {
        for key in scope.affected_version_keys() {
            self.set_tasks_version(key, self.tasks_version(key) + 1);
        }
    }

    /// Current counter for `key`, initializing a never-bumped counter to 1.
    pub fn ensure_tasks_version(&mut self, key: ScopeKey) -> u64 {
        let version = self.tasks_version(key);
        if version > 0 {
            return version;
        }
        self.set_tasks_version(key, 1);
        1
    }

    fn set_tasks_version(&mut self, key: ScopeKey, version: u64) {
        self.versions.insert(key, version);
        self.emit(Event::TasksVersionSet { key, version });
    }

    /// Whether `key` was already recorded for `task_id`, counting writes
    /// earlier in this transaction.
    pub(crate) fn has_output(&self, task_id: TaskId, key: &str) -> bool {
        self.outputs.contains(&(task_id, key.to_string()))
            || self.state.outputs(task_id).is_some_and(|o| o.contains_key(key))
    }

    pub(crate) fn note_output(&mut self, task_id: TaskId, key: &str) {
        self.outputs.insert((task_id, key.to_string()));
    }
}
