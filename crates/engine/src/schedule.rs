// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule Trigger: cron schedules, due specs, and firing them as runs.

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{
    truncate_name, Clock, Event, JobSpec, RepoId, RunId, Schedule, ScheduleSpec, Scope, SpecId,
    MAX_NAME_BYTES,
};
use drover_storage::{NewRun, StoreError};
use serde::{Deserialize, Serialize};

/// A schedule as submitted by an administrator.
///
/// `payload` is the JSON array of job definitions each firing creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub title: String,
    pub scope: Scope,
    pub workflow_id: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub commit_sha: String,
    pub specs: Vec<String>,
    #[serde(default)]
    pub payload: String,
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Persist a batch of schedules in one transaction.
    ///
    /// Specs the cron parser rejects are skipped with a warning; the
    /// schedule itself is still stored.
    pub fn create_schedules(&self, schedules: Vec<NewSchedule>) -> Result<Vec<Schedule>, ServiceError> {
        let now = self.now_ms();
        let parsed: Vec<(NewSchedule, Vec<(String, u64)>)> = schedules
            .into_iter()
            .map(|new| {
                let specs = new
                    .specs
                    .iter()
                    .filter_map(|spec| match self.cron.next_after(spec, now) {
                        Ok(next_ms) => Some((spec.clone(), next_ms)),
                        Err(e) => {
                            tracing::warn!(workflow_id = %new.workflow_id, error = %e, "skipping schedule spec");
                            None
                        }
                    })
                    .collect();
                (new, specs)
            })
            .collect();

        let created = self.store.transact(|tx| {
            let mut created = Vec::with_capacity(parsed.len());
            for (new, specs) in parsed {
                let schedule = Schedule {
                    id: tx.next_schedule_id(),
                    title: truncate_name(&new.title, MAX_NAME_BYTES),
                    scope: new.scope,
                    workflow_id: new.workflow_id,
                    ref_name: new.ref_name,
                    commit_sha: new.commit_sha,
                    specs: new.specs,
                    payload: new.payload,
                    created_at_ms: now,
                };
                let specs: Vec<ScheduleSpec> = specs
                    .into_iter()
                    .map(|(spec, next_ms)| ScheduleSpec {
                        id: tx.next_spec_id(),
                        schedule_id: schedule.id,
                        repo_id: schedule.scope.repo_id,
                        spec,
                        next_ms,
                    })
                    .collect();
                tx.emit(Event::ScheduleCreated { schedule: schedule.clone(), specs });
                created.push(schedule);
            }
            Ok::<_, StoreError>(created)
        })?;

        for schedule in &created {
            tracing::info!(
                schedule_id = %schedule.id,
                repo_id = %schedule.scope.repo_id,
                title = %schedule.title,
                "schedule created"
            );
        }
        Ok(created)
    }

    /// Remove every schedule of a repository. Returns how many there were.
    pub fn delete_schedules_by_repo(&self, repo_id: RepoId) -> Result<usize, ServiceError> {
        let removed = self.store.transact(|tx| {
            let count = tx.state().schedules.values().filter(|s| s.scope.repo_id == repo_id).count();
            if count > 0 {
                tx.emit(Event::SchedulesDeleted { repo_id });
            }
            Ok::<_, StoreError>(count)
        })?;
        tracing::info!(%repo_id, removed, "schedules deleted");
        Ok(removed)
    }

    /// Specs due at the current time, earliest first.
    pub fn due_specs(&self) -> Vec<ScheduleSpec> {
        let now = self.now_ms();
        self.store.read(|s| s.due_specs(now).into_iter().cloned().collect())
    }

    /// Recompute a spec's next fire time from now.
    pub fn advance_spec(&self, id: SpecId) -> Result<u64, ServiceError> {
        let spec = self
            .store
            .read(|s| s.schedule_specs.get(&id).map(|spec| spec.spec.clone()))
            .ok_or_else(|| ServiceError::not_found("schedule spec", id))?;
        let next_ms = self.cron.next_after(&spec, self.now_ms())?;
        self.store.transact(|tx| {
            tx.emit(Event::ScheduleSpecAdvanced { id, next_ms });
            Ok::<_, StoreError>(())
        })?;
        tracing::debug!(spec_id = %id, next_ms, "schedule spec advanced");
        Ok(next_ms)
    }

    /// Create a run for each due spec, advancing the spec first so a broken
    /// schedule fires at most once per period.
    pub async fn fire_due_schedules(&self) -> Vec<RunId> {
        let mut runs = Vec::new();
        for spec in self.due_specs() {
            let Some(schedule) = self.store.read(|s| s.schedule(spec.schedule_id).cloned()) else {
                continue;
            };
            if let Err(e) = self.advance_spec(spec.id) {
                tracing::warn!(spec_id = %spec.id, error = %e, "failed to advance schedule spec");
                continue;
            }
            let jobs: Vec<JobSpec> = match serde_json::from_str(&schedule.payload) {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::warn!(schedule_id = %schedule.id, error = %e, "unparsable schedule payload");
                    continue;
                }
            };
            let new = NewRun {
                scope: schedule.scope,
                commit_sha: schedule.commit_sha.clone(),
                title: schedule.title.clone(),
                schedule_id: Some(schedule.id),
                jobs,
            };
            match self.create_run(new).await {
                Ok((run, _)) => runs.push(run.id),
                Err(e) => tracing::warn!(schedule_id = %schedule.id, error = %e, "scheduled run rejected"),
            }
        }
        runs
    }
}
