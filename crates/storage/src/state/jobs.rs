// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run, job and tasks-version event handlers.

use drover_core::{Event, Status, TaskId};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::RunCreated { run, jobs } => {
            state.runs.entry(run.id).or_insert_with(|| run.clone());
            state.last_ids.run = state.last_ids.run.max(run.id.get());
            for job in jobs {
                if state.jobs.contains_key(&job.id) {
                    continue;
                }
                state.indexes.jobs_by_run.entry(job.run_id).or_default().push(job.id);
                state.jobs.insert(job.id, job.clone());
                state.last_ids.job = state.last_ids.job.max(job.id.get());
            }
        }

        Event::TasksVersionSet { key, version } => {
            let current = state.tasks_versions.entry(*key).or_insert(0);
            *current = (*current).max(*version);
        }

        Event::JobStatusChanged { id, status, expected_task, stopped_at_ms, at_ms } => {
            let Some(job) = state.jobs.get_mut(id) else {
                return;
            };
            if let Some(expected) = expected_task {
                if job.task_id != *expected {
                    return;
                }
            }
            // Terminal jobs stay terminal.
            if job.status.is_done() && job.status != *status {
                return;
            }
            job.status = *status;
            if stopped_at_ms.is_some() {
                job.stopped_at_ms = *stopped_at_ms;
            }
            job.updated_at_ms = *at_ms;
        }

        Event::JobRequeued { id, expected_task, at_ms } => {
            let Some(job) = state.jobs.get_mut(id) else {
                return;
            };
            if job.task_id != *expected_task || expected_task.is_none() {
                return;
            }
            job.status = Status::Waiting;
            job.task_id = TaskId::NONE;
            job.stopped_at_ms = None;
            job.updated_at_ms = *at_ms;
        }

        _ => {}
    }
}
