// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim, task, step, output and log event handlers.

use drover_core::{Event, Status, Task};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::JobClaimed { task, steps } => {
            if state.tasks.contains_key(&task.id) {
                return;
            }
            if let Some(job) = state.jobs.get_mut(&task.job_id) {
                job.status = Status::Running;
                job.task_id = task.id;
                job.attempt = task.attempt;
                job.started_at_ms = Some(task.started_at_ms);
                job.stopped_at_ms = None;
                job.updated_at_ms = task.started_at_ms;
            }
            index_running(state, task);
            state.task_steps.insert(task.id, steps.clone());
            state.tasks.insert(task.id, task.clone());
            state.last_ids.task = state.last_ids.task.max(task.id.get());
        }

        Event::TaskStateUpdated { id, status, stopped_at_ms, at_ms } => {
            let Some(task) = state.tasks.get_mut(id) else {
                return;
            };
            // Terminal tasks stay terminal.
            if task.status.is_done() && task.status != *status {
                return;
            }
            task.status = *status;
            if stopped_at_ms.is_some() {
                task.stopped_at_ms = *stopped_at_ms;
            }
            task.updated_at_ms = *at_ms;
            if status.is_done() {
                let last_eight = task.token.last_eight.clone();
                let id = task.id;
                if let Some(ids) = state.indexes.running_by_last_eight.get_mut(&last_eight) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        state.indexes.running_by_last_eight.remove(&last_eight);
                    }
                }
            }
        }

        Event::TaskStepsReported { id, reports } => {
            let Some(steps) = state.task_steps.get_mut(id) else {
                return;
            };
            for report in reports {
                if let Some(step) = steps.iter_mut().find(|s| s.index == report.index) {
                    step.apply_report(report);
                }
            }
        }

        Event::TaskOutputRecorded { id, key, value } => {
            state
                .task_outputs
                .entry(*id)
                .or_default()
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        Event::TaskLogAppended { id, start_length, offsets, size, at_ms } => {
            let Some(task) = state.tasks.get_mut(id) else {
                return;
            };
            if task.log.in_storage || task.log.length != *start_length {
                return;
            }
            task.updated_at_ms = task.updated_at_ms.max(*at_ms);
            let log = &mut task.log;
            log.indexes.extend_from_slice(offsets);
            log.length += offsets.len() as u64;
            log.size = *size;
        }

        Event::TaskLogArchived { id } => {
            if let Some(task) = state.tasks.get_mut(id) {
                task.log.in_storage = true;
            }
        }

        Event::TaskLogExpired { id } => {
            if let Some(task) = state.tasks.get_mut(id) {
                task.log.expired = true;
                task.log.indexes.clear();
            }
        }

        _ => {}
    }
}

fn index_running(state: &mut MaterializedState, task: &Task) {
    if task.status.is_done() {
        return;
    }
    state
        .indexes
        .running_by_last_eight
        .entry(task.token.last_eight.clone())
        .or_default()
        .insert(task.id);
}
