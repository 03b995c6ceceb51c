// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state, outputs and log bookkeeping.

use super::{StoreError, Txn};
use drover_core::{Event, JobId, Status, StepReport, Task, TaskId, TaskResult};

/// What a runner's state report did.
#[derive(Debug, Clone)]
pub struct Reported {
    /// The task after the report.
    pub task: Task,
    /// True when this report moved the task to a terminal status.
    pub finished: bool,
}

/// A running task forced to a terminal status.
#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub task: Task,
    pub job_id: JobId,
    /// The job went back to `waiting` for another attempt instead of
    /// taking the task's status.
    pub requeued: bool,
}

impl<'a> Txn<'a> {
    fn task_or_not_found(&self, id: TaskId) -> Result<&'a Task, StoreError> {
        self.state().task(id).ok_or_else(|| StoreError::not_found(TaskId::KIND, id.get()))
    }

    /// Apply a runner's report for a task it holds.
    ///
    /// A terminal result stops the task and, while the job is still bound to
    /// this task, the job. A non-terminal report is a heartbeat. Reports for
    /// an already terminal task change nothing.
    pub fn report_task_state(
        &mut self,
        id: TaskId,
        result: TaskResult,
        stopped_at_ms: Option<u64>,
        steps: &[StepReport],
        at_ms: u64,
    ) -> Result<Reported, StoreError> {
        let task = self.task_or_not_found(id)?.clone();
        if task.status.is_done() {
            return Ok(Reported { task, finished: false });
        }

        let mut updated = task.clone();
        updated.updated_at_ms = at_ms;
        let finished = match result.status() {
            Some(status) => {
                let stopped = stopped_at_ms.unwrap_or(at_ms);
                updated.status = status;
                updated.stopped_at_ms = Some(stopped);
                self.emit(Event::TaskStateUpdated {
                    id,
                    status,
                    stopped_at_ms: Some(stopped),
                    at_ms,
                });
                self.emit(Event::JobStatusChanged {
                    id: task.job_id,
                    status,
                    expected_task: Some(id),
                    stopped_at_ms: Some(stopped),
                    at_ms,
                });
                true
            }
            None => {
                self.emit(Event::TaskStateUpdated {
                    id,
                    status: Status::Running,
                    stopped_at_ms: None,
                    at_ms,
                });
                false
            }
        };

        if !steps.is_empty() {
            self.emit(Event::TaskStepsReported { id, reports: steps.to_vec() });
        }
        Ok(Reported { task: updated, finished })
    }

    /// Force a running task to `status`: its unfinished steps take the same
    /// result, and its job is either requeued (attempts left) or stopped.
    /// `Ok(None)` when the task is no longer running.
    pub fn stop_task(
        &mut self,
        id: TaskId,
        status: Status,
        at_ms: u64,
    ) -> Result<Option<StopOutcome>, StoreError> {
        let task = self.task_or_not_found(id)?.clone();
        if task.status != Status::Running {
            return Ok(None);
        }

        self.emit(Event::TaskStateUpdated { id, status, stopped_at_ms: Some(at_ms), at_ms });

        let reports: Vec<StepReport> = self
            .state()
            .steps(id)
            .iter()
            .filter(|s| !s.status.is_done())
            .map(|s| StepReport {
                index: s.index,
                result: status.as_result(),
                started_at_ms: s.started_at_ms,
                stopped_at_ms: Some(at_ms),
                log_index: s.log_index,
                log_length: s.log_length,
            })
            .collect();
        if !reports.is_empty() {
            self.emit(Event::TaskStepsReported { id, reports });
        }

        let mut requeued = false;
        if let Some(job) = self.state().job(task.job_id) {
            if job.task_id == id {
                if job.has_attempts_left() {
                    self.emit(Event::JobRequeued { id: job.id, expected_task: id, at_ms });
                    self.bump_tasks_version(&job.scope);
                    requeued = true;
                } else {
                    self.emit(Event::JobStatusChanged {
                        id: job.id,
                        status,
                        expected_task: Some(id),
                        stopped_at_ms: Some(at_ms),
                        at_ms,
                    });
                }
            }
        }

        let mut task = task;
        task.status = status;
        task.stopped_at_ms = Some(at_ms);
        task.updated_at_ms = at_ms;
        Ok(Some(StopOutcome { job_id: task.job_id, task, requeued }))
    }

    /// Record an output unless the key already exists. Returns whether it
    /// was inserted.
    pub fn record_output(&mut self, id: TaskId, key: &str, value: &str) -> bool {
        if self.has_output(id, key) {
            return false;
        }
        self.note_output(id, key);
        self.emit(Event::TaskOutputRecorded { id, key: key.to_string(), value: value.to_string() });
        true
    }

    /// Register rows already written to the live sink. `offsets` holds the
    /// starting byte offset of each row; `size` is the sink size after them.
    /// Also touches the task, so a streaming task is not a zombie.
    /// Returns the new log length.
    pub fn append_log(
        &mut self,
        id: TaskId,
        start_length: u64,
        offsets: Vec<u64>,
        size: u64,
        at_ms: u64,
    ) -> Result<u64, StoreError> {
        let log = &self.task_or_not_found(id)?.log;
        if log.in_storage {
            return Err(StoreError::LogArchived(id));
        }
        if log.length != start_length {
            return Err(StoreError::LogMoved { id, expected: start_length, found: log.length });
        }
        let length = start_length + offsets.len() as u64;
        self.emit(Event::TaskLogAppended { id, start_length, offsets, size, at_ms });
        Ok(length)
    }

    pub fn mark_log_archived(&mut self, id: TaskId) -> Result<(), StoreError> {
        let task = self.task_or_not_found(id)?;
        if !task.log.in_storage {
            self.emit(Event::TaskLogArchived { id });
        }
        Ok(())
    }

    pub fn mark_log_expired(&mut self, id: TaskId) -> Result<(), StoreError> {
        let task = self.task_or_not_found(id)?;
        if !task.log.expired {
            self.emit(Event::TaskLogExpired { id });
        }
        Ok(())
    }
}
