// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow runs and their schedulable jobs.

use crate::id::{JobId, RunId, ScheduleId, TaskId};
use crate::labels::LabelSet;
use crate::scope::Scope;
use crate::status::Status;
use serde::{Deserialize, Serialize};

/// A group of jobs created together from one workflow trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub scope: Scope,
    pub commit_sha: String,
    pub title: String,
    /// Set when the run was fired by a schedule; such runs publish no
    /// commit statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<ScheduleId>,
    pub created_at_ms: u64,
}

/// One schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub run_id: RunId,
    pub scope: Scope,
    pub commit_sha: String,
    /// Name other jobs of the run use in their `needs`.
    pub key: String,
    pub name: String,
    pub needs: Vec<JobId>,
    pub runs_on: LabelSet,
    /// Opaque workflow definition handed to the parser and the runner.
    pub payload: String,
    pub status: Status,
    pub attempt: u32,
    pub max_attempts: u32,
    /// `TaskId::NONE` while unclaimed.
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at_ms: Option<u64>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Job {
    /// Whether a runner advertising `labels` can execute this job.
    pub fn runs_on(&self, labels: &LabelSet) -> bool {
        labels.satisfies(&self.runs_on)
    }

    /// Waiting and not held by any task.
    pub fn is_claimable(&self) -> bool {
        self.status == Status::Waiting && self.task_id.is_none()
    }

    /// Whether a stopped attempt may be retried.
    pub fn has_attempts_left(&self) -> bool {
        self.attempt < self.max_attempts
    }
}

/// Definition of a job submitted as part of a new run.
///
/// `needs` names other jobs of the same run by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub runs_on: LabelSet,
    #[serde(default)]
    pub payload: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    1
}

impl JobSpec {
    pub fn builder(key: impl Into<String>) -> JobSpecBuilder {
        let key = key.into();
        JobSpecBuilder {
            name: key.clone(),
            key,
            needs: Vec::new(),
            runs_on: LabelSet::new(),
            payload: String::new(),
            max_attempts: default_max_attempts(),
        }
    }
}

pub struct JobSpecBuilder {
    key: String,
    name: String,
    needs: Vec<String>,
    runs_on: LabelSet,
    payload: String,
    max_attempts: u32,
}

impl JobSpecBuilder {
    crate::setters! {
        into {
            name: String,
            payload: String,
        }
        set {
            runs_on: LabelSet,
            max_attempts: u32,
        }
    }

    pub fn needs<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.needs = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> JobSpec {
        JobSpec {
            key: self.key,
            name: self.name,
            needs: self.needs,
            runs_on: self.runs_on,
            payload: self.payload,
            max_attempts: self.max_attempts.max(1),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
