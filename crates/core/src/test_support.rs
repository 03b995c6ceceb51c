// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::id::{JobId, OwnerId, RepoId, RunId, RunnerId, TaskId};
use crate::job::{Job, Run};
use crate::labels::LabelSet;
use crate::runner::Runner;
use crate::scope::Scope;
use crate::status::Status;
use crate::task::{Task, TaskLog, TaskStep};
use crate::token::SaltedToken;
use crate::Event;

/// Epoch used by fixtures; matches `FakeClock::new()`.
pub const FIXTURE_EPOCH_MS: u64 = 1_704_067_200_000;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core types.
pub mod strategies {
    use crate::status::Status;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = Status> {
        prop_oneof![
            Just(Status::Waiting),
            Just(Status::Blocked),
            Just(Status::Running),
            Just(Status::Success),
            Just(Status::Failure),
            Just(Status::Cancelled),
            Just(Status::Skipped),
        ]
    }

    /// Log rows as a runner would send them.
    pub fn arb_rows() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[ -~]{0,40}", 0..12)
    }
}

// ── Record fixtures ─────────────────────────────────────────────────────

/// Builder for `Job` records with test defaults (repo 1 of owner 1).
pub struct JobFixture {
    job: Job,
}

impl JobFixture {
    pub fn waiting(id: u64) -> Self {
        Self {
            job: Job {
                id: JobId::new(id),
                run_id: RunId::new(1),
                scope: Scope::repo(OwnerId::new(1), RepoId::new(1)),
                commit_sha: "c0ffee".into(),
                key: format!("job{id}"),
                name: format!("job {id}"),
                needs: Vec::new(),
                runs_on: LabelSet::new(),
                payload: String::new(),
                status: Status::Waiting,
                attempt: 0,
                max_attempts: 1,
                task_id: TaskId::NONE,
                started_at_ms: None,
                stopped_at_ms: None,
                created_at_ms: FIXTURE_EPOCH_MS,
                updated_at_ms: FIXTURE_EPOCH_MS,
            },
        }
    }

    pub fn run(mut self, run_id: u64) -> Self {
        self.job.run_id = RunId::new(run_id);
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.job.key = key.to_string();
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.job.scope = scope;
        self
    }

    pub fn runs_on(mut self, labels: &[&str]) -> Self {
        self.job.runs_on = labels.iter().collect();
        self
    }

    pub fn needs(mut self, ids: &[u64]) -> Self {
        self.job.needs = ids.iter().copied().map(JobId::new).collect();
        self.job.status = if ids.is_empty() { Status::Waiting } else { Status::Blocked };
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.job.status = status;
        self
    }

    pub fn max_attempts(mut self, max: u32) -> Self {
        self.job.max_attempts = max;
        self
    }

    pub fn payload(mut self, payload: &str) -> Self {
        self.job.payload = payload.to_string();
        self
    }

    pub fn updated_at(mut self, ms: u64) -> Self {
        self.job.updated_at_ms = ms;
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

pub fn run(id: u64) -> Run {
    Run {
        id: RunId::new(id),
        scope: Scope::repo(OwnerId::new(1), RepoId::new(1)),
        commit_sha: "c0ffee".into(),
        title: format!("run {id}"),
        schedule_id: None,
        created_at_ms: FIXTURE_EPOCH_MS,
    }
}

/// A global runner with the given labels; returns the plaintext secret too.
pub fn runner(id: u64, labels: &[&str]) -> (Runner, String) {
    let (token, secret) = SaltedToken::generate();
    let runner = Runner {
        id: RunnerId::new(id),
        uuid: format!("00000000-0000-4000-8000-{id:012}"),
        name: format!("runner-{id}"),
        scope: Scope::global(),
        labels: labels.iter().collect(),
        version: "v1.0.0".into(),
        secret,
        created_at_ms: FIXTURE_EPOCH_MS,
        updated_at_ms: FIXTURE_EPOCH_MS,
    };
    (runner, token)
}

/// A running task for `job`; returns the plaintext token too.
pub fn task_for(id: u64, job: &Job, runner_id: u64) -> (Task, String) {
    let (token, salted) = SaltedToken::generate();
    let task = Task {
        id: TaskId::new(id),
        job_id: job.id,
        attempt: job.attempt + 1,
        runner_id: RunnerId::new(runner_id),
        status: Status::Running,
        scope: job.scope,
        commit_sha: job.commit_sha.clone(),
        token: salted,
        started_at_ms: FIXTURE_EPOCH_MS,
        stopped_at_ms: None,
        updated_at_ms: FIXTURE_EPOCH_MS,
        log: TaskLog { filename: format!("1/1/{:02x}/{id}.log", id % 256), ..TaskLog::default() },
    };
    (task, token)
}

pub fn steps_for(task_id: u64, names: &[&str]) -> Vec<TaskStep> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| TaskStep {
            task_id: TaskId::new(task_id),
            index: i as u32,
            name: name.to_string(),
            status: Status::Waiting,
            started_at_ms: None,
            stopped_at_ms: None,
            log_index: 0,
            log_length: 0,
        })
        .collect()
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn run_created_event(run_id: u64, jobs: Vec<Job>) -> Event {
    Event::RunCreated { run: run(run_id), jobs }
}

pub fn job_claimed_event(task: Task, steps: Vec<TaskStep>) -> Event {
    Event::JobClaimed { task, steps }
}
