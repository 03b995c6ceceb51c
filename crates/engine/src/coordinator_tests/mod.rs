// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{
    EngineConfig, LogChunk, LogRow, LogSinks, ServiceError, TaskPayload, TaskStateUpdate,
    TaskUpdateAck, TokenCache,
};
use chrono::DateTime;
use drover_adapters::{
    FakeArchive, FakeNotifyAdapter, FakeStatusPublisher, JsonWorkflowParser, ScheduleCronParser,
};
use drover_core::{
    FakeClock, JobId, JobSpec, OwnerId, RepoId, RunId, Runner, Scope, TaskId, TaskResult,
};
use drover_storage::NewRun;
use std::collections::BTreeMap;
use tempfile::TempDir;

mod assign;
mod logs;
mod reaper;
mod registry;
mod schedule;
mod update;

type TestCoordinator = Coordinator<FakeArchive, FakeStatusPublisher, FakeNotifyAdapter, FakeClock>;

const REG_TOKEN: &str = "reg-0123456789";

struct Harness {
    coord: TestCoordinator,
    archive: FakeArchive,
    publisher: FakeStatusPublisher,
    notifier: FakeNotifyAdapter,
    clock: FakeClock,
    dir: TempDir,
}

fn repo_scope() -> Scope {
    Scope::repo(OwnerId::new(1), RepoId::new(1))
}

fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

fn harness_with(config: EngineConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let archive = FakeArchive::new();
    let publisher = FakeStatusPublisher::new();
    let notifier = FakeNotifyAdapter::new();
    let clock = FakeClock::new();
    let deps = CoordinatorDeps {
        store: Store::in_memory(),
        archive: archive.clone(),
        publisher: publisher.clone(),
        notifier: notifier.clone(),
        parser: Arc::new(JsonWorkflowParser),
        cron: Arc::new(ScheduleCronParser),
        sinks: LogSinks::new(dir.path().join("logs")),
    };
    let tokens = TokenCache::new(config.token_cache_size);
    let coord = Coordinator::new(deps, config, tokens, clock.clone());
    coord.put_registration_token(REG_TOKEN, repo_scope()).unwrap();
    Harness { coord, archive, publisher, notifier, clock, dir }
}

/// A workflow payload with the given step names.
fn steps_payload(names: &[&str]) -> String {
    let steps: Vec<_> = names.iter().map(|n| serde_json::json!({ "name": n })).collect();
    serde_json::json!({ "steps": steps }).to_string()
}

fn job(key: &str) -> JobSpec {
    JobSpec::builder(key).payload(steps_payload(&["checkout", "build"])).build()
}

fn row(content: &str) -> LogRow {
    LogRow { time: DateTime::from_timestamp(1_704_067_200, 5).unwrap(), content: content.into() }
}

fn rows(contents: &[&str]) -> Vec<LogRow> {
    contents.iter().map(|c| row(c)).collect()
}

impl Harness {
    fn register(&self, labels: &[&str]) -> Runner {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        self.coord.register_runner(REG_TOKEN, "runner-1", "v1.0.0", &labels).unwrap().runner
    }

    async fn submit(&self, jobs: Vec<JobSpec>) -> (RunId, Vec<JobId>) {
        let new = NewRun {
            scope: repo_scope(),
            commit_sha: "c0ffee".into(),
            title: "push to main".into(),
            schedule_id: None,
            jobs,
        };
        let (run, jobs) = self.coord.create_run(new).await.unwrap();
        (run.id, jobs.iter().map(|j| j.id).collect())
    }

    async fn fetch(&self, runner: &Runner) -> Option<TaskPayload> {
        self.coord.fetch_task(runner, 0).await.unwrap().task
    }

    async fn finish(&self, runner: &Runner, task_id: TaskId, result: TaskResult) -> TaskUpdateAck {
        let update = TaskStateUpdate { task_id, result, stopped_at_ms: None, steps: Vec::new() };
        self.coord.update_task(runner, update, BTreeMap::new()).await.unwrap()
    }

    async fn log(&self, runner: &Runner, task_id: TaskId, index: u64, contents: &[&str], no_more: bool) -> Result<u64, ServiceError> {
        let chunk = LogChunk { task_id, index, rows: rows(contents), no_more };
        self.coord.update_log(runner, chunk).await
    }

    fn job(&self, id: JobId) -> Job {
        self.coord.store().read(|s| s.job(id).cloned()).unwrap()
    }

    fn task(&self, id: TaskId) -> drover_core::Task {
        self.coord.store().read(|s| s.task(id).cloned()).unwrap()
    }
}

#[tokio::test]
async fn status_summary_counts_records() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build"), JobSpec::builder("test").needs(["build"]).build()]).await;
    h.fetch(&runner).await.unwrap();

    let summary = h.coord.status_summary();
    assert_eq!(summary.runners, 1);
    assert_eq!(summary.runs, 1);
    assert_eq!(summary.waiting_jobs, 0);
    assert_eq!(summary.blocked_jobs, 1);
    assert_eq!(summary.running_tasks, 1);
}

#[tokio::test]
async fn publishing_failures_do_not_fail_calls() {
    let h = harness();
    h.publisher.set_fail(true);
    let (_, jobs) = h.submit(vec![job("build")]).await;
    assert_eq!(h.job(jobs[0]).status, Status::Waiting);
}
