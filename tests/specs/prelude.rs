// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup: a coordinator over an on-disk store and archive, with fake
//! publisher and notifier and a controllable clock.

use std::path::PathBuf;
use std::sync::Arc;

pub use drover_adapters::{
    FakeNotifyAdapter, FakeStatusPublisher, FsArchive, JsonWorkflowParser, ScheduleCronParser,
};
pub use drover_core::{
    FakeClock, JobId, JobSpec, OwnerId, RepoId, RunId, Runner, Scope, Status, TaskId, TaskResult,
};
pub use drover_engine::{
    Coordinator, CoordinatorDeps, EngineConfig, LogChunk, LogCompression, LogRow, LogSinks,
    ServiceError, TaskPayload, TaskStateUpdate, TokenCache,
};
pub use drover_storage::{NewRun, Store};
pub use std::collections::BTreeMap;
pub use std::time::Duration;
use tempfile::TempDir;

pub type SpecCoordinator = Coordinator<FsArchive, FakeStatusPublisher, FakeNotifyAdapter, FakeClock>;

pub const REG_TOKEN: &str = "reg-spec-000001";

pub fn repo_scope() -> Scope {
    Scope::repo(OwnerId::new(10), RepoId::new(20))
}

/// A workflow payload with the given step names.
pub fn steps_payload(names: &[&str]) -> String {
    let steps: Vec<_> = names.iter().map(|n| serde_json::json!({ "name": n })).collect();
    serde_json::json!({ "steps": steps }).to_string()
}

pub fn job(key: &str, needs: &[&str]) -> JobSpec {
    JobSpec::builder(key)
        .payload(steps_payload(&["checkout", "test"]))
        .needs(needs.iter().copied())
        .build()
}

pub fn row(content: &str) -> LogRow {
    LogRow { time: chrono::DateTime::from_timestamp(1_704_067_200, 0).unwrap(), content: content.into() }
}

/// One scheduler instance over a state directory that outlives it.
pub struct World {
    pub dir: TempDir,
    pub coord: SpecCoordinator,
    pub publisher: FakeStatusPublisher,
    pub notifier: FakeNotifyAdapter,
    pub clock: FakeClock,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let clock = FakeClock::new();
        let (coord, publisher, notifier) = Self::open(dir.path().to_path_buf(), config, clock.clone());
        coord.put_registration_token(REG_TOKEN, repo_scope()).unwrap();
        Self { dir, coord, publisher, notifier, clock }
    }

    /// Drop the coordinator and open a fresh one over the same directory.
    pub fn restart(self) -> Self {
        let World { dir, coord, clock, .. } = self;
        let config = coord.config().clone();
        drop(coord);
        let (coord, publisher, notifier) = Self::open(dir.path().to_path_buf(), config, clock.clone());
        Self { dir, coord, publisher, notifier, clock }
    }

    fn open(
        root: PathBuf,
        config: EngineConfig,
        clock: FakeClock,
    ) -> (SpecCoordinator, FakeStatusPublisher, FakeNotifyAdapter) {
        std::fs::create_dir_all(root.join("wal")).unwrap();
        let store = Store::open(&root.join("wal").join("events.wal"), &root.join("snapshot.json")).unwrap();
        let publisher = FakeStatusPublisher::new();
        let notifier = FakeNotifyAdapter::new();
        let deps = CoordinatorDeps {
            store,
            archive: FsArchive::new(root.join("archive")),
            publisher: publisher.clone(),
            notifier: notifier.clone(),
            parser: Arc::new(JsonWorkflowParser),
            cron: Arc::new(ScheduleCronParser),
            sinks: LogSinks::new(root.join("logs")),
        };
        let tokens = TokenCache::new(config.token_cache_size);
        (Coordinator::new(deps, config, tokens, clock), publisher, notifier)
    }

    pub fn register(&self, name: &str, labels: &[&str]) -> Runner {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        self.coord.register_runner(REG_TOKEN, name, "v1.0.0", &labels).unwrap().runner
    }

    pub async fn submit(&self, jobs: Vec<JobSpec>) -> (RunId, Vec<JobId>) {
        let new = NewRun {
            scope: repo_scope(),
            commit_sha: "5eed".into(),
            title: "pull request #7".into(),
            schedule_id: None,
            jobs,
        };
        let (run, jobs) = self.coord.create_run(new).await.unwrap();
        (run.id, jobs.iter().map(|j| j.id).collect())
    }

    pub async fn fetch(&self, runner: &Runner) -> Option<TaskPayload> {
        self.coord.fetch_task(runner, 0).await.unwrap().task
    }

    pub async fn report(&self, runner: &Runner, task_id: TaskId, result: TaskResult) {
        let update = TaskStateUpdate { task_id, result, stopped_at_ms: None, steps: Vec::new() };
        self.coord.update_task(runner, update, BTreeMap::new()).await.unwrap();
    }

    pub async fn log(&self, runner: &Runner, task_id: TaskId, index: u64, rows: &[&str], no_more: bool) -> Result<u64, ServiceError> {
        let chunk = LogChunk { task_id, index, rows: rows.iter().map(|r| row(r)).collect(), no_more };
        self.coord.update_log(runner, chunk).await
    }

    pub fn job_status(&self, id: JobId) -> Status {
        self.coord.store().read(|s| s.job(id).map(|j| j.status)).unwrap()
    }
}
