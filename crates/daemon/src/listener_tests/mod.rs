// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::DateTime;
use drover_adapters::{
    FakeArchive, FakeNotifyAdapter, FakeStatusPublisher, JsonWorkflowParser, ScheduleCronParser,
};
use drover_core::{FakeClock, JobSpec, OwnerId, RepoId, Scope, TaskId, TaskResult};
use drover_engine::{CoordinatorDeps, EngineConfig, LogSinks, TokenCache};
use drover_storage::Store;
use drover_wire::{LogLine, RunnerAuth, RunnerInfo, TaskInfo, TaskState};
use std::collections::BTreeMap;
use tempfile::TempDir;

mod connection;
mod requests;

type TestCtx = ListenCtx<FakeArchive, FakeStatusPublisher, FakeNotifyAdapter, FakeClock>;

const REG_TOKEN: &str = "reg-0123456789";

struct Harness {
    ctx: TestCtx,
    archive: FakeArchive,
    publisher: FakeStatusPublisher,
    _dir: TempDir,
}

fn repo_scope() -> Scope {
    Scope::repo(OwnerId::new(1), RepoId::new(1))
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let archive = FakeArchive::new();
    let publisher = FakeStatusPublisher::new();
    let deps = CoordinatorDeps {
        store: Store::in_memory(),
        archive: archive.clone(),
        publisher: publisher.clone(),
        notifier: FakeNotifyAdapter::new(),
        parser: Arc::new(JsonWorkflowParser),
        cron: Arc::new(ScheduleCronParser),
        sinks: LogSinks::new(dir.path().join("logs")),
    };
    let coord = Coordinator::new(deps, EngineConfig::default(), TokenCache::new(16), FakeClock::new());
    let ctx = ListenCtx {
        coord: Arc::new(coord),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
        ipc_timeout: Duration::from_secs(2),
    };
    Harness { ctx, archive, publisher, _dir: dir }
}

fn build_job(key: &str, needs: &[&str]) -> JobSpec {
    let payload = serde_json::json!({ "steps": [{ "name": "build" }] }).to_string();
    JobSpec::builder(key).payload(payload).needs(needs.iter().copied()).build()
}

fn line(content: &str) -> LogLine {
    LogLine { time: DateTime::from_timestamp(1_704_067_200, 0).unwrap(), content: content.into() }
}

impl Harness {
    async fn admin(&self, request: Request) -> Response {
        handle_request(request, ConnectionSource::Unix, &self.ctx).await
    }

    async fn remote(&self, request: Request) -> Response {
        handle_request(request, ConnectionSource::Tcp, &self.ctx).await
    }

    /// Issue the registration token and register a runner over TCP.
    async fn register(&self, labels: &[&str]) -> RunnerAuth {
        let issued = self
            .admin(Request::PutRegistrationToken { token: REG_TOKEN.into(), scope: repo_scope() })
            .await;
        assert_eq!(issued, Response::Ok);

        let response = self
            .remote(Request::Register {
                token: REG_TOKEN.into(),
                name: "runner-1".into(),
                version: "v1.0.0".into(),
                labels: labels.iter().map(|l| l.to_string()).collect(),
            })
            .await;
        match response {
            Response::Runner { runner: RunnerInfo { uuid, token: Some(token), .. } } => {
                RunnerAuth { uuid, token }
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    async fn create_run(&self, jobs: Vec<JobSpec>) -> drover_wire::RunInfo {
        let response = self
            .admin(Request::CreateRun {
                scope: repo_scope(),
                commit_sha: "c0ffee".into(),
                title: "push to main".into(),
                jobs,
            })
            .await;
        match response {
            Response::RunCreated { run } => run,
            other => panic!("unexpected response: {other:?}"),
        }
    }

    async fn fetch(&self, auth: &RunnerAuth) -> Option<TaskInfo> {
        match self.remote(Request::FetchTask { auth: auth.clone(), tasks_version: 0 }).await {
            Response::Task { task, .. } => task.map(|t| *t),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    async fn finish(&self, auth: &RunnerAuth, id: TaskId, result: TaskResult) -> Response {
        let state = TaskState { id, result, ..TaskState::default() };
        self.remote(Request::UpdateTask { auth: auth.clone(), state, outputs: BTreeMap::new() }).await
    }
}

fn error_code(response: &Response) -> Option<ErrorCode> {
    match response {
        Response::Error { code, .. } => Some(*code),
        _ => None,
    }
}
