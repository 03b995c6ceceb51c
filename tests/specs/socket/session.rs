// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A runner session against a started daemon over its Unix socket.

use std::sync::Arc;

use drover_daemon::{startup, Config, ListenCtx, Listener, StartupResult};
use drover_wire::{Request, Response, RunnerAuth, TaskState};
use tokio::net::UnixStream;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn call(config: &Config, request: Request) -> Response {
    let stream = UnixStream::connect(&config.socket_path).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    drover_wire::write_request(&mut writer, &request, TIMEOUT).await.unwrap();
    drover_wire::read_response(&mut reader, TIMEOUT).await.unwrap()
}

#[tokio::test]
async fn runner_session_over_the_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::at(dir.path());
    let StartupResult { mut daemon, unix, tcp } = startup(&config).await.unwrap();

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        coord: Arc::clone(&daemon.coordinator),
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
        ipc_timeout: TIMEOUT,
    });
    let cancel = CancellationToken::new();
    let listener = tokio::spawn(Listener::new(unix, tcp, ctx).run(cancel.clone()));

    assert_eq!(call(&config, Request::Ping).await, Response::Pong);
    let issued = call(&config, Request::PutRegistrationToken { token: REG_TOKEN.into(), scope: repo_scope() }).await;
    assert_eq!(issued, Response::Ok);

    let registered = call(
        &config,
        Request::Register { token: REG_TOKEN.into(), name: "socket-runner".into(), version: "v1".into(), labels: vec![] },
    )
    .await;
    let Response::Runner { runner } = registered else { panic!("unexpected: {registered:?}") };
    let auth = RunnerAuth { uuid: runner.uuid, token: runner.token.unwrap() };

    let created = call(
        &config,
        Request::CreateRun { scope: repo_scope(), commit_sha: "5eed".into(), title: "push".into(), jobs: vec![job("build", &[])] },
    )
    .await;
    assert!(matches!(created, Response::RunCreated { .. }));

    let fetched = call(&config, Request::FetchTask { auth: auth.clone(), tasks_version: 0 }).await;
    let Response::Task { task: Some(task), tasks_version } = fetched else { panic!("unexpected: {fetched:?}") };
    assert!(tasks_version > 0);

    // Nothing new at the same version
    let idle = call(&config, Request::FetchTask { auth: auth.clone(), tasks_version }).await;
    assert!(matches!(idle, Response::Task { task: None, .. }));

    let state = TaskState { id: task.id, result: TaskResult::Success, ..TaskState::default() };
    let updated = call(&config, Request::UpdateTask { auth, state, outputs: BTreeMap::new() }).await;
    assert!(matches!(updated, Response::TaskUpdated { result: TaskResult::Success, .. }));

    assert_eq!(call(&config, Request::Shutdown).await, Response::ShuttingDown);
    tokio::time::timeout(TIMEOUT, shutdown.notified()).await.unwrap();
    cancel.cancel();
    listener.await.unwrap();
    daemon.shutdown().unwrap();

    assert!(!config.socket_path.exists());
    assert!(config.snapshot_path.exists());
}
