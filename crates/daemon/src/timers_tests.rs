// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_adapters::{
    FakeArchive, FakeNotifyAdapter, FakeStatusPublisher, JsonWorkflowParser, ScheduleCronParser,
};
use drover_core::{FakeClock, JobSpec, OwnerId, RepoId, Scope, Status};
use drover_engine::{CoordinatorDeps, EngineConfig, LogSinks, TokenCache};
use drover_storage::{NewRun, Store};

type TestCoordinator = Coordinator<FakeArchive, FakeStatusPublisher, FakeNotifyAdapter, FakeClock>;

const TICK: Duration = Duration::from_millis(10);

fn coordinator(store: Store, dir: &std::path::Path, clock: FakeClock) -> Arc<TestCoordinator> {
    let deps = CoordinatorDeps {
        store,
        archive: FakeArchive::new(),
        publisher: FakeStatusPublisher::new(),
        notifier: FakeNotifyAdapter::new(),
        parser: Arc::new(JsonWorkflowParser),
        cron: Arc::new(ScheduleCronParser),
        sinks: LogSinks::new(dir.join("logs")),
    };
    Arc::new(Coordinator::new(deps, EngineConfig::default(), TokenCache::disabled(), clock))
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(TICK).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn loops_exit_on_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let coord = coordinator(Store::in_memory(), dir.path(), FakeClock::new());
    let cancel = CancellationToken::new();

    let handles = [
        tokio::spawn(reaper_loop(Arc::clone(&coord), Duration::from_secs(3600), cancel.clone())),
        tokio::spawn(schedule_loop(Arc::clone(&coord), Duration::from_secs(3600), cancel.clone())),
        tokio::spawn(checkpoint_loop(Arc::clone(&coord), Duration::from_secs(3600), cancel.clone())),
    ];
    cancel.cancel();
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn reaper_loop_cancels_abandoned_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let coord = coordinator(Store::in_memory(), dir.path(), clock.clone());
    let (_, jobs) = coord
        .create_run(NewRun {
            scope: Scope::repo(OwnerId::new(1), RepoId::new(1)),
            commit_sha: "c0ffee".into(),
            title: "push".into(),
            schedule_id: None,
            jobs: vec![JobSpec::builder("build").build()],
        })
        .await
        .unwrap();
    clock.advance(EngineConfig::default().abandoned_job_timeout + Duration::from_secs(1));

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(reaper_loop(Arc::clone(&coord), TICK, cancel.clone()));
    let job_id = jobs[0].id;
    eventually(|| coord.store().read(|s| s.job(job_id).map(|j| j.status)) == Some(Status::Cancelled)).await;
    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn checkpoint_loop_writes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let wal = dir.path().join("wal").join("events.wal");
    let snapshot = dir.path().join("snapshot.json");
    std::fs::create_dir_all(wal.parent().unwrap()).unwrap();
    let store = Store::open(&wal, &snapshot).unwrap();
    let coord = coordinator(store, dir.path(), FakeClock::new());
    coord.put_registration_token("reg", Scope::repo(OwnerId::new(1), RepoId::new(1))).unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(checkpoint_loop(Arc::clone(&coord), TICK, cancel.clone()));
    eventually(|| snapshot.exists()).await;
    cancel.cancel();
    handle.await.unwrap();
}
