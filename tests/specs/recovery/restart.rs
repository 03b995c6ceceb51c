// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State survives a restart through WAL replay and snapshots.

use crate::prelude::*;

#[tokio::test]
async fn wal_replay_restores_claims_and_credentials() {
    let world = World::new();
    let runner = world.register("builder", &[]);
    let (_, ids) = world.submit(vec![job("build", &[]), job("test", &["build"])]).await;
    let task = world.fetch(&runner).await.unwrap();
    world.log(&runner, task.task_id, 0, &["a", "b"], false).await.unwrap();

    let world = world.restart();

    // Runner credentials and the task token still verify
    let auth = world.coord.authenticate_task_token(&task.token).unwrap();
    assert_eq!(auth.id, task.task_id);
    assert_eq!(world.job_status(ids[0]), Status::Running);
    assert_eq!(world.job_status(ids[1]), Status::Blocked);

    // The log continues from the persisted ack
    assert_eq!(world.log(&runner, task.task_id, 0, &["a", "b", "c"], false).await.unwrap(), 3);
    world.report(&runner, task.task_id, TaskResult::Success).await;
    assert_eq!(world.fetch(&runner).await.unwrap().job_id, ids[1]);
}

#[tokio::test]
async fn checkpoint_then_replay_of_later_transactions() {
    let world = World::new();
    let runner = world.register("builder", &[]);
    let (_, first) = world.submit(vec![job("build", &[])]).await;
    let seq = world.coord.store().checkpoint().unwrap();
    assert!(seq.is_some());

    let (_, second) = world.submit(vec![job("lint", &[])]).await;
    let task = world.fetch(&runner).await.unwrap();
    assert_eq!(task.job_id, first[0]);

    let world = world.restart();
    assert_eq!(world.job_status(first[0]), Status::Running);
    assert_eq!(world.job_status(second[0]), Status::Waiting);
    assert_eq!(world.coord.status_summary().runs, 2);

    let wal = std::fs::read_to_string(world.dir.path().join("wal").join("events.wal")).unwrap();
    for line in wal.lines() {
        let entry: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(entry["seq"].as_u64().unwrap() > seq.unwrap());
        assert!(entry["events"].is_array());
    }
}

#[tokio::test]
async fn ids_keep_increasing_after_restart() {
    let world = World::new();
    let (run_a, _) = world.submit(vec![job("build", &[])]).await;
    let world = world.restart();
    let (run_b, _) = world.submit(vec![job("build", &[])]).await;
    assert!(run_b > run_a);
}
