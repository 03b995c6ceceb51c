// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reaper sweeps over silent, overlong and abandoned work.

use crate::prelude::*;

#[tokio::test]
async fn silent_task_is_failed_and_dependents_skipped() {
    let world = World::new();
    let runner = world.register("flaky", &[]);
    let (run_id, ids) = world.submit(vec![job("build", &[]), job("test", &["build"])]).await;
    let task = world.fetch(&runner).await.unwrap();
    world.log(&runner, task.task_id, 0, &["started"], false).await.unwrap();

    world.clock.advance(Duration::from_secs(11 * 60));
    let report = world.coord.sweep().await;
    assert_eq!(report.zombie, 1);
    assert_eq!(report.requeued, 0);

    assert_eq!(world.job_status(ids[0]), Status::Failure);
    assert_eq!(world.job_status(ids[1]), Status::Skipped);
    assert_eq!(world.coord.run_status(run_id).unwrap(), Status::Failure);

    // The partial log was archived on the way out
    let log = world.coord.read_log(task.task_id).await.unwrap();
    assert!(String::from_utf8(log).unwrap().ends_with(" started\n"));
}

#[tokio::test]
async fn stopped_task_with_attempts_left_is_retried() {
    let world = World::new();
    let first = world.register("first", &[]);
    let second = world.register("second", &[]);
    let spec = JobSpec::builder("build").payload(steps_payload(&["build"])).max_attempts(2).build();
    let (_, ids) = world.submit(vec![spec]).await;

    let lost = world.fetch(&first).await.unwrap();
    assert_eq!(lost.attempt, 1);
    world.clock.advance(Duration::from_secs(11 * 60));
    let report = world.coord.sweep().await;
    assert_eq!(report.requeued, 1);
    assert_eq!(world.job_status(ids[0]), Status::Waiting);

    let retry = world.fetch(&second).await.unwrap();
    assert_eq!(retry.job_id, ids[0]);
    assert_eq!(retry.attempt, 2);
    assert_ne!(retry.task_id, lost.task_id);

    // The stale task can no longer report
    let stale = TaskStateUpdate { task_id: lost.task_id, result: TaskResult::Success, stopped_at_ms: None, steps: Vec::new() };
    let ack = world.coord.update_task(&first, stale, BTreeMap::new()).await.unwrap();
    assert_eq!(ack.result, TaskResult::Failure);

    world.report(&second, retry.task_id, TaskResult::Success).await;
    assert_eq!(world.job_status(ids[0]), Status::Success);
}

#[tokio::test]
async fn heartbeats_keep_a_task_alive_until_the_endless_limit() {
    let world = World::new();
    let runner = world.register("steady", &[]);
    let (_, ids) = world.submit(vec![job("soak", &[])]).await;
    let task = world.fetch(&runner).await.unwrap();

    for _ in 0..40 {
        world.clock.advance(Duration::from_secs(5 * 60));
        world.report(&runner, task.task_id, TaskResult::Unspecified).await;
        let report = world.coord.sweep().await;
        assert_eq!(report.zombie, 0);
        if report.endless > 0 {
            assert_eq!(world.job_status(ids[0]), Status::Failure);
            return;
        }
    }
    panic!("endless task was never stopped");
}

#[tokio::test]
async fn untouched_waiting_job_is_cancelled() {
    let world = World::new();
    let (run_id, ids) = world.submit(vec![job("build", &[]), job("test", &["build"])]).await;

    world.clock.advance(Duration::from_secs(25 * 3600));
    let report = world.coord.sweep().await;
    assert!(report.abandoned >= 1);
    assert_eq!(world.job_status(ids[0]), Status::Cancelled);
    assert_ne!(world.job_status(ids[1]), Status::Blocked);
    assert_ne!(world.coord.run_status(run_id).unwrap(), Status::Waiting);
}
