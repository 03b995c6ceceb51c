// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn zombie_task_is_failed_and_log_archived() {
    let h = harness();
    let runner = h.register(&[]);
    let (_, jobs) = h.submit(vec![job("build"), JobSpec::builder("test").needs(["build"]).build()]).await;
    let task = h.fetch(&runner).await.unwrap();
    h.log(&runner, task.task_id, 0, &["started"], false).await.unwrap();

    h.clock.advance(Duration::from_secs(11 * 60));
    let report = h.coord.sweep().await;

    assert_eq!(report.zombie, 1);
    assert_eq!(report.requeued, 0);
    let stored = h.task(task.task_id);
    assert_eq!(stored.status, Status::Failure);
    assert!(stored.log.in_storage);
    assert_eq!(h.job(jobs[0]).status, Status::Failure);
    assert_eq!(h.job(jobs[1]).status, Status::Skipped);
    let steps = h.coord.store().read(|s| s.steps(task.task_id).to_vec());
    assert!(steps.iter().all(|s| s.status == Status::Failure));
}

#[tokio::test]
async fn heartbeat_keeps_task_alive() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();

    h.clock.advance(Duration::from_secs(9 * 60));
    h.finish(&runner, task.task_id, TaskResult::Unspecified).await;
    h.clock.advance(Duration::from_secs(9 * 60));

    assert!(h.coord.sweep().await.is_empty());
    assert_eq!(h.task(task.task_id).status, Status::Running);
}

#[tokio::test]
async fn streaming_logs_keeps_task_alive() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();

    for i in 0..11 {
        h.clock.advance(Duration::from_secs(60));
        h.log(&runner, task.task_id, i, &["tick"], false).await.unwrap();
    }
    let report = h.coord.sweep().await;

    assert_eq!(report.zombie, 0);
    assert_eq!(h.task(task.task_id).status, Status::Running);
    assert_eq!(h.task(task.task_id).updated_at_ms, h.clock.epoch_ms());
}

#[tokio::test]
async fn endless_task_is_failed_despite_heartbeats() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();

    for _ in 0..20 {
        h.clock.advance(Duration::from_secs(9 * 60 + 30));
        h.finish(&runner, task.task_id, TaskResult::Unspecified).await;
    }
    let report = h.coord.sweep().await;

    assert_eq!(report.zombie, 0);
    assert_eq!(report.endless, 1);
    assert_eq!(h.task(task.task_id).status, Status::Failure);
}

#[tokio::test]
async fn stopped_task_with_attempts_left_is_requeued() {
    let h = harness();
    let runner = h.register(&[]);
    let retrying = JobSpec::builder("flaky").payload(steps_payload(&["run"])).max_attempts(2).build();
    let (_, jobs) = h.submit(vec![retrying]).await;
    let first = h.fetch(&runner).await.unwrap();

    h.clock.advance(Duration::from_secs(11 * 60));
    let report = h.coord.sweep().await;
    assert_eq!(report.requeued, 1);
    assert_eq!(h.job(jobs[0]).status, Status::Waiting);

    let second = h.fetch(&runner).await.unwrap();
    assert_eq!(second.attempt, 2);
    assert_ne!(second.task_id, first.task_id);

    // The first attempt can no longer move the job.
    h.finish(&runner, first.task_id, TaskResult::Success).await;
    assert_eq!(h.job(jobs[0]).status, Status::Running);
}

#[tokio::test]
async fn abandoned_jobs_are_cancelled_with_dependents() {
    let h = harness();
    let (_, jobs) = h.submit(vec![job("build"), JobSpec::builder("test").needs(["build"]).build()]).await;

    h.clock.advance(Duration::from_secs(25 * 3600));
    let report = h.coord.sweep().await;

    assert!(report.abandoned >= 1);
    assert_eq!(h.job(jobs[0]).status, Status::Cancelled);
    assert!(matches!(h.job(jobs[1]).status, Status::Cancelled | Status::Skipped));
    let published: Vec<Status> = h.publisher.published().iter().map(|p| p.state).collect();
    assert!(published.contains(&Status::Cancelled));
}

#[tokio::test]
async fn batch_size_bounds_each_pass() {
    let h = harness_with(EngineConfig { reaper_batch_size: 2, ..EngineConfig::default() });
    h.submit(vec![job("a"), job("b"), job("c")]).await;

    h.clock.advance(Duration::from_secs(25 * 3600));
    assert_eq!(h.coord.sweep().await.abandoned, 2);
    assert_eq!(h.coord.sweep().await.abandoned, 1);
}

#[tokio::test]
async fn expired_logs_are_deleted_from_archive() {
    let h = harness_with(EngineConfig { log_retention: Duration::from_secs(3600), ..EngineConfig::default() });
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();
    h.log(&runner, task.task_id, 0, &["done"], true).await.unwrap();
    h.finish(&runner, task.task_id, TaskResult::Success).await;
    let filename = h.task(task.task_id).log.filename;
    assert!(h.archive.object(&filename).is_some());

    h.clock.advance(Duration::from_secs(2 * 3600));
    let report = h.coord.sweep().await;

    assert_eq!(report.logs_expired, 1);
    assert!(h.archive.object(&filename).is_none());
    let log = h.task(task.task_id).log;
    assert!(log.expired);
    assert!(log.indexes.is_empty());
    assert_eq!(h.coord.read_log(task.task_id).await.unwrap_err().code(), "not_found");
}
