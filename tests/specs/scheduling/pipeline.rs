// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run pipelines: claiming, dependency resolution and result propagation.

use crate::prelude::*;

#[tokio::test]
async fn success_unblocks_dependents_in_order() {
    let world = World::new();
    let runner = world.register("builder", &["linux"]);
    let (_, ids) = world
        .submit(vec![job("build", &[]), job("test", &["build"]), job("deploy", &["build", "test"])])
        .await;

    let build = world.fetch(&runner).await.unwrap();
    assert_eq!(build.job_id, ids[0]);
    assert_eq!(build.steps, vec!["checkout".to_string(), "test".to_string()]);
    assert!(world.fetch(&runner).await.is_none(), "test is still blocked");

    world.report(&runner, build.task_id, TaskResult::Success).await;
    assert_eq!(world.job_status(ids[0]), Status::Success);
    assert_eq!(world.job_status(ids[1]), Status::Waiting);
    assert_eq!(world.job_status(ids[2]), Status::Blocked);

    let test = world.fetch(&runner).await.unwrap();
    assert_eq!(test.job_id, ids[1]);
    assert_eq!(test.needs["build"].result, TaskResult::Success);
    world.report(&runner, test.task_id, TaskResult::Success).await;

    let deploy = world.fetch(&runner).await.unwrap();
    assert_eq!(deploy.job_id, ids[2]);
    assert_eq!(deploy.needs.len(), 2);
    world.report(&runner, deploy.task_id, TaskResult::Success).await;

    assert_eq!(world.coord.run_status(build.run_id).unwrap(), Status::Success);
    assert_eq!(world.notifier.calls().len(), 3);
}

#[tokio::test]
async fn failure_skips_the_dependency_cascade() {
    let world = World::new();
    let runner = world.register("builder", &[]);
    let (run_id, ids) = world
        .submit(vec![job("build", &[]), job("test", &["build"]), job("deploy", &["test"]), job("lint", &[])])
        .await;

    let build = world.fetch(&runner).await.unwrap();
    world.report(&runner, build.task_id, TaskResult::Failure).await;

    assert_eq!(world.job_status(ids[1]), Status::Skipped);
    assert_eq!(world.job_status(ids[2]), Status::Skipped);
    assert_eq!(world.job_status(ids[3]), Status::Waiting);

    let lint = world.fetch(&runner).await.unwrap();
    assert_eq!(lint.job_id, ids[3]);
    world.report(&runner, lint.task_id, TaskResult::Success).await;
    assert_eq!(world.coord.run_status(run_id).unwrap(), Status::Failure);
}

#[tokio::test]
async fn each_job_is_claimed_once_across_runners() {
    let world = World::new();
    let runners: Vec<Runner> = (0..4).map(|i| world.register(&format!("r{i}"), &[])).collect();
    world.submit((0..3).map(|i| job(&format!("shard-{i}"), &[])).collect()).await;

    let mut claimed = Vec::new();
    for runner in &runners {
        if let Some(task) = world.fetch(runner).await {
            claimed.push(task.job_id);
        }
    }
    claimed.sort();
    claimed.dedup();
    assert_eq!(claimed.len(), 3);
    for runner in &runners {
        assert!(world.fetch(runner).await.is_none());
    }
}

#[tokio::test]
async fn runners_only_take_jobs_their_labels_satisfy() {
    let world = World::new();
    let plain = world.register("plain", &["linux"]);
    let gpu = world.register("gpu", &["linux", "gpu"]);
    let spec = JobSpec::builder("train")
        .payload(steps_payload(&["train"]))
        .runs_on(["gpu", "linux"].into_iter().collect())
        .build();
    world.submit(vec![spec]).await;

    assert!(world.fetch(&plain).await.is_none());
    assert_eq!(world.fetch(&gpu).await.unwrap().job_key, "train");
}

#[tokio::test]
async fn commit_statuses_are_published_for_each_transition() {
    let world = World::new();
    let runner = world.register("builder", &[]);
    world.submit(vec![job("build", &[])]).await;
    let task = world.fetch(&runner).await.unwrap();
    world.report(&runner, task.task_id, TaskResult::Success).await;

    let states: Vec<Status> = world.publisher.published().iter().map(|p| p.state).collect();
    assert_eq!(states.first(), Some(&Status::Waiting));
    assert!(states.contains(&Status::Running));
    assert_eq!(states.last(), Some(&Status::Success));
}
