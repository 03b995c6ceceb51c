// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{MAX_OUTPUT_KEY_LEN, MAX_OUTPUT_VALUE_LEN};
use drover_core::StepReport;

#[tokio::test]
async fn success_unblocks_dependents() {
    let h = harness();
    let runner = h.register(&[]);
    let (run_id, jobs) =
        h.submit(vec![job("build"), JobSpec::builder("test").needs(["build"]).build()]).await;
    assert_eq!(h.job(jobs[1]).status, Status::Blocked);

    let task = h.fetch(&runner).await.unwrap();
    let ack = h.finish(&runner, task.task_id, TaskResult::Success).await;

    assert_eq!(ack.result, TaskResult::Success);
    assert_eq!(h.job(jobs[0]).status, Status::Success);
    assert_eq!(h.job(jobs[1]).status, Status::Waiting);
    assert_eq!(h.coord.run_status(run_id).unwrap(), Status::Waiting);
    assert_eq!(h.notifier.calls().len(), 1);
}

#[tokio::test]
async fn failure_skips_dependents_transitively() {
    let h = harness();
    let runner = h.register(&[]);
    let (_, jobs) = h
        .submit(vec![
            job("build"),
            JobSpec::builder("test").needs(["build"]).build(),
            JobSpec::builder("deploy").needs(["test"]).build(),
        ])
        .await;

    let task = h.fetch(&runner).await.unwrap();
    h.finish(&runner, task.task_id, TaskResult::Failure).await;

    assert_eq!(h.job(jobs[0]).status, Status::Failure);
    assert_eq!(h.job(jobs[1]).status, Status::Skipped);
    assert_eq!(h.job(jobs[2]).status, Status::Skipped);
}

#[tokio::test]
async fn heartbeat_touches_task_and_applies_steps() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();
    let before = h.task(task.task_id).updated_at_ms;

    h.clock.advance(std::time::Duration::from_secs(30));
    let update = TaskStateUpdate {
        task_id: task.task_id,
        result: TaskResult::Unspecified,
        stopped_at_ms: None,
        steps: vec![StepReport { index: 0, started_at_ms: Some(before), ..StepReport::default() }],
    };
    let ack = h.coord.update_task(&runner, update, BTreeMap::new()).await.unwrap();

    assert_eq!(ack.result, TaskResult::Unspecified);
    let stored = h.task(task.task_id);
    assert_eq!(stored.status, Status::Running);
    assert!(stored.updated_at_ms > before);
    let steps = h.coord.store().read(|s| s.steps(task.task_id).to_vec());
    assert_eq!(steps[0].status, Status::Running);
    assert_eq!(steps[1].status, Status::Waiting);
    assert!(h.notifier.calls().is_empty());
}

#[tokio::test]
async fn update_of_finished_task_is_acknowledged_only() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();
    h.finish(&runner, task.task_id, TaskResult::Success).await;
    let published = h.publisher.published().len();

    let ack = h.finish(&runner, task.task_id, TaskResult::Failure).await;

    assert_eq!(ack.result, TaskResult::Success);
    assert_eq!(h.task(task.task_id).status, Status::Success);
    assert_eq!(h.publisher.published().len(), published);
    assert_eq!(h.notifier.calls().len(), 1);
}

#[tokio::test]
async fn update_from_other_runner_is_unauthenticated() {
    let h = harness();
    let owner = h.register(&[]);
    let intruder = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&owner).await.unwrap();

    let update = TaskStateUpdate {
        task_id: task.task_id,
        result: TaskResult::Success,
        stopped_at_ms: None,
        steps: Vec::new(),
    };
    let err = h.coord.update_task(&intruder, update, BTreeMap::new()).await.unwrap_err();
    assert_eq!(err.code(), "unauthenticated");
    assert_eq!(h.task(task.task_id).status, Status::Running);
}

#[tokio::test]
async fn update_of_unknown_task_is_not_found() {
    let h = harness();
    let runner = h.register(&[]);
    let update = TaskStateUpdate {
        task_id: TaskId::new(404),
        result: TaskResult::Success,
        stopped_at_ms: None,
        steps: Vec::new(),
    };
    let err = h.coord.update_task(&runner, update, BTreeMap::new()).await.unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn outputs_are_insert_if_absent_and_oversized_dropped() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();
    let heartbeat = || TaskStateUpdate {
        task_id: task.task_id,
        result: TaskResult::Unspecified,
        stopped_at_ms: None,
        steps: Vec::new(),
    };

    let first = BTreeMap::from([
        ("version".to_string(), "1.0".to_string()),
        ("k".repeat(MAX_OUTPUT_KEY_LEN + 1), "v".to_string()),
        ("big".to_string(), "x".repeat(MAX_OUTPUT_VALUE_LEN + 1)),
    ]);
    let ack = h.coord.update_task(&runner, heartbeat(), first).await.unwrap();
    assert_eq!(ack.sent_outputs, vec!["version".to_string()]);

    let second = BTreeMap::from([
        ("version".to_string(), "2.0".to_string()),
        ("digest".to_string(), "sha256:ab".to_string()),
    ]);
    let ack = h.coord.update_task(&runner, heartbeat(), second).await.unwrap();
    assert_eq!(ack.sent_outputs, vec!["digest".to_string(), "version".to_string()]);

    let outputs = h.coord.store().read(|s| s.outputs(task.task_id).cloned()).unwrap();
    assert_eq!(outputs["version"], "1.0");
}

#[tokio::test]
async fn scheduled_runs_publish_no_statuses() {
    let h = harness();
    let runner = h.register(&[]);
    let new = NewRun {
        scope: repo_scope(),
        commit_sha: "c0ffee".into(),
        title: "nightly".into(),
        schedule_id: Some(drover_core::ScheduleId::new(1)),
        jobs: vec![job("build")],
    };
    h.coord.create_run(new).await.unwrap();
    let task = h.fetch(&runner).await.unwrap();
    h.finish(&runner, task.task_id, TaskResult::Success).await;

    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn collaborator_failures_do_not_fail_the_update() {
    let h = harness();
    let runner = h.register(&[]);
    let (_, jobs) = h.submit(vec![job("build"), JobSpec::builder("test").needs(["build"]).build()]).await;
    let task = h.fetch(&runner).await.unwrap();
    h.publisher.set_fail(true);
    h.notifier.set_fail(true);

    let ack = h.finish(&runner, task.task_id, TaskResult::Success).await;

    assert_eq!(ack.result, TaskResult::Success);
    assert_eq!(h.job(jobs[1]).status, Status::Waiting);
    assert!(h.notifier.calls().is_empty());
}
