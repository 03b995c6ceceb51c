// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::LabelSet;

#[tokio::test]
async fn fetch_initializes_version_and_returns_current() {
    let h = harness();
    let runner = h.register(&[]);

    let first = h.coord.fetch_task(&runner, 0).await.unwrap();
    assert!(first.task.is_none());
    assert_eq!(first.tasks_version, 1);

    // Same version: answered without a scan.
    let again = h.coord.fetch_task(&runner, first.tasks_version).await.unwrap();
    assert!(again.task.is_none());
    assert_eq!(again.tasks_version, 1);
}

#[tokio::test]
async fn new_waiting_job_changes_version() {
    let h = harness();
    let runner = h.register(&[]);
    let seen = h.coord.fetch_task(&runner, 0).await.unwrap().tasks_version;

    h.submit(vec![job("build")]).await;

    let fetched = h.coord.fetch_task(&runner, seen).await.unwrap();
    assert!(fetched.tasks_version > seen);
    assert!(fetched.task.is_some());
}

#[tokio::test]
async fn pick_returns_payload_with_steps_and_token() {
    let h = harness();
    let runner = h.register(&[]);
    let (run_id, jobs) = h.submit(vec![job("build")]).await;

    let task = h.fetch(&runner).await.unwrap();
    assert_eq!(task.job_id, jobs[0]);
    assert_eq!(task.run_id, run_id);
    assert_eq!(task.job_key, "build");
    assert_eq!(task.attempt, 1);
    assert_eq!(task.steps, vec!["checkout".to_string(), "build".to_string()]);
    assert_eq!(task.token.len(), 40);

    let stored = h.job(jobs[0]);
    assert_eq!(stored.status, Status::Running);
    assert_eq!(stored.task_id, task.task_id);
    assert_eq!(h.task(task.task_id).log.filename, format!("1/1/{:02x}/{}.log", task.task_id.get() % 256, task.task_id));

    let published = h.publisher.published();
    assert_eq!(published.last().map(|p| p.state), Some(Status::Running));
}

#[tokio::test]
async fn claimed_job_is_not_handed_out_twice() {
    let h = harness();
    let a = h.register(&[]);
    let b = h.register(&[]);
    h.submit(vec![job("build")]).await;

    assert!(h.fetch(&a).await.is_some());
    assert!(h.fetch(&b).await.is_none());
}

#[tokio::test]
async fn runner_labels_must_cover_runs_on() {
    let h = harness();
    let plain = h.register(&["ubuntu"]);
    let gpu = h.register(&["ubuntu", "gpu"]);
    let spec = JobSpec::builder("train")
        .payload(steps_payload(&["train"]))
        .runs_on(["ubuntu", "gpu"].into_iter().collect::<LabelSet>())
        .build();
    h.submit(vec![spec]).await;

    assert!(h.fetch(&plain).await.is_none());
    assert!(h.fetch(&gpu).await.is_some());
}

#[tokio::test]
async fn oldest_job_is_picked_first() {
    let h = harness();
    let runner = h.register(&[]);
    let (_, first) = h.submit(vec![job("first")]).await;
    h.clock.advance(std::time::Duration::from_secs(1));
    h.submit(vec![job("second")]).await;

    assert_eq!(h.fetch(&runner).await.unwrap().job_id, first[0]);
}

#[tokio::test]
async fn jobs_outside_runner_scope_are_invisible() {
    let h = harness();
    let other = Scope::repo(OwnerId::new(2), RepoId::new(9));
    h.coord.put_registration_token("reg-other", other).unwrap();
    let outsider = h.coord.register_runner("reg-other", "outsider", "v1", &[]).unwrap().runner;
    h.submit(vec![job("build")]).await;

    assert!(h.fetch(&outsider).await.is_none());
}

#[tokio::test]
async fn unparsable_payload_fails_job_and_skips_dependents() {
    let h = harness();
    let runner = h.register(&[]);
    let broken = JobSpec::builder("broken").payload("{not json").build();
    let (_, jobs) = h.submit(vec![broken, JobSpec::builder("after").needs(["broken"]).build()]).await;

    assert!(h.fetch(&runner).await.is_none());
    assert_eq!(h.job(jobs[0]).status, Status::Failure);
    assert_eq!(h.job(jobs[1]).status, Status::Skipped);
}

#[tokio::test]
async fn payload_carries_needs_results_and_outputs() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build"), JobSpec::builder("deploy").needs(["build"]).build()]).await;

    let build = h.fetch(&runner).await.unwrap();
    let outputs = BTreeMap::from([("artifact".to_string(), "app.tar".to_string())]);
    let update = TaskStateUpdate {
        task_id: build.task_id,
        result: TaskResult::Success,
        stopped_at_ms: None,
        steps: Vec::new(),
    };
    h.coord.update_task(&runner, update, outputs).await.unwrap();

    let deploy = h.fetch(&runner).await.unwrap();
    assert_eq!(deploy.job_key, "deploy");
    let need = &deploy.needs["build"];
    assert_eq!(need.result, TaskResult::Success);
    assert_eq!(need.outputs.get("artifact").map(String::as_str), Some("app.tar"));
}

#[tokio::test]
async fn compressed_logs_get_zst_filename() {
    let h = harness_with(EngineConfig { log_compression: crate::LogCompression::Zstd, ..EngineConfig::default() });
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;

    let task = h.fetch(&runner).await.unwrap();
    assert!(h.task(task.task_id).log.filename.ends_with(".log.zst"));
}
