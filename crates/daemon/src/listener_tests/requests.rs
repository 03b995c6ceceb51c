// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::Status;

#[tokio::test]
async fn ping_and_hello() {
    let h = harness();
    assert_eq!(h.remote(Request::Ping).await, Response::Pong);
    assert_eq!(
        h.remote(Request::Hello { version: "0.0.1".into() }).await,
        Response::Hello { version: PROTOCOL_VERSION.to_string() }
    );
}

#[tokio::test]
async fn admin_calls_are_rejected_over_tcp() {
    let h = harness();
    let requests = [
        Request::PutRegistrationToken { token: "t".into(), scope: repo_scope() },
        Request::CreateRun { scope: repo_scope(), commit_sha: "c".into(), title: "t".into(), jobs: vec![] },
        Request::CreateSchedules { schedules: vec![] },
        Request::DeleteSchedules { repo_id: RepoId::new(1) },
        Request::Status,
        Request::Shutdown,
    ];
    for request in requests {
        let name = request.name();
        let response = h.remote(request).await;
        assert_eq!(error_code(&response), Some(ErrorCode::PermissionDenied), "{name}");
    }
    assert_eq!(h.ctx.coord.status_summary().runs, 0);
}

#[tokio::test]
async fn register_with_unknown_token_is_invalid_argument() {
    let h = harness();
    let response = h
        .remote(Request::Register {
            token: "nope".into(),
            name: "runner".into(),
            version: String::new(),
            labels: vec![],
        })
        .await;
    assert_eq!(error_code(&response), Some(ErrorCode::InvalidArgument));
}

#[tokio::test]
async fn bad_runner_credentials_are_unauthenticated() {
    let h = harness();
    let auth = h.register(&[]).await;
    let forged = RunnerAuth { uuid: auth.uuid.clone(), token: "wrong".into() };

    let response = h.remote(Request::FetchTask { auth: forged, tasks_version: 0 }).await;
    assert_eq!(error_code(&response), Some(ErrorCode::Unauthenticated));
}

#[tokio::test]
async fn declare_echoes_new_labels() {
    let h = harness();
    let auth = h.register(&["linux"]).await;

    let response = h
        .remote(Request::Declare { auth, labels: vec!["gpu".into(), "linux".into()], version: "v2".into() })
        .await;
    let Response::Runner { runner } = response else { panic!("unexpected response: {response:?}") };
    assert_eq!(runner.labels, vec!["gpu".to_string(), "linux".to_string()]);
    assert_eq!(runner.version, "v2");
    assert_eq!(runner.token, None);
}

#[tokio::test]
async fn claimed_job_flows_through_to_dependents() {
    let h = harness();
    let auth = h.register(&[]).await;
    let run = h.create_run(vec![build_job("build", &[]), build_job("test", &["build"])]).await;
    let statuses: Vec<Status> = run.jobs.iter().map(|j| j.status).collect();
    assert_eq!(statuses, vec![Status::Waiting, Status::Blocked]);

    let build = h.fetch(&auth).await.unwrap();
    assert_eq!(build.job_key, "build");
    assert_eq!(build.steps, vec!["build".to_string()]);
    assert!(h.fetch(&auth).await.is_none());

    let ack = h.finish(&auth, build.id, TaskResult::Success).await;
    assert_eq!(ack, Response::TaskUpdated { id: build.id, result: TaskResult::Success, sent_outputs: vec![] });

    let test = h.fetch(&auth).await.unwrap();
    assert_eq!(test.job_key, "test");
    assert_eq!(test.needs["build"].result, TaskResult::Success);
    assert!(!h.publisher.published().is_empty());
}

#[tokio::test]
async fn outputs_are_acknowledged_by_key() {
    let h = harness();
    let auth = h.register(&[]).await;
    h.create_run(vec![build_job("build", &[])]).await;
    let task = h.fetch(&auth).await.unwrap();

    let outputs = BTreeMap::from([("artifact".to_string(), "s3://bucket/a".to_string())]);
    let state = TaskState { id: task.id, ..TaskState::default() };
    let response = h.remote(Request::UpdateTask { auth, state, outputs }).await;
    assert_eq!(
        response,
        Response::TaskUpdated { id: task.id, result: TaskResult::Unspecified, sent_outputs: vec!["artifact".into()] }
    );
}

#[tokio::test]
async fn log_rows_are_acked_and_archived() {
    let h = harness();
    let auth = h.register(&[]).await;
    h.create_run(vec![build_job("build", &[])]).await;
    let task = h.fetch(&auth).await.unwrap();

    let log = |index: u64, rows: Vec<LogLine>, no_more: bool| Request::UpdateLog {
        auth: auth.clone(),
        task_id: task.id,
        rows,
        index,
        no_more,
    };

    assert_eq!(h.remote(log(0, vec![line("a"), line("b")], false)).await, Response::LogAck { ack_index: 2 });
    // Resent overlap is absorbed
    assert_eq!(h.remote(log(1, vec![line("b"), line("c")], false)).await, Response::LogAck { ack_index: 3 });

    h.finish(&auth, task.id, TaskResult::Success).await;
    // Nothing new: the closing flag alone does not archive
    assert_eq!(h.remote(log(3, vec![], true)).await, Response::LogAck { ack_index: 3 });
    assert_eq!(h.archive.put_count(), 0);

    assert_eq!(h.remote(log(3, vec![line("d")], true)).await, Response::LogAck { ack_index: 4 });
    assert_eq!(h.archive.put_count(), 1);

    let late = h.remote(log(4, vec![line("e")], false)).await;
    assert_eq!(error_code(&late), Some(ErrorCode::AlreadyExists));
}

#[tokio::test]
async fn task_token_resolves_while_task_runs() {
    let h = harness();
    let auth = h.register(&[]).await;
    let run = h.create_run(vec![build_job("build", &[])]).await;
    let task = h.fetch(&auth).await.unwrap();
    let lookup = || Request::TaskContext { token: task.token.clone() };

    match h.remote(lookup()).await {
        Response::TaskContext { context } => {
            assert_eq!(context.task_id, task.id);
            assert_eq!(context.job_id, task.job_id);
            assert_eq!(context.run_id, run.id);
            assert_eq!(context.attempt, 1);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    assert_eq!(h.ctx.coord.token_cache().len(), 1);

    h.finish(&auth, task.id, TaskResult::Success).await;
    assert_eq!(error_code(&h.remote(lookup()).await), Some(ErrorCode::NotFound));
    assert!(h.ctx.coord.token_cache().is_empty());
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let h = harness();
    let auth = h.register(&[]).await;
    let state = TaskState { id: TaskId::new(99), ..TaskState::default() };
    let response = h.remote(Request::UpdateTask { auth, state, outputs: BTreeMap::new() }).await;
    assert_eq!(error_code(&response), Some(ErrorCode::NotFound));
}

#[tokio::test]
async fn schedules_are_created_and_deleted_by_repo() {
    let h = harness();
    let schedule = drover_wire::ScheduleRequest {
        title: "nightly".into(),
        scope: repo_scope(),
        workflow_id: "nightly.yml".into(),
        ref_name: "refs/heads/main".into(),
        commit_sha: "c0ffee".into(),
        specs: vec!["0 3 * * *".into()],
        payload: "[]".into(),
    };

    let created = h.admin(Request::CreateSchedules { schedules: vec![schedule] }).await;
    let Response::SchedulesCreated { ids } = created else { panic!("unexpected response: {created:?}") };
    assert_eq!(ids.len(), 1);

    let deleted = h.admin(Request::DeleteSchedules { repo_id: RepoId::new(1) }).await;
    assert_eq!(deleted, Response::SchedulesDeleted { removed: 1 });
}

#[tokio::test]
async fn status_reports_counts() {
    let h = harness();
    let auth = h.register(&[]).await;
    h.create_run(vec![build_job("build", &[]), build_job("test", &["build"])]).await;
    h.fetch(&auth).await.unwrap();

    let Response::Status { status } = h.admin(Request::Status).await else { panic!("expected status") };
    assert_eq!(status.runners, 1);
    assert_eq!(status.runs, 1);
    assert_eq!(status.blocked_jobs, 1);
    assert_eq!(status.running_tasks, 1);
}

#[tokio::test]
async fn shutdown_notifies_the_daemon() {
    let h = harness();
    assert_eq!(h.admin(Request::Shutdown).await, Response::ShuttingDown);
    tokio::time::timeout(Duration::from_secs(1), h.ctx.shutdown.notified()).await.unwrap();
}

#[yare::parameterized(
    validation = { ServiceError::Validation("bad".into()), ErrorCode::InvalidArgument },
    authentication = { ServiceError::Authentication("who".into()), ErrorCode::Unauthenticated },
    not_found = { ServiceError::not_found("task", 3), ErrorCode::NotFound },
    archived = { ServiceError::AlreadyArchived(TaskId::new(3)), ErrorCode::AlreadyExists },
    internal = { ServiceError::Internal("disk".into()), ErrorCode::Internal },
)]
fn service_errors_map_to_codes(error: ServiceError, code: ErrorCode) {
    let message = error.to_string();
    assert_eq!(error_response("test", error), Response::Error { code, message });
}
