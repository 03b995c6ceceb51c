// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serde roundtrips for every Request and Response variant.

use std::collections::BTreeMap;

use drover_core::{
    JobId, JobSpec, OwnerId, RepoId, RunId, RunnerId, ScheduleId, Scope, Status, StepReport,
    TaskId, TaskResult,
};
use proptest::prelude::*;

use super::*;

fn s() -> String {
    String::new()
}

fn auth() -> RunnerAuth {
    RunnerAuth { uuid: s(), token: s() }
}

fn scope() -> Scope {
    Scope::repo(OwnerId::new(1), RepoId::new(2))
}

fn all_requests() -> Vec<Request> {
    vec![
        Request::Ping,
        Request::Hello { version: s() },
        Request::Register { token: s(), name: s(), version: s(), labels: vec![] },
        Request::Declare { auth: auth(), labels: vec!["x".into()], version: s() },
        Request::FetchTask { auth: auth(), tasks_version: 3 },
        Request::UpdateTask {
            auth: auth(),
            state: TaskState {
                id: TaskId::new(1),
                result: TaskResult::Success,
                stopped_at_ms: Some(5),
                steps: vec![StepReport::default()],
            },
            outputs: BTreeMap::from([("k".to_string(), "v".to_string())]),
        },
        Request::UpdateLog {
            auth: auth(),
            task_id: TaskId::new(1),
            rows: vec![LogLine { time: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH, content: s() }],
            index: 0,
            no_more: true,
        },
        Request::TaskContext { token: s() },
        Request::PutRegistrationToken { token: s(), scope: scope() },
        Request::CreateRun {
            scope: scope(),
            commit_sha: s(),
            title: s(),
            jobs: vec![JobSpec::builder("a").build()],
        },
        Request::CreateSchedules {
            schedules: vec![ScheduleRequest {
                title: s(),
                scope: scope(),
                workflow_id: s(),
                ref_name: s(),
                commit_sha: s(),
                specs: vec!["@every 1h".into()],
                payload: s(),
            }],
        },
        Request::DeleteSchedules { repo_id: RepoId::new(2) },
        Request::Status,
        Request::Shutdown,
    ]
}

fn all_responses() -> Vec<Response> {
    vec![
        Response::Ok,
        Response::Pong,
        Response::Hello { version: s() },
        Response::ShuttingDown,
        Response::Runner {
            runner: RunnerInfo {
                id: RunnerId::new(1),
                uuid: s(),
                token: Some(s()),
                name: s(),
                version: s(),
                labels: vec![],
            },
        },
        Response::Task { task: None, tasks_version: 1 },
        Response::Task {
            task: Some(Box::new(TaskInfo {
                id: TaskId::new(1),
                token: s(),
                job_id: JobId::new(1),
                run_id: RunId::new(1),
                job_key: s(),
                job_name: s(),
                attempt: 1,
                scope: scope(),
                commit_sha: s(),
                payload: s(),
                steps: vec![s()],
                needs: BTreeMap::from([(
                    "build".to_string(),
                    NeedInfo { result: TaskResult::Success, outputs: BTreeMap::new() },
                )]),
            })),
            tasks_version: 2,
        },
        Response::TaskUpdated { id: TaskId::new(1), result: TaskResult::Failure, sent_outputs: vec![] },
        Response::TaskContext {
            context: TaskContextInfo {
                task_id: TaskId::new(1),
                job_id: JobId::new(1),
                run_id: RunId::new(1),
                attempt: 1,
                scope: scope(),
                commit_sha: s(),
            },
        },
        Response::LogAck { ack_index: 7 },
        Response::RunCreated {
            run: RunInfo {
                id: RunId::new(1),
                status: Status::Waiting,
                jobs: vec![JobEntry { id: JobId::new(1), key: s(), status: Status::Blocked }],
            },
        },
        Response::SchedulesCreated { ids: vec![ScheduleId::new(1)] },
        Response::SchedulesDeleted { removed: 2 },
        Response::Status { status: StatusInfo::default() },
        Response::error(ErrorCode::PermissionDenied, s()),
    ]
}

proptest! {
    #[test]
    fn request_roundtrip(idx in 0..14usize) {
        let requests = all_requests();
        let req = &requests[idx % requests.len()];
        let decoded: Request = decode(&encode(req).unwrap()).unwrap();
        prop_assert_eq!(&decoded, req);
    }

    #[test]
    fn response_roundtrip(idx in 0..15usize) {
        let responses = all_responses();
        let resp = &responses[idx % responses.len()];
        let decoded: Response = decode(&encode(resp).unwrap()).unwrap();
        prop_assert_eq!(&decoded, resp);
    }
}

#[test]
fn admin_requests_are_flagged() {
    let admin: Vec<&str> = all_requests().iter().filter(|r| r.is_admin()).map(Request::name).collect();
    assert_eq!(
        admin,
        ["put_registration_token", "create_run", "create_schedules", "delete_schedules", "status", "shutdown"]
    );
}

#[test]
fn runner_auth_debug_redacts_token() {
    let auth = RunnerAuth { uuid: "u-1".into(), token: "secret".into() };
    let printed = format!("{auth:?}");
    assert!(printed.contains("u-1"));
    assert!(!printed.contains("secret"));
}
