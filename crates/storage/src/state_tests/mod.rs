// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::test_support::{
    job_claimed_event, run_created_event, runner, steps_for, task_for, JobFixture,
    FIXTURE_EPOCH_MS,
};
use drover_core::{
    LabelSet, OwnerId, RepoId, Scope, Status, StepReport, TaskResult,
};

mod logs;
mod registry;

fn state_with_claimed_task() -> (MaterializedState, Task) {
    let mut state = MaterializedState::default();
    let job = JobFixture::waiting(1).run(1).build();
    state.apply_event(&run_created_event(1, vec![job.clone()]));
    let (task, _) = task_for(1, &job, 1);
    state.apply_event(&job_claimed_event(task.clone(), steps_for(1, &["checkout", "build"])));
    (state, task)
}

fn apply_twice(state: &mut MaterializedState, event: &Event) -> MaterializedState {
    state.apply_event(event);
    let once = state.clone();
    state.apply_event(event);
    once
}

fn assert_same(a: &MaterializedState, b: &MaterializedState) {
    assert_eq!(serde_json::to_value(a).unwrap(), serde_json::to_value(b).unwrap());
}

#[test]
fn run_created_inserts_run_and_jobs() {
    let mut state = MaterializedState::default();
    let jobs = vec![
        JobFixture::waiting(1).run(1).key("build").build(),
        JobFixture::waiting(2).run(1).key("test").needs(&[1]).build(),
    ];
    state.apply_event(&run_created_event(1, jobs));

    assert!(state.run(RunId::new(1)).is_some());
    assert_eq!(state.jobs_of_run(RunId::new(1)).len(), 2);
    assert_eq!(state.job(JobId::new(2)).unwrap().status, Status::Blocked);
    assert_eq!(state.last_ids.job, 2);
    assert_eq!(state.last_ids.run, 1);
}

#[test]
fn claim_binds_job_to_task() {
    let (state, task) = state_with_claimed_task();

    let job = state.job(JobId::new(1)).unwrap();
    assert_eq!(job.status, Status::Running);
    assert_eq!(job.task_id, task.id);
    assert_eq!(job.attempt, 1);
    assert_eq!(state.steps(task.id).len(), 2);
    assert_eq!(state.running_tasks_by_last_eight(&task.token.last_eight).len(), 1);
    assert_eq!(state.last_ids.task, 1);
}

#[test]
fn claim_replay_is_idempotent() {
    let (mut state, task) = state_with_claimed_task();
    let before = state.clone();
    state.apply_event(&job_claimed_event(task, steps_for(1, &["other"])));
    assert_same(&before, &state);
}

#[test]
fn job_status_respects_expected_task() {
    let (mut state, _) = state_with_claimed_task();
    state.apply_event(&Event::JobStatusChanged {
        id: JobId::new(1),
        status: Status::Success,
        expected_task: Some(TaskId::new(99)),
        stopped_at_ms: Some(5),
        at_ms: 5,
    });
    assert_eq!(state.job(JobId::new(1)).unwrap().status, Status::Running);

    state.apply_event(&Event::JobStatusChanged {
        id: JobId::new(1),
        status: Status::Success,
        expected_task: Some(TaskId::new(1)),
        stopped_at_ms: Some(5),
        at_ms: 5,
    });
    let job = state.job(JobId::new(1)).unwrap();
    assert_eq!(job.status, Status::Success);
    assert_eq!(job.stopped_at_ms, Some(5));
}

#[test]
fn terminal_job_is_not_reopened() {
    let (mut state, _) = state_with_claimed_task();
    let finish = |status| Event::JobStatusChanged {
        id: JobId::new(1),
        status,
        expected_task: Some(TaskId::new(1)),
        stopped_at_ms: Some(5),
        at_ms: 5,
    };
    state.apply_event(&finish(Status::Failure));
    state.apply_event(&finish(Status::Success));
    assert_eq!(state.job(JobId::new(1)).unwrap().status, Status::Failure);
}

#[test]
fn requeue_releases_job_once() {
    let (mut state, task) = state_with_claimed_task();
    let requeue = Event::JobRequeued { id: JobId::new(1), expected_task: task.id, at_ms: 9 };

    let once = apply_twice(&mut state, &requeue);
    assert_same(&once, &state);

    let job = state.job(JobId::new(1)).unwrap();
    assert!(job.is_claimable());
    assert_eq!(job.attempt, 1);
}

#[test]
fn terminal_task_leaves_running_index() {
    let (mut state, task) = state_with_claimed_task();
    state.apply_event(&Event::TaskStateUpdated {
        id: task.id,
        status: Status::Failure,
        stopped_at_ms: Some(10),
        at_ms: 10,
    });
    assert!(state.running_tasks_by_last_eight(&task.token.last_eight).is_empty());

    // A late heartbeat cannot revive it.
    state.apply_event(&Event::TaskStateUpdated {
        id: task.id,
        status: Status::Running,
        stopped_at_ms: None,
        at_ms: 11,
    });
    assert_eq!(state.task(task.id).unwrap().status, Status::Failure);
}

#[test]
fn step_reports_apply_by_index() {
    let (mut state, task) = state_with_claimed_task();
    state.apply_event(&Event::TaskStepsReported {
        id: task.id,
        reports: vec![StepReport {
            index: 1,
            result: TaskResult::Success,
            started_at_ms: Some(1),
            stopped_at_ms: Some(2),
            log_index: 3,
            log_length: 4,
        }],
    });
    let steps = state.steps(task.id);
    assert_eq!(steps[0].status, Status::Waiting);
    assert_eq!(steps[1].status, Status::Success);
    assert_eq!(steps[1].log_length, 4);
}

#[test]
fn outputs_keep_first_value() {
    let (mut state, task) = state_with_claimed_task();
    for value in ["first", "second"] {
        state.apply_event(&Event::TaskOutputRecorded {
            id: task.id,
            key: "digest".into(),
            value: value.into(),
        });
    }
    assert_eq!(state.outputs(task.id).unwrap()["digest"], "first");
    assert_eq!(state.output_keys(task.id), vec!["digest".to_string()]);
}

#[test]
fn tasks_version_never_goes_backwards() {
    let mut state = MaterializedState::default();
    let key = Scope::repo(OwnerId::new(1), RepoId::new(2)).version_key();
    state.apply_event(&Event::TasksVersionSet { key, version: 4 });
    state.apply_event(&Event::TasksVersionSet { key, version: 2 });
    assert_eq!(state.tasks_version(key), 4);
}

#[test]
fn claimable_jobs_respect_scope_and_order() {
    let mut state = MaterializedState::default();
    let other_repo = Scope::repo(OwnerId::new(1), RepoId::new(2));
    state.apply_event(&run_created_event(
        1,
        vec![
            JobFixture::waiting(1).run(1).updated_at(FIXTURE_EPOCH_MS + 10).build(),
            JobFixture::waiting(2).run(1).updated_at(FIXTURE_EPOCH_MS).build(),
            JobFixture::waiting(3).run(1).scope(other_repo).build(),
            JobFixture::waiting(4).run(1).status(Status::Blocked).build(),
        ],
    ));

    let repo_one = Scope::repo(OwnerId::new(1), RepoId::new(1));
    let ids: Vec<u64> = state.claimable_jobs(&repo_one).iter().map(|j| j.id.get()).collect();
    assert_eq!(ids, vec![2, 1]);

    let owner = Scope::owner(OwnerId::new(1));
    assert_eq!(state.claimable_jobs(&owner).len(), 3);
    assert_eq!(state.claimable_jobs(&Scope::global()).len(), 3);
}

#[test]
fn run_status_aggregates_jobs() {
    let (mut state, _) = state_with_claimed_task();
    assert_eq!(state.run_status(RunId::new(1)), Some(Status::Running));
    assert_eq!(state.run_status(RunId::new(2)), None);

    state.apply_event(&Event::JobStatusChanged {
        id: JobId::new(1),
        status: Status::Success,
        expected_task: Some(TaskId::new(1)),
        stopped_at_ms: Some(1),
        at_ms: 1,
    });
    assert_eq!(state.run_status(RunId::new(1)), Some(Status::Success));
}

#[test]
fn sweep_queries_filter_by_age() {
    let (mut state, task) = state_with_claimed_task();
    let now = FIXTURE_EPOCH_MS + 1_000;

    assert_eq!(state.stale_running_tasks(now, 10), vec![task.id]);
    assert!(state.stale_running_tasks(FIXTURE_EPOCH_MS, 10).is_empty());
    assert_eq!(state.overdue_running_tasks(now, 10), vec![task.id]);

    state.apply_event(&run_created_event(2, vec![JobFixture::waiting(2).run(2).build()]));
    assert_eq!(state.abandoned_jobs(now, 10), vec![JobId::new(2)]);
    assert!(state.abandoned_jobs(now, 0).is_empty());
}

#[test]
fn rebuild_indexes_matches_incremental() {
    let (state, task) = state_with_claimed_task();
    let json = serde_json::to_string(&state).unwrap();
    let mut loaded: MaterializedState = serde_json::from_str(&json).unwrap();
    assert!(loaded.running_tasks_by_last_eight(&task.token.last_eight).is_empty());

    loaded.rebuild_indexes();
    assert_eq!(loaded.running_tasks_by_last_eight(&task.token.last_eight).len(), 1);
    assert_eq!(loaded.jobs_of_run(RunId::new(1)).len(), 1);
}

#[test]
fn runner_declared_replaces_labels() {
    let mut state = MaterializedState::default();
    let (r, _) = runner(1, &["linux"]);
    state.apply_event(&Event::RunnerRegistered { runner: r.clone() });
    let labels: LabelSet = ["linux", "arm64"].into_iter().collect();
    state.apply_event(&Event::RunnerDeclared {
        id: r.id,
        labels: labels.clone(),
        version: "v2".into(),
        at_ms: 7,
    });

    let stored = state.runner_by_uuid(&r.uuid).unwrap();
    assert_eq!(stored.labels, labels);
    assert_eq!(stored.version, "v2");
    assert_eq!(stored.updated_at_ms, 7);
}
