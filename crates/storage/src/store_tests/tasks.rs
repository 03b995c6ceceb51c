// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::{StepReport, TaskResult};

fn claimed_job(max_attempts: u32) -> (Store, Claimed) {
    let store = Store::in_memory();
    let (_, jobs) =
        create_run(&store, vec![JobSpec::builder("build").max_attempts(max_attempts).build()]);
    let r = register(&store, &[]);
    let claimed = claim(&store, jobs[0], &r).unwrap();
    (store, claimed)
}

fn report(store: &Store, task: TaskId, result: TaskResult, at_ms: u64) -> Reported {
    store.transact(|tx| tx.report_task_state(task, result, None, &[], at_ms)).unwrap()
}

#[test]
fn heartbeat_touches_updated() {
    let (store, c) = claimed_job(1);
    let reported = report(&store, c.task.id, TaskResult::Unspecified, NOW + 500);
    assert!(!reported.finished);
    store.read(|s| {
        let task = s.task(c.task.id).unwrap();
        assert_eq!(task.status, Status::Running);
        assert_eq!(task.updated_at_ms, NOW + 500);
    });
}

#[test]
fn terminal_result_stops_task_and_job() {
    let (store, c) = claimed_job(1);
    let reported = report(&store, c.task.id, TaskResult::Success, NOW + 9);
    assert!(reported.finished);
    assert_eq!(reported.task.stopped_at_ms, Some(NOW + 9));

    store.read(|s| {
        let job = s.job(c.job.id).unwrap();
        assert_eq!(job.status, Status::Success);
        assert_eq!(job.stopped_at_ms, Some(NOW + 9));
    });
}

#[test]
fn report_after_terminal_is_ack_only() {
    let (store, c) = claimed_job(1);
    report(&store, c.task.id, TaskResult::Failure, NOW + 1);
    let again = report(&store, c.task.id, TaskResult::Success, NOW + 2);

    assert!(!again.finished);
    assert_eq!(again.task.status, Status::Failure);
    store.read(|s| assert_eq!(s.job(c.job.id).unwrap().status, Status::Failure));
}

#[test]
fn step_reports_are_applied() {
    let (store, c) = claimed_job(1);
    let steps = [StepReport {
        index: 0,
        result: TaskResult::Success,
        started_at_ms: Some(NOW),
        stopped_at_ms: Some(NOW + 1),
        log_index: 0,
        log_length: 7,
    }];
    store
        .transact(|tx| tx.report_task_state(c.task.id, TaskResult::Unspecified, None, &steps, NOW))
        .unwrap();
    store.read(|s| {
        let step = &s.steps(c.task.id)[0];
        assert_eq!(step.status, Status::Success);
        assert_eq!(step.log_length, 7);
    });
}

#[test]
fn reporting_unknown_task_is_not_found() {
    let store = Store::in_memory();
    let err = store
        .transact(|tx| tx.report_task_state(TaskId::new(5), TaskResult::Success, None, &[], NOW))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "task", .. }));
}

#[test]
fn stop_without_attempts_left_fails_job() {
    let (store, c) = claimed_job(1);
    let outcome =
        store.transact(|tx| tx.stop_task(c.task.id, Status::Failure, NOW + 60)).unwrap().unwrap();
    assert!(!outcome.requeued);

    store.read(|s| {
        assert_eq!(s.task(c.task.id).unwrap().status, Status::Failure);
        assert_eq!(s.job(c.job.id).unwrap().status, Status::Failure);
        assert_eq!(s.steps(c.task.id)[0].status, Status::Failure);
    });
}

#[test]
fn stop_with_attempts_left_requeues() {
    let (store, c) = claimed_job(2);
    let version_before = store.read(|s| s.tasks_version(repo_scope().version_key()));
    let outcome =
        store.transact(|tx| tx.stop_task(c.task.id, Status::Failure, NOW + 60)).unwrap().unwrap();
    assert!(outcome.requeued);

    store.read(|s| {
        let job = s.job(c.job.id).unwrap();
        assert!(job.is_claimable());
        assert_eq!(job.attempt, 1);
        assert_eq!(s.tasks_version(repo_scope().version_key()), version_before + 1);
    });

    // The retry claims a second attempt.
    let r = store.read(|s| s.runner(c.task.runner_id).cloned().unwrap());
    let retry = claim(&store, c.job.id, &r).unwrap();
    assert_eq!(retry.task.attempt, 2);
}

#[test]
fn stopping_a_stopped_task_is_noop() {
    let (store, c) = claimed_job(1);
    report(&store, c.task.id, TaskResult::Success, NOW);
    let outcome = store.transact(|tx| tx.stop_task(c.task.id, Status::Failure, NOW)).unwrap();
    assert!(outcome.is_none());
    store.read(|s| assert_eq!(s.job(c.job.id).unwrap().status, Status::Success));
}

#[test]
fn outputs_insert_if_absent() {
    let (store, c) = claimed_job(1);
    let inserted = store
        .transact(|tx| {
            Ok::<_, StoreError>((
                tx.record_output(c.task.id, "digest", "sha256:1"),
                tx.record_output(c.task.id, "digest", "sha256:2"),
            ))
        })
        .unwrap();
    assert_eq!(inserted, (true, false));

    let later = store
        .transact(|tx| Ok::<_, StoreError>(tx.record_output(c.task.id, "digest", "x")))
        .unwrap();
    assert!(!later);
    store.read(|s| assert_eq!(s.outputs(c.task.id).unwrap()["digest"], "sha256:1"));
}

#[test]
fn log_append_checks_start_and_archive() {
    let (store, c) = claimed_job(1);
    let id = c.task.id;
    let len = store.transact(|tx| tx.append_log(id, 0, vec![0, 12], 30, 0)).unwrap();
    assert_eq!(len, 2);

    let moved = store.transact(|tx| tx.append_log(id, 0, vec![30], 40, 0)).unwrap_err();
    assert!(matches!(moved, StoreError::LogMoved { expected: 0, found: 2, .. }));

    store.transact(|tx| tx.mark_log_archived(id)).unwrap();
    let archived = store.transact(|tx| tx.append_log(id, 2, vec![30], 40, 0)).unwrap_err();
    assert!(matches!(archived, StoreError::LogArchived(_)));
}

#[test]
fn log_expiry_is_recorded_once() {
    let (store, c) = claimed_job(1);
    store.transact(|tx| tx.mark_log_expired(c.task.id)).unwrap();
    store.transact(|tx| tx.mark_log_expired(c.task.id)).unwrap();
    store.read(|s| assert!(s.task(c.task.id).unwrap().log.expired));
}
