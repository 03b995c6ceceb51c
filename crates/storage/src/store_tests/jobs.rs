// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn finish(store: &Store, job: JobId, status: Status) {
    store
        .transact(|tx| {
            tx.emit(Event::JobStatusChanged {
                id: job,
                status,
                expected_task: None,
                stopped_at_ms: Some(NOW),
                at_ms: NOW,
            });
            Ok::<_, StoreError>(())
        })
        .unwrap();
}

fn resolve(store: &Store, run: RunId) -> ReadyOutcome {
    store.transact(|tx| Ok::<_, StoreError>(tx.resolve_ready_jobs(run, NOW + 1))).unwrap()
}

fn status_of(store: &Store, job: JobId) -> Status {
    store.read(|s| s.job(job).unwrap().status)
}

#[test]
fn create_run_resolves_needs_to_ids() {
    let store = Store::in_memory();
    let (run, jobs) = create_run(
        &store,
        vec![
            JobSpec::builder("build").build(),
            JobSpec::builder("test").needs(["build"]).build(),
            JobSpec::builder("deploy").needs(["build", "test", "build"]).build(),
        ],
    );

    store.read(|s| {
        assert_eq!(s.job(jobs[0]).unwrap().status, Status::Waiting);
        assert_eq!(s.job(jobs[1]).unwrap().needs, vec![jobs[0]]);
        assert_eq!(s.job(jobs[2]).unwrap().needs, vec![jobs[0], jobs[1]]);
        assert_eq!(s.job(jobs[2]).unwrap().status, Status::Blocked);
        assert_eq!(s.run(run).unwrap().title, "push to main");
        assert_eq!(s.tasks_version(repo_scope().version_key()), 1);
    });
}

#[parameterized(
    empty = { vec![] },
    duplicate_key = { vec![JobSpec::builder("a").build(), JobSpec::builder("a").build()] },
    unknown_need = { vec![JobSpec::builder("a").needs(["ghost"]).build()] },
    self_cycle = { vec![JobSpec::builder("a").needs(["a"]).build()] },
    cycle = { vec![JobSpec::builder("a").needs(["b"]).build(), JobSpec::builder("b").needs(["a"]).build()] },
)]
fn invalid_runs_are_rejected(jobs: Vec<JobSpec>) {
    let store = Store::in_memory();
    let err = store.transact(|tx| tx.create_run(new_run(jobs), NOW)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidRun(_)));
    store.read(|s| assert!(s.runs.is_empty()));
}

#[test]
fn create_run_bumps_each_counter_once() {
    let store = Store::in_memory();
    create_run(&store, vec![JobSpec::builder("a").build(), JobSpec::builder("b").build()]);
    store.read(|s| {
        assert_eq!(s.tasks_version(Scope::global().version_key()), 1);
        assert_eq!(s.tasks_version(Scope::owner(OwnerId::new(1)).version_key()), 1);
    });
}

#[test]
fn success_unblocks_dependents() {
    let store = Store::in_memory();
    let (run, jobs) = create_run(
        &store,
        vec![JobSpec::builder("build").build(), JobSpec::builder("test").needs(["build"]).build()],
    );
    finish(&store, jobs[0], Status::Success);

    let outcome = resolve(&store, run);
    assert_eq!(outcome.unblocked, vec![jobs[1]]);
    assert!(outcome.skipped.is_empty());
    assert_eq!(status_of(&store, jobs[1]), Status::Waiting);
    store.read(|s| assert_eq!(s.tasks_version(repo_scope().version_key()), 2));
}

#[test]
fn unfinished_needs_keep_job_blocked() {
    let store = Store::in_memory();
    let (run, jobs) = create_run(
        &store,
        vec![
            JobSpec::builder("a").build(),
            JobSpec::builder("b").build(),
            JobSpec::builder("c").needs(["a", "b"]).build(),
        ],
    );
    finish(&store, jobs[0], Status::Success);

    assert!(resolve(&store, run).is_empty());
    assert_eq!(status_of(&store, jobs[2]), Status::Blocked);
}

#[test]
fn failure_skips_dependents_transitively() {
    let store = Store::in_memory();
    let (run, jobs) = create_run(
        &store,
        vec![
            JobSpec::builder("build").build(),
            JobSpec::builder("test").needs(["build"]).build(),
            JobSpec::builder("deploy").needs(["test"]).build(),
        ],
    );
    finish(&store, jobs[0], Status::Failure);

    let outcome = resolve(&store, run);
    assert_eq!(outcome.skipped, vec![jobs[1], jobs[2]]);
    assert_eq!(status_of(&store, jobs[2]), Status::Skipped);
    store.read(|s| assert_eq!(s.job(jobs[2]).unwrap().stopped_at_ms, Some(NOW + 1)));
}

#[test]
fn cancel_unclaimed_job() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("a").build()]);

    let cancelled = store.transact(|tx| tx.cancel_unclaimed_job(jobs[0], NOW)).unwrap();
    assert_eq!(cancelled.unwrap().status, Status::Cancelled);
    assert_eq!(status_of(&store, jobs[0]), Status::Cancelled);

    // Second cancel finds nothing to do.
    assert!(store.transact(|tx| tx.cancel_unclaimed_job(jobs[0], NOW)).unwrap().is_none());
}

#[test]
fn claimed_job_is_not_cancelled_as_abandoned() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("a").build()]);
    let r = register(&store, &[]);
    claim(&store, jobs[0], &r).unwrap();

    assert!(store.transact(|tx| tx.cancel_unclaimed_job(jobs[0], NOW)).unwrap().is_none());
    assert_eq!(status_of(&store, jobs[0]), Status::Running);
}
