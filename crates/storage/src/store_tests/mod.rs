// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::test_support::{runner, FIXTURE_EPOCH_MS};
use drover_core::{
    Event, JobId, JobSpec, LabelSet, OwnerId, RepoId, RunId, Runner, Scope, Status, TaskId,
};

mod claims;
mod durability;
mod jobs;
mod tasks;

const NOW: u64 = FIXTURE_EPOCH_MS;

fn repo_scope() -> Scope {
    Scope::repo(OwnerId::new(1), RepoId::new(1))
}

fn new_run(jobs: Vec<JobSpec>) -> NewRun {
    NewRun {
        scope: repo_scope(),
        commit_sha: "c0ffee".into(),
        title: "push to main".into(),
        schedule_id: None,
        jobs,
    }
}

fn create_run(store: &Store, jobs: Vec<JobSpec>) -> (RunId, Vec<JobId>) {
    store
        .transact(|tx| tx.create_run(new_run(jobs), NOW))
        .map(|(run, jobs)| (run.id, jobs.iter().map(|j| j.id).collect()))
        .unwrap()
}

fn register(store: &Store, labels: &[&str]) -> Runner {
    let (r, _) = runner(1, labels);
    store
        .transact(|tx| {
            tx.emit(Event::RunnerRegistered { runner: r.clone() });
            Ok::<_, StoreError>(())
        })
        .unwrap();
    r
}

fn claim(store: &Store, job: JobId, runner: &Runner) -> Option<Claimed> {
    let names = vec!["build".to_string()];
    store
        .transact(|tx| {
            tx.claim_job(ClaimRequest {
                job_id: job,
                runner,
                step_names: &names,
                compress_logs: false,
                at_ms: NOW,
            })
        })
        .unwrap()
}

#[test]
fn failed_closure_commits_nothing() {
    let store = Store::in_memory();
    let result: Result<(), StoreError> = store.transact(|tx| {
        tx.create_run(new_run(vec![JobSpec::builder("a").build()]), NOW)?;
        Err(StoreError::InvalidRun("abort".into()))
    });
    assert!(result.is_err());
    store.read(|s| {
        assert!(s.jobs.is_empty());
        assert_eq!(s.last_ids.job, 0);
    });
}

#[test]
fn ids_allocated_within_one_transaction_are_distinct() {
    let store = Store::in_memory();
    let (a, b) = store
        .transact(|tx| Ok::<_, StoreError>((tx.next_task_id(), tx.next_task_id())))
        .unwrap();
    assert_ne!(a, b);
    // Nothing was emitted, so the counters did not move.
    store.read(|s| assert_eq!(s.last_ids.task, 0));
}

#[test]
fn tasks_version_bumps_every_affected_scope() {
    let store = Store::in_memory();
    store
        .transact(|tx| {
            tx.bump_tasks_version(&repo_scope());
            tx.bump_tasks_version(&repo_scope());
            Ok::<_, StoreError>(())
        })
        .unwrap();

    store.read(|s| {
        assert_eq!(s.tasks_version(Scope::global().version_key()), 2);
        assert_eq!(s.tasks_version(Scope::owner(OwnerId::new(1)).version_key()), 2);
        assert_eq!(s.tasks_version(repo_scope().version_key()), 2);
    });
}

#[test]
fn ensure_tasks_version_initializes_to_one() {
    let store = Store::in_memory();
    let key = repo_scope().version_key();
    let first = store.transact(|tx| Ok::<_, StoreError>(tx.ensure_tasks_version(key))).unwrap();
    let second = store.transact(|tx| Ok::<_, StoreError>(tx.ensure_tasks_version(key))).unwrap();
    assert_eq!((first, second), (1, 1));
}

#[test]
fn runner_labels_are_a_set() {
    let r = register(&Store::in_memory(), &["x64", "linux", "x64"]);
    assert_eq!(r.labels, ["linux", "x64"].into_iter().collect::<LabelSet>());
}
