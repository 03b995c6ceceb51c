// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn claim_creates_task_and_steps() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
    let r = register(&store, &["linux"]);

    let claimed = claim(&store, jobs[0], &r).unwrap();
    assert_eq!(claimed.task.attempt, 1);
    assert_eq!(claimed.job.task_id, claimed.task.id);
    assert_eq!(claimed.task.log.filename, format!("1/1/01/{}.log", claimed.task.id));
    assert!(claimed.task.token.verify(&claimed.token));

    store.read(|s| {
        let job = s.job(jobs[0]).unwrap();
        assert_eq!(job.status, Status::Running);
        assert_eq!(job.task_id, claimed.task.id);
        assert_eq!(s.steps(claimed.task.id).len(), 1);
    });
}

#[test]
fn second_claim_is_lost() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
    let r = register(&store, &[]);

    assert!(claim(&store, jobs[0], &r).is_some());
    assert!(claim(&store, jobs[0], &r).is_none());
    store.read(|s| assert_eq!(s.tasks.len(), 1));
}

#[test]
fn compressed_logs_get_zst_suffix() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
    let r = register(&store, &[]);
    let names: Vec<String> = Vec::new();
    let claimed = store
        .transact(|tx| {
            tx.claim_job(ClaimRequest {
                job_id: jobs[0],
                runner: &r,
                step_names: &names,
                compress_logs: true,
                at_ms: NOW,
            })
        })
        .unwrap()
        .unwrap();
    assert!(claimed.task.log.filename.ends_with(".log.zst"));
}

#[test]
fn claiming_unknown_job_is_not_found() {
    let store = Store::in_memory();
    let r = register(&store, &[]);
    let names: Vec<String> = Vec::new();
    let err = store
        .transact(|tx| {
            tx.claim_job(ClaimRequest {
                job_id: JobId::new(404),
                runner: &r,
                step_names: &names,
                compress_logs: false,
                at_ms: NOW,
            })
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "job", id: 404 }));
}

#[test]
fn blocked_job_cannot_be_claimed() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(
        &store,
        vec![JobSpec::builder("a").build(), JobSpec::builder("b").needs(["a"]).build()],
    );
    let r = register(&store, &[]);
    assert!(claim(&store, jobs[1], &r).is_none());
}

#[test]
fn concurrent_claims_have_one_winner() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
    let r = register(&store, &["linux"]);

    let contenders = 16;
    let barrier = Arc::new(Barrier::new(contenders));
    let handles: Vec<_> = (0..contenders)
        .map(|_| {
            let store = store.clone();
            let barrier = Arc::clone(&barrier);
            let r = r.clone();
            let job = jobs[0];
            thread::spawn(move || {
                barrier.wait();
                claim(&store, job, &r).is_some()
            })
        })
        .collect();

    let winners = handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count();
    assert_eq!(winners, 1);
    store.read(|s| {
        assert_eq!(s.tasks.len(), 1);
        let task_id = s.job(jobs[0]).unwrap().task_id;
        assert!(s.task(task_id).is_some());
    });
}

#[test]
fn step_names_are_truncated() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
    let r = register(&store, &[]);
    let names = vec!["é".repeat(200)];
    let claimed = store
        .transact(|tx| {
            tx.claim_job(ClaimRequest {
                job_id: jobs[0],
                runner: &r,
                step_names: &names,
                compress_logs: false,
                at_ms: NOW,
            })
        })
        .unwrap()
        .unwrap();
    assert!(claimed.steps[0].name.len() <= drover_core::MAX_NAME_BYTES);
    assert!(claimed.steps[0].name.chars().all(|c| c == 'é'));
}

#[test]
fn new_job_is_unclaimed() {
    let store = Store::in_memory();
    let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
    store.read(|s| assert_eq!(s.job(jobs[0]).unwrap().task_id, TaskId::NONE));
}
