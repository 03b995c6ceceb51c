// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

struct Paths {
    _dir: tempfile::TempDir,
    wal: std::path::PathBuf,
    snapshot: std::path::PathBuf,
}

fn paths() -> Paths {
    let dir = tempdir().unwrap();
    Paths {
        wal: dir.path().join("wal/events.wal"),
        snapshot: dir.path().join("snapshot.json"),
        _dir: dir,
    }
}

#[test]
fn state_survives_reopen_via_wal() {
    let p = paths();
    let job_id = {
        let store = Store::open(&p.wal, &p.snapshot).unwrap();
        let (_, jobs) = create_run(&store, vec![JobSpec::builder("build").build()]);
        let r = register(&store, &[]);
        claim(&store, jobs[0], &r).unwrap();
        jobs[0]
    };

    let store = Store::open(&p.wal, &p.snapshot).unwrap();
    store.read(|s| {
        let job = s.job(job_id).unwrap();
        assert_eq!(job.status, Status::Running);
        // Derived indexes are rebuilt by replay too.
        let task = s.task(job.task_id).unwrap();
        assert_eq!(s.running_tasks_by_last_eight(&task.token.last_eight).len(), 1);
    });
}

#[test]
fn checkpoint_then_reopen() {
    let p = paths();
    {
        let store = Store::open(&p.wal, &p.snapshot).unwrap();
        create_run(&store, vec![JobSpec::builder("a").build()]);
        let seq = store.checkpoint().unwrap();
        assert_eq!(seq, Some(1));
        create_run(&store, vec![JobSpec::builder("b").build()]);
    }

    let store = Store::open(&p.wal, &p.snapshot).unwrap();
    store.read(|s| {
        assert_eq!(s.runs.len(), 2);
        assert_eq!(s.last_ids.job, 2);
    });

    // New ids continue after the replayed ones.
    let (run, _) = create_run(&store, vec![JobSpec::builder("c").build()]);
    assert_eq!(run, RunId::new(3));
}

#[test]
fn checkpoint_truncates_covered_entries() {
    let p = paths();
    let store = Store::open(&p.wal, &p.snapshot).unwrap();
    create_run(&store, vec![JobSpec::builder("a").build()]);
    create_run(&store, vec![JobSpec::builder("b").build()]);
    store.checkpoint().unwrap();

    let wal = crate::wal::Wal::open(&p.wal, 0).unwrap();
    assert!(wal.entries_after(0).unwrap().is_empty());
}

#[test]
fn in_memory_checkpoint_is_none() {
    assert_eq!(Store::in_memory().checkpoint().unwrap(), None);
}

#[test]
fn read_only_transaction_writes_nothing() {
    let p = paths();
    let store = Store::open(&p.wal, &p.snapshot).unwrap();
    store.transact(|tx| Ok::<_, StoreError>(tx.state().jobs.len())).unwrap();
    let wal = crate::wal::Wal::open(&p.wal, 0).unwrap();
    assert_eq!(wal.write_seq(), 0);
}
