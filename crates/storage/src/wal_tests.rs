// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::{RepoId, TaskId};
use std::io::Write as _;
use tempfile::tempdir;

fn archived(id: u64) -> Event {
    Event::TaskLogArchived { id: TaskId::new(id) }
}

#[test]
fn append_assigns_increasing_seq() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("drover.wal"), 0).unwrap();

    assert_eq!(wal.append(&[archived(1)]).unwrap(), 1);
    assert_eq!(wal.append(&[archived(2), archived(3)]).unwrap(), 2);
    wal.flush().unwrap();

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].events.len(), 2);
}

#[test]
fn reopen_continues_numbering() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drover.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&[archived(1)]).unwrap();
        wal.append(&[archived(2)]).unwrap();
        wal.flush().unwrap();
    }

    let mut wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 2);
    assert_eq!(wal.append(&[archived(3)]).unwrap(), 3);
}

#[test]
fn min_seq_wins_over_empty_log() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("drover.wal"), 41).unwrap();
    assert_eq!(wal.append(&[archived(1)]).unwrap(), 42);
}

#[test]
fn entries_after_filters() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("drover.wal"), 0).unwrap();
    for id in 1..=3 {
        wal.append(&[archived(id)]).unwrap();
    }
    wal.flush().unwrap();

    let seqs: Vec<u64> = wal.entries_after(1).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![2, 3]);
}

#[test]
fn torn_tail_is_cut_off_on_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drover.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&[Event::SchedulesDeleted { repo_id: RepoId::new(7) }]).unwrap();
        wal.flush().unwrap();
    }
    {
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(br#"{"seq":2,"events":[{"type":"task:lo"#).unwrap();
    }

    let mut wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 1);
    wal.append(&[archived(9)]).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].events, vec![archived(9)]);
}

#[test]
fn truncate_before_keeps_tail() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("drover.wal"), 0).unwrap();
    for id in 1..=3 {
        wal.append(&[archived(id)]).unwrap();
    }
    wal.truncate_before(3).unwrap();

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].seq, 3);

    // Appends after truncation land in the rewritten file.
    assert_eq!(wal.append(&[archived(4)]).unwrap(), 4);
    wal.flush().unwrap();
    assert_eq!(wal.entries_after(3).unwrap().len(), 1);
}

#[test]
fn unflushed_entries_are_not_visible_to_readers() {
    let dir = tempdir().unwrap();
    let mut wal = Wal::open(&dir.path().join("drover.wal"), 0).unwrap();
    wal.append(&[archived(1)]).unwrap();
    // BufWriter holds the line until flush.
    assert!(wal.entries_after(0).unwrap().is_empty());
    wal.flush().unwrap();
    assert_eq!(wal.entries_after(0).unwrap().len(), 1);
}
