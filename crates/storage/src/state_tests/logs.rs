// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

fn append(id: TaskId, start_length: u64, offsets: Vec<u64>, size: u64) -> Event {
    Event::TaskLogAppended { id, start_length, offsets, size, at_ms: 0 }
}

#[test]
fn append_extends_indexes() {
    let (mut state, task) = state_with_claimed_task();
    state.apply_event(&append(task.id, 0, vec![0, 10], 25));
    state.apply_event(&append(task.id, 2, vec![25], 40));

    let log = &state.task(task.id).unwrap().log;
    assert_eq!(log.indexes, vec![0, 10, 25]);
    assert_eq!(log.length, 3);
    assert_eq!(log.size, 40);
}

#[test]
fn append_touches_task() {
    let (mut state, task) = state_with_claimed_task();
    let later = task.updated_at_ms + 60_000;
    state.apply_event(&Event::TaskLogAppended {
        id: task.id,
        start_length: 0,
        offsets: vec![0],
        size: 8,
        at_ms: later,
    });
    assert_eq!(state.task(task.id).unwrap().updated_at_ms, later);

    // An append stamped earlier never moves the clock back.
    state.apply_event(&Event::TaskLogAppended {
        id: task.id,
        start_length: 1,
        offsets: vec![8],
        size: 16,
        at_ms: task.updated_at_ms,
    });
    assert_eq!(state.task(task.id).unwrap().updated_at_ms, later);
}

#[test]
fn replayed_append_is_ignored() {
    let (mut state, task) = state_with_claimed_task();
    let event = append(task.id, 0, vec![0, 10], 25);
    let once = apply_twice(&mut state, &event);
    assert_same(&once, &state);
}

#[test]
fn archived_log_is_frozen() {
    let (mut state, task) = state_with_claimed_task();
    state.apply_event(&append(task.id, 0, vec![0], 8));
    state.apply_event(&Event::TaskLogArchived { id: task.id });
    state.apply_event(&append(task.id, 1, vec![8], 16));

    let log = &state.task(task.id).unwrap().log;
    assert!(log.in_storage);
    assert_eq!(log.length, 1);
}

#[test]
fn expiry_clears_indexes() {
    let (mut state, task) = state_with_claimed_task();
    state.apply_event(&append(task.id, 0, vec![0, 4], 8));
    state.apply_event(&Event::TaskLogExpired { id: task.id });

    let log = &state.task(task.id).unwrap().log;
    assert!(log.expired);
    assert!(log.indexes.is_empty());
}

proptest! {
    #[test]
    fn length_and_indexes_only_grow(batches in proptest::collection::vec((0u64..6, 1usize..4), 1..20)) {
        let (mut state, task) = state_with_claimed_task();
        let mut prev_len = 0;
        let mut prev_indexes: Vec<u64> = Vec::new();
        for (skew, rows) in batches {
            let log = &state.task(task.id).unwrap().log;
            // Some batches claim a stale or future start; those must not apply.
            let start = log.length.saturating_sub(skew % 2) + skew / 4;
            let offsets: Vec<u64> = (0..rows as u64).map(|i| log.size + i).collect();
            let size = log.size + rows as u64;
            state.apply_event(&append(task.id, start, offsets, size));

            let log = &state.task(task.id).unwrap().log;
            prop_assert!(log.length >= prev_len);
            prop_assert!(log.indexes.starts_with(&prev_indexes));
            prop_assert_eq!(log.indexes.len() as u64, log.length);
            prev_len = log.length;
            prev_indexes = log.indexes.clone();
        }
    }
}
