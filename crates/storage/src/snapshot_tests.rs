// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::test_support::{run_created_event, JobFixture};
use drover_core::JobId;
use tempfile::tempdir;

fn populated_state() -> MaterializedState {
    let mut state = MaterializedState::default();
    state.apply_event(&run_created_event(1, vec![JobFixture::waiting(1).run(1).build()]));
    state
}

#[test]
fn save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    Snapshot::new(12, populated_state()).save(&path).unwrap();
    let loaded = load_snapshot(&path).unwrap().unwrap();

    assert_eq!(loaded.seq, 12);
    assert_eq!(loaded.v, CURRENT_SNAPSHOT_VERSION);
    assert!(loaded.state.jobs.contains_key(&JobId::new(1)));
}

#[test]
fn missing_snapshot_is_none() {
    let dir = tempdir().unwrap();
    assert!(load_snapshot(&dir.path().join("snapshot.json")).unwrap().is_none());
}

#[test]
fn plain_json_is_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let snapshot = Snapshot::new(3, populated_state());
    fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

    assert_eq!(load_snapshot(&path).unwrap().unwrap().seq, 3);
}

#[test]
fn newer_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let mut value = serde_json::to_value(Snapshot::new(1, MaterializedState::default())).unwrap();
    value["v"] = serde_json::json!(99);
    fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

    assert!(matches!(load_snapshot(&path), Err(SnapshotError::TooNew(99, 1))));
}

#[test]
fn corrupt_primary_falls_back_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    Snapshot::new(5, populated_state()).save(&path).unwrap();
    Snapshot::new(6, populated_state()).save(&path).unwrap();
    fs::write(&path, b"not a snapshot").unwrap();

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 5);
}

#[test]
fn rotation_keeps_bounded_generations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    for seq in 1..=6 {
        Snapshot::new(seq, MaterializedState::default()).save(&path).unwrap();
    }

    assert!(bak_path(&path, 1).exists());
    assert!(bak_path(&path, BAK_GENERATIONS).exists());
    assert!(!bak_path(&path, BAK_GENERATIONS + 1).exists());
}
