// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time copies of the materialized state.
//!
//! A snapshot records the WAL sequence it covers. Startup loads the newest
//! readable snapshot and replays only the entries after it.

use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

/// First bytes of every zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

const BAK_GENERATIONS: usize = 3;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {0} is newer than supported version {1}")]
    TooNew(u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub v: u32,
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState) -> Self {
        Self { v: CURRENT_SNAPSHOT_VERSION, seq, state, created_at: Utc::now() }
    }

    /// Write zstd-compressed JSON atomically, rotating older copies to
    /// `.bak`, `.bak.2`, ...
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(self)?;
        let compressed = zstd::encode_all(json.as_slice(), 3)?;

        let tmp = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        if path.exists() {
            rotate_bak(path)?;
        }
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), seq = self.seq, bytes = compressed.len(), "snapshot saved");
        Ok(())
    }
}

/// Load the snapshot at `path`, falling back to its `.bak` copies when the
/// primary is unreadable. `Ok(None)` when none exist.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let mut candidates = vec![path.to_path_buf()];
    candidates.extend((1..=BAK_GENERATIONS).map(|n| bak_path(path, n)));

    let mut last_err = None;
    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }
        match read_one(&candidate) {
            Ok(snapshot) => return Ok(Some(snapshot)),
            Err(SnapshotError::TooNew(found, supported)) => {
                return Err(SnapshotError::TooNew(found, supported));
            }
            Err(e) => {
                tracing::warn!(path = %candidate.display(), error = %e, "skipping unreadable snapshot");
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

fn read_one(path: &Path) -> Result<Snapshot, SnapshotError> {
    let raw = fs::read(path)?;
    let json = if raw.starts_with(&ZSTD_MAGIC) { zstd::decode_all(raw.as_slice())? } else { raw };

    let value: serde_json::Value = serde_json::from_slice(&json)?;
    let version = value.get("v").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    if version > CURRENT_SNAPSHOT_VERSION {
        return Err(SnapshotError::TooNew(version, CURRENT_SNAPSHOT_VERSION));
    }

    let mut snapshot: Snapshot = serde_json::from_value(value)?;
    snapshot.state.rebuild_indexes();
    Ok(snapshot)
}

fn bak_path(path: &Path, generation: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    if generation == 1 {
        name.push(".bak");
    } else {
        name.push(format!(".bak.{generation}"));
    }
    PathBuf::from(name)
}

fn rotate_bak(path: &Path) -> Result<(), SnapshotError> {
    for generation in (1..BAK_GENERATIONS).rev() {
        let from = bak_path(path, generation);
        if from.exists() {
            fs::rename(&from, bak_path(path, generation + 1))?;
        }
    }
    fs::rename(path, bak_path(path, 1))?;
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
