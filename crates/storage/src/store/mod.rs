// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional access to the materialized state.
//!
//! A transaction runs under the store mutex: it reads a consistent view,
//! decides, and emits events. Nothing is visible until the closure returns
//! `Ok`; then the batch is written to the WAL as one entry and applied. An
//! `Err` from the closure, or a failed WAL write, discards the whole batch.

mod claim;
mod jobs;
mod tasks;
mod txn;

pub use claim::{ClaimRequest, Claimed};
pub use jobs::{NewRun, ReadyOutcome};
pub use tasks::{Reported, StopOutcome};
pub use txn::Txn;

use crate::snapshot::{load_snapshot, Snapshot, SnapshotError};
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use drover_core::TaskId;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("WAL is unusable after an earlier write failure")]
    WalPoisoned,
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("invalid run: {0}")]
    InvalidRun(String),
    #[error("log of task {0} is already archived")]
    LogArchived(TaskId),
    #[error("log of task {id} is at row {found}, expected {expected}")]
    LogMoved { id: TaskId, expected: u64, found: u64 },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        Self::NotFound { kind, id }
    }
}

struct Durable {
    wal: Wal,
    snapshot_path: PathBuf,
    poisoned: bool,
}

struct Inner {
    state: MaterializedState,
    durable: Option<Durable>,
}

/// Shared handle to the job/task store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    /// Open the on-disk store: load the newest snapshot, then replay the
    /// WAL entries after it.
    pub fn open(wal_path: &Path, snapshot_path: &Path) -> Result<Self, StoreError> {
        let (mut state, snapshot_seq) = match load_snapshot(snapshot_path)? {
            Some(snapshot) => {
                tracing::info!(seq = snapshot.seq, created_at = %snapshot.created_at, "loaded snapshot");
                (snapshot.state, snapshot.seq)
            }
            None => (MaterializedState::default(), 0),
        };

        let wal = Wal::open(wal_path, snapshot_seq)?;
        let entries = wal.entries_after(snapshot_seq)?;
        let replayed = entries.len();
        for entry in &entries {
            for event in &entry.events {
                state.apply_event(event);
            }
        }
        tracing::info!(replayed, seq = wal.write_seq(), "store opened");

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                durable: Some(Durable {
                    wal,
                    snapshot_path: snapshot_path.to_path_buf(),
                    poisoned: false,
                }),
            })),
        })
    }

    /// A store with no WAL; state lives only as long as the handle.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: MaterializedState::default(),
                durable: None,
            })),
        }
    }

    /// Run `f` against a consistent read-only view.
    pub fn read<T>(&self, f: impl FnOnce(&MaterializedState) -> T) -> T {
        let inner = self.inner.lock();
        f(&inner.state)
    }

    /// Run `f` as one all-or-nothing transaction.
    pub fn transact<T, E>(&self, f: impl FnOnce(&mut Txn<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.inner.lock();
        let Inner { state, durable } = &mut *guard;

        let mut txn = Txn::new(state);
        let out = f(&mut txn)?;
        let events = txn.into_events();
        if events.is_empty() {
            return Ok(out);
        }

        if let Some(durable) = durable {
            if durable.poisoned {
                return Err(StoreError::WalPoisoned.into());
            }
            let written = durable.wal.append(&events).and_then(|_| durable.wal.flush());
            if let Err(e) = written {
                tracing::error!(error = %e, "WAL write failed, refusing further transactions");
                durable.poisoned = true;
                return Err(StoreError::from(e).into());
            }
        }

        for event in &events {
            tracing::trace!(event = event.name(), "apply");
            state.apply_event(event);
        }
        Ok(out)
    }

    /// Save a snapshot and drop the WAL entries it covers. Returns the
    /// covered sequence, or `None` for an in-memory store.
    pub fn checkpoint(&self) -> Result<Option<u64>, StoreError> {
        let (snapshot, path) = {
            let mut inner = self.inner.lock();
            let Inner { state, durable } = &mut *inner;
            let Some(durable) = durable else {
                return Ok(None);
            };
            durable.wal.flush()?;
            (Snapshot::new(durable.wal.write_seq(), state.clone()), durable.snapshot_path.clone())
        };

        snapshot.save(&path)?;

        let mut inner = self.inner.lock();
        if let Some(durable) = inner.durable.as_mut() {
            durable.wal.truncate_before(snapshot.seq + 1)?;
        }
        tracing::info!(seq = snapshot.seq, "checkpoint complete");
        Ok(Some(snapshot.seq))
    }
}

#[cfg(test)]
#[path = "../store_tests/mod.rs"]
mod tests;
