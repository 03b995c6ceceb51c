// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable job/task state for drover.
//!
//! State is event-sourced: a [`Store`] transaction reads the current
//! [`MaterializedState`], decides, and emits [`drover_core::Event`]s. On
//! commit the batch is appended to the [`Wal`] as one entry and then applied
//! in memory. Periodic [`Snapshot`]s bound replay time on startup.

mod snapshot;
mod state;
mod store;
mod wal;

pub use snapshot::{load_snapshot, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{IdCounters, MaterializedState};
pub use store::{
    ClaimRequest, Claimed, NewRun, ReadyOutcome, Reported, StopOutcome, Store, StoreError, Txn,
};
pub use wal::{Wal, WalEntry, WalError};
