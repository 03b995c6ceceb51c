// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drover-engine: the scheduling services.
//!
//! [`Coordinator`] ties the store to the collaborators and exposes the
//! runner-facing calls (register, declare, fetch, update, log), the reaper
//! sweeps, and the schedule trigger.

mod assign;
mod config;
mod coordinator;
mod error;
mod logs;
mod reaper;
mod registry;
mod runs;
mod schedule;
mod token_cache;
mod update;

pub use assign::{FetchedTask, NeedResult, TaskPayload};
pub use config::{de_duration, EngineConfig, LogCompression};
pub use coordinator::{Coordinator, CoordinatorDeps, StatusSummary};
pub use error::ServiceError;
pub use logs::{format_row, LogChunk, LogRow, LogSinks};
pub use reaper::SweepReport;
pub use registry::Registration;
pub use schedule::NewSchedule;
pub use token_cache::TokenCache;
pub use update::{TaskStateUpdate, TaskUpdateAck, MAX_OUTPUT_KEY_LEN, MAX_OUTPUT_VALUE_LEN};
