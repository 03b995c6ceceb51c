// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drover-core: domain types shared by the drover scheduler crates

pub mod macros;

pub mod clock;
pub mod duration;
pub mod event;
pub mod id;
pub mod job;
pub mod labels;
pub mod runner;
pub mod schedule;
pub mod scope;
pub mod status;
pub mod task;
pub mod token;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use duration::parse_duration;
pub use event::Event;
pub use id::{JobId, OwnerId, RepoId, RunId, RunnerId, ScheduleId, SpecId, TaskId};
pub use job::{Job, JobSpec, JobSpecBuilder, Run};
pub use labels::LabelSet;
pub use runner::{RegistrationToken, Runner};
pub use schedule::{Schedule, ScheduleSpec};
pub use scope::{Scope, ScopeKey};
pub use status::{aggregate_status, Status, TaskResult};
pub use task::{
    log_filename, truncate_name, StepReport, Task, TaskLog, TaskStep, MAX_NAME_BYTES,
};
pub use token::SaltedToken;
