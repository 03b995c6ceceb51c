// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Collaborators of the drover scheduler.
//!
//! Each collaborator is a trait with a default implementation and, behind the
//! `test-support` feature, a recording fake.

pub mod archive;
pub mod crontab;
pub mod notify;
pub mod status;
pub mod workflow;

pub use archive::{ArchiveError, ArchiveStore, FsArchive};
pub use crontab::{CronParser, ScheduleCronParser};
pub use notify::{LogNotifyAdapter, NotifyAdapter, NotifyError};
pub use status::{CommitStatus, LogStatusPublisher, PublishError, StatusPublisher};
pub use workflow::{JsonWorkflowParser, ParseError, WorkflowParser};

#[cfg(any(test, feature = "test-support"))]
pub use archive::FakeArchive;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use status::FakeStatusPublisher;
