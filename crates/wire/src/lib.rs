// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner and admin protocol for the drover daemon.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod types;
mod wire;

pub use request::Request;
pub use response::{ErrorCode, Response};
pub use types::{
    JobEntry, LogLine, NeedInfo, RunInfo, RunnerAuth, RunnerInfo, ScheduleRequest, StatusInfo,
    TaskContextInfo, TaskInfo, TaskState,
};
pub use wire::{
    decode, encode, read_message, read_request, read_response, write_message, write_request,
    write_response, ProtocolError, MAX_MESSAGE_BYTES,
};

#[cfg(test)]
mod property_tests;
