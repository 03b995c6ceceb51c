// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! drover daemon library
//!
//! The `droverd` binary is a thin wrapper: [`lifecycle::startup`] opens the
//! store and binds the sockets, [`listener::Listener`] serves requests, and
//! the [`timers`] drive the reaper, schedules and checkpoints.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod settings;
pub mod timers;

pub use lifecycle::{startup, Config, DaemonCoordinator, DaemonState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
pub use settings::Settings;
