// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios across the store, the scheduling services and the
//! daemon socket.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/scheduling/mod.rs"]
mod scheduling;

#[path = "specs/recovery/mod.rs"]
mod recovery;

#[path = "specs/socket/mod.rs"]
mod socket;
