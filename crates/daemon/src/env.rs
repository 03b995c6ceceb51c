// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve state directory: DROVER_STATE_DIR > XDG_STATE_HOME/drover > ~/.local/state/drover
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("DROVER_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("drover"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/drover"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var("DROVER_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// TCP port for runner connections. When set, the daemon listens on this
/// port in addition to the Unix socket.
pub fn tcp_port() -> Option<u16> {
    std::env::var("DROVER_TCP_PORT").ok().and_then(|s| s.parse::<u16>().ok())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
