// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use drover_adapters::{FsArchive, LogNotifyAdapter, LogStatusPublisher};
use drover_core::SystemClock;
use drover_engine::Coordinator;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};

use crate::settings::Settings;

/// Coordinator with the daemon's concrete collaborators
pub type DaemonCoordinator =
    Coordinator<FsArchive, LogStatusPublisher, LogNotifyAdapter, SystemClock>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/drover)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Directory of the daemon's own log files
    pub log_dir: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Live task logs, one file per task
    pub live_logs_path: PathBuf,
    /// Root of the filesystem archive
    pub archive_path: PathBuf,
    /// Optional `drover.toml`
    pub settings_path: PathBuf,
    /// TCP port for remote runners; Unix socket only when unset
    pub tcp_port: Option<u16>,
}

impl Config {
    /// Load configuration for the daemon from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let mut config = Self::at(&crate::env::state_dir()?);
        config.tcp_port = crate::env::tcp_port();
        Ok(config)
    }

    /// Standard layout under `state_dir`.
    pub fn at(state_dir: &Path) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_dir: state_dir.join("log"),
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.json"),
            live_logs_path: state_dir.join("logs"),
            archive_path: state_dir.join("archive"),
            settings_path: state_dir.join("drover.toml"),
            tcp_port: None,
            state_dir: state_dir.to_path_buf(),
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    pub settings: Settings,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Shared with the listener and the timers
    pub coordinator: Arc<DaemonCoordinator>,
    pub start_time: Instant,
}

/// Result of daemon startup: the daemon state plus the bound listeners.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub unix: UnixListener,
    pub tcp: Option<TcpListener>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully.
    ///
    /// Running tasks are left as they are; runners keep reporting after the
    /// next start, and the reaper handles the ones that never do.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("shutting down daemon");

        match self.coordinator.store().checkpoint() {
            Ok(Some(seq)) => info!(seq, "saved final shutdown snapshot"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to save shutdown snapshot"),
        }

        for path in [&self.config.socket_path, &self.config.lock_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }

        info!("daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] drover_storage::StoreError),

    #[error("invalid settings: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
