// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use drover_adapters::{
    FsArchive, JsonWorkflowParser, LogNotifyAdapter, LogStatusPublisher, ScheduleCronParser,
};
use drover_core::SystemClock;
use drover_engine::{Coordinator, CoordinatorDeps, LogSinks, TokenCache};
use drover_storage::Store;
use fs2::FileExt;
use tokio::net::{TcpListener, UnixListener};
use tracing::info;

use super::{Config, DaemonState, LifecycleError, StartupResult};
use crate::settings::Settings;

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock:
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Lock first. Open without truncating so a running daemon's PID survives.
    std::fs::create_dir_all(&config.state_dir)?;
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 2. Settings and directories
    let settings = Settings::load(&config.settings_path)?;
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.live_logs_path)?;
    std::fs::create_dir_all(&config.archive_path)?;

    // 3. Load snapshot and replay the WAL
    let store = Store::open(&config.wal_path, &config.snapshot_path)?;
    store.read(|s| {
        info!(
            runners = s.runners.len(),
            runs = s.runs.len(),
            jobs = s.jobs.len(),
            tasks = s.tasks.len(),
            schedules = s.schedules.len(),
            "recovered state"
        )
    });

    // 4. Wire up the coordinator
    let tokens = TokenCache::new(settings.engine.token_cache_size);
    let deps = CoordinatorDeps {
        store,
        archive: FsArchive::new(&config.archive_path),
        publisher: LogStatusPublisher,
        notifier: LogNotifyAdapter,
        parser: Arc::new(JsonWorkflowParser),
        cron: Arc::new(ScheduleCronParser),
        sinks: LogSinks::new(&config.live_logs_path),
    };
    let coordinator = Arc::new(Coordinator::new(deps, settings.engine.clone(), tokens, SystemClock));

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let unix = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.display().to_string(), e))?;

    let tcp = match config.tcp_port {
        Some(port) => {
            let addr = format!("0.0.0.0:{port}");
            let listener = TcpListener::bind(&addr)
                .await
                .map_err(|e| LifecycleError::BindFailed(addr, e))?;
            info!(port, "listening for remote runners");
            Some(listener)
        }
        None => None,
    };

    info!(state_dir = %config.state_dir.display(), "daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            settings,
            lock_file,
            coordinator,
            start_time: Instant::now(),
        },
        unix,
        tcp,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
