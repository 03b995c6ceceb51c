// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fs2::FileExt;

use super::super::{Config, LifecycleError, StartupResult};
use super::startup;

#[tokio::test]
async fn startup_creates_layout_and_writes_pid() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::at(dir.path());

    let StartupResult { daemon, tcp, .. } = startup(&config).await.unwrap();
    assert!(tcp.is_none());
    assert!(config.socket_path.exists());
    assert!(config.live_logs_path.is_dir());
    assert!(config.archive_path.is_dir());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(daemon.settings, crate::settings::Settings::default());
}

#[tokio::test]
async fn startup_lock_failed_does_not_remove_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::at(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    std::fs::write(&config.socket_path, b"").unwrap();

    // Simulate a running daemon holding the lock
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"12345").unwrap();

    match startup(&config).await {
        Err(LifecycleError::LockFailed(_)) => {}
        Err(e) => panic!("expected LockFailed, got: {e}"),
        Ok(_) => panic!("expected LockFailed, but startup succeeded"),
    }

    assert!(config.socket_path.exists(), "socket file must not be deleted on LockFailed");
    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap(), "12345");
}

#[tokio::test]
async fn bad_settings_fail_startup_and_clean_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::at(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    std::fs::write(&config.settings_path, "reaper_interval = \"whenever\"\n").unwrap();

    match startup(&config).await {
        Err(LifecycleError::Config(_)) => {}
        Err(e) => panic!("expected Config error, got: {e}"),
        Ok(_) => panic!("expected Config error, but startup succeeded"),
    }
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn startup_recovers_state_from_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::at(dir.path());
    let scope = drover_core::Scope::repo(7.into(), 8.into());

    {
        let StartupResult { mut daemon, .. } = startup(&config).await.unwrap();
        daemon.coordinator.put_registration_token("reg", scope).unwrap();
        daemon.coordinator.register_runner("reg", "builder", "1.0", &[]).unwrap();
        daemon.shutdown().unwrap();
    }

    let StartupResult { daemon, .. } = startup(&config).await.unwrap();
    assert_eq!(daemon.coordinator.status_summary().runners, 1);
}
