// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn config_layout_lives_under_state_dir() {
    let config = Config::at(Path::new("/var/lib/drover"));
    assert_eq!(config.socket_path, PathBuf::from("/var/lib/drover/daemon.sock"));
    assert_eq!(config.lock_path, PathBuf::from("/var/lib/drover/daemon.pid"));
    assert_eq!(config.wal_path, PathBuf::from("/var/lib/drover/wal/events.wal"));
    assert_eq!(config.settings_path, PathBuf::from("/var/lib/drover/drover.toml"));
    assert!(config.live_logs_path.starts_with(&config.state_dir));
    assert!(config.archive_path.starts_with(&config.state_dir));
    assert_ne!(config.live_logs_path, config.archive_path);
    assert_eq!(config.tcp_port, None);
}

#[tokio::test]
async fn shutdown_checkpoints_and_removes_runtime_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::at(dir.path());
    let StartupResult { mut daemon, unix, .. } = startup(&config).await.unwrap();
    drop(unix);

    daemon
        .coordinator
        .put_registration_token("reg-token", drover_core::Scope::repo(1.into(), 2.into()))
        .unwrap();
    daemon.shutdown().unwrap();

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    assert!(config.snapshot_path.exists());
}
