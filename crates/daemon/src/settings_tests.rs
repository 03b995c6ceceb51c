// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_engine::LogCompression;

#[test]
fn empty_file_gives_defaults() {
    assert_eq!(Settings::parse("").unwrap(), Settings::default());
}

#[test]
fn engine_knobs_are_flattened() {
    let settings = Settings::parse(
        r#"
zombie_task_timeout = "2m"
reaper_batch_size = 10
log_compression = "zstd"
reaper_interval = "15s"
"#,
    )
    .unwrap();
    assert_eq!(settings.engine.zombie_task_timeout, Duration::from_secs(120));
    assert_eq!(settings.engine.reaper_batch_size, 10);
    assert_eq!(settings.engine.log_compression, LogCompression::Zstd);
    assert_eq!(settings.reaper_interval, Duration::from_secs(15));
    assert_eq!(settings.checkpoint_interval, Settings::default().checkpoint_interval);
}

#[yare::parameterized(
    bad_duration = { r#"reaper_interval = "soon""# },
    bad_suffix = { r#"zombie_task_timeout = "5y""# },
    wrong_type = { "reaper_batch_size = \"many\"" },
    bad_compression = { r#"log_compression = "gzip""# },
)]
fn invalid_settings_are_rejected(raw: &str) {
    assert!(matches!(Settings::parse(raw), Err(LifecycleError::Config(_))));
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("drover.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drover.toml");
    std::fs::write(&path, "schedule_interval = \"1m\"\n").unwrap();
    assert_eq!(Settings::load(&path).unwrap().schedule_interval, Duration::from_secs(60));
}
