// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.zombie_task_timeout, Duration::from_secs(600));
    assert_eq!(config.endless_task_timeout, Duration::from_secs(10_800));
    assert_eq!(config.abandoned_job_timeout, Duration::from_secs(86_400));
    assert_eq!(config.reaper_batch_size, 100);
    assert_eq!(config.token_cache_size, 1000);
    assert!(!config.compress_logs());
}

#[test]
fn deserializes_partial_json_with_duration_strings() {
    let config: EngineConfig =
        serde_json::from_str(r#"{"zombie_task_timeout": "2m", "log_compression": "zstd"}"#).unwrap();
    assert_eq!(config.zombie_task_timeout, Duration::from_secs(120));
    assert!(config.compress_logs());
    assert_eq!(config.reaper_batch_size, 100);
}

#[test]
fn bad_duration_is_a_deserialize_error() {
    let err = serde_json::from_str::<EngineConfig>(r#"{"log_retention": "forever"}"#).unwrap_err();
    assert!(err.to_string().contains("forever"));
}
