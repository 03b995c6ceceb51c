// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling knobs.

use drover_core::parse_duration;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// How archived logs are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCompression {
    #[default]
    None,
    Zstd,
}

/// Timeouts and limits for the scheduling services. Durations deserialize
/// from strings such as `"10m"` or `"3h"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Running task with no update for this long is a zombie.
    #[serde(deserialize_with = "de_duration")]
    pub zombie_task_timeout: Duration,
    /// Running task started this long ago is endless.
    #[serde(deserialize_with = "de_duration")]
    pub endless_task_timeout: Duration,
    /// Waiting or blocked job untouched this long is abandoned.
    #[serde(deserialize_with = "de_duration")]
    pub abandoned_job_timeout: Duration,
    /// Rows loaded per reaper sweep.
    pub reaper_batch_size: usize,
    /// Task-token cache entries; 0 disables the cache.
    pub token_cache_size: usize,
    pub log_compression: LogCompression,
    /// Logs of tasks stopped longer ago than this are expired.
    #[serde(deserialize_with = "de_duration")]
    pub log_retention: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zombie_task_timeout: Duration::from_secs(10 * 60),
            endless_task_timeout: Duration::from_secs(3 * 3600),
            abandoned_job_timeout: Duration::from_secs(24 * 3600),
            reaper_batch_size: 100,
            token_cache_size: 1000,
            log_compression: LogCompression::None,
            log_retention: Duration::from_secs(365 * 86400),
        }
    }
}

impl EngineConfig {
    pub fn compress_logs(&self) -> bool {
        self.log_compression == LogCompression::Zstd
    }
}

/// Serde adapter for duration strings.
pub fn de_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
