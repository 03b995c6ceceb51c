// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon settings, read from `drover.toml` in the state directory.
//!
//! ```toml
//! zombie_task_timeout = "10m"
//! log_compression = "zstd"
//! reaper_interval = "30s"
//! ```

use std::path::Path;
use std::time::Duration;

use drover_engine::{de_duration, EngineConfig};
use serde::Deserialize;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// How often the reaper sweeps zombie, endless and abandoned work.
    #[serde(deserialize_with = "de_duration")]
    pub reaper_interval: Duration,
    #[serde(deserialize_with = "de_duration")]
    pub checkpoint_interval: Duration,
    /// How often due schedule specs are fired.
    #[serde(deserialize_with = "de_duration")]
    pub schedule_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            reaper_interval: Duration::from_secs(60),
            checkpoint_interval: Duration::from_secs(5 * 60),
            schedule_interval: Duration::from_secs(30),
        }
    }
}

impl Settings {
    pub fn parse(raw: &str) -> Result<Self, LifecycleError> {
        toml::from_str(raw).map_err(|e| LifecycleError::Config(e.to_string()))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(LifecycleError::Io(e)),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
