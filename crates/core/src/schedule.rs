// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron-driven workflow schedules.

use crate::id::{RepoId, ScheduleId, SpecId};
use crate::scope::Scope;
use serde::{Deserialize, Serialize};

/// A scheduled workflow of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub title: String,
    pub scope: Scope,
    pub workflow_id: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub commit_sha: String,
    pub specs: Vec<String>,
    #[serde(default)]
    pub payload: String,
    pub created_at_ms: u64,
}

/// One parsed cron spec with its precomputed next fire time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    pub id: SpecId,
    pub schedule_id: ScheduleId,
    pub repo_id: RepoId,
    pub spec: String,
    pub next_ms: u64,
}

impl ScheduleSpec {
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_ms <= now_ms
    }
}
