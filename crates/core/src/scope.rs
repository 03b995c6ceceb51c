// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner/repository scoping for runners, jobs and task versions.

use crate::id::{OwnerId, RepoId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which repositories a runner serves, or where a job lives.
///
/// A runner with a repo id serves that repository only; with just an owner
/// id it serves every repository of that owner; with neither it is global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub owner_id: OwnerId,
    #[serde(default)]
    pub repo_id: RepoId,
}

impl Scope {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn owner(owner_id: OwnerId) -> Self {
        Self { owner_id, repo_id: RepoId::NONE }
    }

    pub fn repo(owner_id: OwnerId, repo_id: RepoId) -> Self {
        Self { owner_id, repo_id }
    }

    /// Whether a runner with this scope may take work located at `job`.
    pub fn covers(&self, job: &Scope) -> bool {
        if !self.repo_id.is_none() {
            job.repo_id == self.repo_id
        } else if !self.owner_id.is_none() {
            job.owner_id == self.owner_id
        } else {
            true
        }
    }

    /// The task-version counter a runner in this scope polls.
    pub fn version_key(&self) -> ScopeKey {
        if !self.repo_id.is_none() {
            ScopeKey { owner_id: OwnerId::NONE, repo_id: self.repo_id }
        } else {
            ScopeKey { owner_id: self.owner_id, repo_id: RepoId::NONE }
        }
    }

    /// Every counter that must move when work appears at this location:
    /// global, the owner's, and the repository's.
    pub fn affected_version_keys(&self) -> Vec<ScopeKey> {
        let mut keys = vec![ScopeKey::default()];
        if !self.owner_id.is_none() {
            keys.push(ScopeKey { owner_id: self.owner_id, repo_id: RepoId::NONE });
        }
        if !self.repo_id.is_none() {
            keys.push(ScopeKey { owner_id: OwnerId::NONE, repo_id: self.repo_id });
        }
        keys
    }
}

/// Key of a tasks-version counter.
///
/// Serializes as `"owner/repo"` so it can key JSON maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    pub owner_id: OwnerId,
    pub repo_id: RepoId,
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.repo_id)
    }
}

impl std::str::FromStr for ScopeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, repo) =
            s.split_once('/').ok_or_else(|| format!("invalid scope key: {s}"))?;
        let owner_id = owner.parse().map_err(|_| format!("invalid owner in scope key: {s}"))?;
        let repo_id = repo.parse().map_err(|_| format!("invalid repo in scope key: {s}"))?;
        Ok(Self { owner_id, repo_id })
    }
}

impl Serialize for ScopeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScopeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
