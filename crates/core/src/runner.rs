// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner identity records.

use crate::id::RunnerId;
use crate::labels::LabelSet;
use crate::scope::Scope;
use crate::token::SaltedToken;
use serde::{Deserialize, Serialize};

/// A registered worker agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub id: RunnerId,
    pub uuid: String,
    pub name: String,
    pub scope: Scope,
    pub labels: LabelSet,
    pub version: String,
    pub secret: SaltedToken,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

/// An out-of-band registration token for one owner/repo scope.
///
/// Issuing a new token for a scope deactivates the previous ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationToken {
    pub token: String,
    pub scope: Scope,
    pub is_active: bool,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at_ms: Option<u64>,
}
