// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret generation and salted-hash verification.
//!
//! Runner secrets and task tokens are 40 lowercase hex characters. Only a
//! salt, an HMAC-SHA256 digest keyed by that salt, and the last eight
//! characters (an index for fast candidate lookup) are ever persisted.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Length of a plaintext token in characters.
pub const TOKEN_LEN: usize = 40;

/// Persisted form of a secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltedToken {
    pub salt: String,
    pub hash: String,
    pub last_eight: String,
}

impl SaltedToken {
    /// Generate a fresh secret, returning the plaintext once alongside the
    /// form that may be stored.
    pub fn generate() -> (String, SaltedToken) {
        let token = hex::encode(rand::random::<[u8; 20]>());
        let salt = hex::encode(rand::random::<[u8; 10]>());
        let salted = Self::from_plaintext(&token, salt);
        (token, salted)
    }

    /// Hash `token` with an existing salt.
    pub fn from_plaintext(token: &str, salt: String) -> Self {
        let hash = hash_token(token, &salt);
        Self { last_eight: last_eight(token).to_string(), salt, hash }
    }

    /// Constant-time check of a presented plaintext token.
    pub fn verify(&self, token: &str) -> bool {
        let Ok(expected) = hex::decode(&self.hash) else {
            return false;
        };
        HmacSha256::new_from_slice(self.salt.as_bytes())
            .map(|mut mac| {
                mac.update(token.as_bytes());
                mac.verify_slice(&expected).is_ok()
            })
            .unwrap_or(false)
    }
}

impl fmt::Debug for SaltedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltedToken").field("last_eight", &self.last_eight).finish_non_exhaustive()
    }
}

/// Hex HMAC-SHA256 of `token` keyed by `salt`.
pub fn hash_token(token: &str, salt: &str) -> String {
    // HMAC accepts keys of any length, so this never falls through.
    match HmacSha256::new_from_slice(salt.as_bytes()) {
        Ok(mut mac) => {
            mac.update(token.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => String::new(),
    }
}

/// True for exactly [`TOKEN_LEN`] lowercase hex characters.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// The trailing eight characters used as a lookup index.
pub fn last_eight(token: &str) -> &str {
    let start = token.len().saturating_sub(8);
    token.get(start..).unwrap_or(token)
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
