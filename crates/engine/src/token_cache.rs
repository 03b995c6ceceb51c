// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded LRU map from plaintext task tokens to task ids.
//!
//! Advisory only: a hit is re-checked against the store before use.

use drover_core::TaskId;
use indexmap::IndexMap;
use parking_lot::Mutex;

pub struct TokenCache {
    capacity: usize,
    /// Least recently used first.
    entries: Mutex<IndexMap<String, TaskId>>,
}

impl TokenCache {
    /// A cache holding at most `capacity` tokens; 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: Mutex::new(IndexMap::with_capacity(capacity.min(4096))) }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a token, marking it most recently used.
    pub fn get(&self, token: &str) -> Option<TaskId> {
        let mut entries = self.entries.lock();
        let (index, _, id) = entries.get_full(token)?;
        let id = *id;
        let last = entries.len() - 1;
        entries.move_index(index, last);
        Some(id)
    }

    pub fn insert(&self, token: &str, id: TaskId) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        entries.shift_remove(token);
        entries.insert(token.to_string(), id);
        while entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }
    }

    pub fn remove(&self, token: &str) {
        self.entries.lock().shift_remove(token);
    }
}

#[cfg(test)]
#[path = "token_cache_tests.rs"]
mod tests;
