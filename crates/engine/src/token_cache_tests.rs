// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn id(n: u64) -> TaskId {
    TaskId::new(n)
}

#[test]
fn evicts_least_recently_used() {
    let cache = TokenCache::new(2);
    cache.insert("a", id(1));
    cache.insert("b", id(2));
    // Touch "a" so "b" becomes the eviction candidate.
    assert_eq!(cache.get("a"), Some(id(1)));
    cache.insert("c", id(3));

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some(id(1)));
    assert_eq!(cache.get("c"), Some(id(3)));
}

#[test]
fn reinsert_updates_value() {
    let cache = TokenCache::new(4);
    cache.insert("a", id(1));
    cache.insert("a", id(9));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("a"), Some(id(9)));
}

#[test]
fn zero_capacity_disables() {
    let cache = TokenCache::disabled();
    cache.insert("a", id(1));
    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
}

#[test]
fn remove_forgets_token() {
    let cache = TokenCache::new(4);
    cache.insert("a", id(1));
    cache.remove("a");
    assert_eq!(cache.get("a"), None);
}
