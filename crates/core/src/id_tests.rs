// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;

#[test]
fn zero_is_the_none_sentinel() {
    assert!(TaskId::NONE.is_none());
    assert!(TaskId::default().is_none());
    assert!(!TaskId::new(7).is_none());
}

#[test]
fn ids_order_numerically_in_maps() {
    let mut map = BTreeMap::new();
    map.insert(JobId::new(10), "b");
    map.insert(JobId::new(2), "a");
    let keys: Vec<u64> = map.keys().map(|k| k.get()).collect();
    assert_eq!(keys, vec![2, 10]);
}

#[test]
fn ids_serialize_as_bare_numbers() {
    let json = serde_json::to_string(&RunnerId::new(42)).unwrap();
    assert_eq!(json, "42");
    let back: RunnerId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, RunnerId::new(42));
}

#[test]
fn ids_parse_from_strings() {
    assert_eq!("17".parse::<TaskId>().unwrap(), TaskId::new(17));
    assert!("task-17".parse::<TaskId>().is_err());
}

#[test]
fn kind_labels() {
    assert_eq!(TaskId::KIND, "task");
    assert_eq!(RunnerId::KIND, "runner");
}
