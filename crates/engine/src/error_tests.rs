// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    not_found = { StoreError::not_found("task", 7), "not_found" },
    archived = { StoreError::LogArchived(TaskId::new(7)), "already_exists" },
    invalid_run = { StoreError::InvalidRun("cycle".into()), "invalid_argument" },
    poisoned = { StoreError::WalPoisoned, "internal" },
)]
fn store_errors_map_to_codes(err: StoreError, code: &str) {
    assert_eq!(ServiceError::from(err).code(), code);
}

#[test]
fn not_found_message_names_kind_and_id() {
    let err = ServiceError::from(StoreError::not_found("job", 12));
    assert_eq!(err.to_string(), "job 12 not found");
}

#[test]
fn archive_errors_are_internal() {
    let err = ServiceError::from(ArchiveError::NotFound("x.log".into()));
    assert_eq!(err.code(), "internal");
}
