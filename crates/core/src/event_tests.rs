// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn events_serialize_with_type_tag() {
    let event = Event::TaskLogArchived { id: TaskId::new(3) };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "task:log_archived");
    assert_eq!(json["id"], 3);
}

#[test]
fn name_matches_serde_tag() {
    let events = [
        Event::TaskLogExpired { id: TaskId::new(1) },
        Event::SchedulesDeleted { repo_id: RepoId::new(1) },
        Event::JobRequeued { id: JobId::new(1), expected_task: TaskId::new(2), at_ms: 0 },
        Event::TasksVersionSet { key: ScopeKey::default(), version: 1 },
    ];
    for event in events {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }
}

#[test]
fn optional_fields_are_omitted() {
    let event = Event::JobStatusChanged {
        id: JobId::new(1),
        status: Status::Cancelled,
        expected_task: None,
        stopped_at_ms: None,
        at_ms: 5,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(!json.contains("expected_task"));
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
