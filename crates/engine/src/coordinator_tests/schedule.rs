// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::NewSchedule;
use std::time::Duration;

fn nightly(specs: &[&str]) -> NewSchedule {
    let jobs = vec![job("build")];
    NewSchedule {
        title: "nightly".into(),
        scope: repo_scope(),
        workflow_id: "nightly.yml".into(),
        ref_name: "refs/heads/main".into(),
        commit_sha: "c0ffee".into(),
        specs: specs.iter().map(|s| s.to_string()).collect(),
        payload: serde_json::to_string(&jobs).unwrap(),
    }
}

#[test]
fn invalid_specs_are_skipped() {
    let h = harness();
    let specs = ["@every 1h", "not a cron", "@every 18446744073709551615h"];
    let created = h.coord.create_schedules(vec![nightly(&specs)]).unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].specs.len(), 3);
    let specs = h.coord.store().read(|s| s.schedule_specs.values().cloned().collect::<Vec<_>>());
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].next_ms, h.coord.clock().epoch_ms() + 3_600_000);
}

#[test]
fn long_titles_are_truncated() {
    let h = harness();
    let mut schedule = nightly(&["@every 1h"]);
    schedule.title = "t".repeat(300);
    let created = h.coord.create_schedules(vec![schedule]).unwrap();
    assert_eq!(created[0].title.len(), 255);
}

#[test]
fn due_specs_and_advance() {
    let h = harness();
    h.coord.create_schedules(vec![nightly(&["@every 1h"])]).unwrap();
    assert!(h.coord.due_specs().is_empty());

    h.clock.advance(Duration::from_secs(3600));
    let due = h.coord.due_specs();
    assert_eq!(due.len(), 1);

    let next = h.coord.advance_spec(due[0].id).unwrap();
    assert_eq!(next, h.coord.clock().epoch_ms() + 3_600_000);
    assert!(h.coord.due_specs().is_empty());
}

#[tokio::test]
async fn firing_due_schedule_creates_scheduled_run() {
    let h = harness();
    let created = h.coord.create_schedules(vec![nightly(&["@every 1h"])]).unwrap();
    h.clock.advance(Duration::from_secs(3600));

    let runs = h.coord.fire_due_schedules().await;
    assert_eq!(runs.len(), 1);
    let run = h.coord.store().read(|s| s.run(runs[0]).cloned()).unwrap();
    assert_eq!(run.schedule_id, Some(created[0].id));
    assert_eq!(h.coord.run_jobs(run.id).unwrap().len(), 1);

    // Already advanced: nothing fires again this period.
    assert!(h.coord.fire_due_schedules().await.is_empty());
}

#[tokio::test]
async fn broken_payload_still_advances() {
    let h = harness();
    let mut schedule = nightly(&["@every 1h"]);
    schedule.payload = "oops".into();
    h.coord.create_schedules(vec![schedule]).unwrap();
    h.clock.advance(Duration::from_secs(3600));

    assert!(h.coord.fire_due_schedules().await.is_empty());
    assert!(h.coord.due_specs().is_empty());
}

#[test]
fn delete_by_repo_removes_schedules_and_specs() {
    let h = harness();
    h.coord.create_schedules(vec![nightly(&["@every 1h"]), nightly(&["0 0 * * *"])]).unwrap();

    assert_eq!(h.coord.delete_schedules_by_repo(RepoId::new(1)).unwrap(), 2);
    h.coord.store().read(|s| {
        assert!(s.schedules.is_empty());
        assert!(s.schedule_specs.is_empty());
    });
    assert_eq!(h.coord.delete_schedules_by_repo(RepoId::new(1)).unwrap(), 0);
}
