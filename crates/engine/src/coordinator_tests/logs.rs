// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

async fn running_task(h: &Harness) -> (Runner, TaskPayload) {
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();
    (runner, task)
}

#[tokio::test]
async fn append_advances_ack_and_indexes() {
    let h = harness();
    let (runner, task) = running_task(&h).await;

    let ack = h.log(&runner, task.task_id, 0, &["one", "two"], false).await.unwrap();
    assert_eq!(ack, 2);
    let log = h.task(task.task_id).log;
    assert_eq!(log.length, 2);
    assert_eq!(log.indexes.len(), 2);
    assert_eq!(log.indexes[0], 0);

    let line = crate::format_row(&row("one"));
    assert_eq!(log.indexes[1], line.len() as u64);
    assert_eq!(log.size, 2 * line.len() as u64);
}

#[tokio::test]
async fn resent_rows_are_not_duplicated() {
    let h = harness();
    let (runner, task) = running_task(&h).await;

    h.log(&runner, task.task_id, 0, &["a", "b"], false).await.unwrap();
    let ack = h.log(&runner, task.task_id, 1, &["b", "c"], false).await.unwrap();
    assert_eq!(ack, 3);

    // Fully known chunk: ack unchanged.
    assert_eq!(h.log(&runner, task.task_id, 0, &["a", "b"], false).await.unwrap(), 3);

    let body = String::from_utf8(h.coord.read_log(task.task_id).await.unwrap()).unwrap();
    let contents: Vec<&str> = body.lines().map(|l| l.split_once(' ').unwrap().1).collect();
    assert_eq!(contents, ["a", "b", "c"]);
}

#[tokio::test]
async fn chunk_past_ack_is_ignored() {
    let h = harness();
    let (runner, task) = running_task(&h).await;

    assert_eq!(h.log(&runner, task.task_id, 5, &["late"], false).await.unwrap(), 0);
    assert_eq!(h.log(&runner, task.task_id, 0, &[], false).await.unwrap(), 0);
    assert_eq!(h.task(task.task_id).log.length, 0);
}

#[tokio::test]
async fn no_more_archives_then_removes_sink() {
    let h = harness();
    let (runner, task) = running_task(&h).await;

    h.log(&runner, task.task_id, 0, &["hello"], true).await.unwrap();

    let stored = h.task(task.task_id);
    assert!(stored.log.in_storage);
    let object = h.archive.object(&stored.log.filename).unwrap();
    assert!(String::from_utf8(object).unwrap().ends_with(" hello\n"));
    assert!(!h.coord.sinks.path(task.task_id).exists());
}

#[tokio::test]
async fn rows_after_archive_conflict() {
    let h = harness();
    let (runner, task) = running_task(&h).await;
    h.log(&runner, task.task_id, 0, &["hello"], true).await.unwrap();

    let err = h.log(&runner, task.task_id, 1, &["more"], false).await.unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyArchived(_)));
    // A resend of archived rows is still acknowledged.
    assert_eq!(h.log(&runner, task.task_id, 0, &["hello"], true).await.unwrap(), 1);
}

#[tokio::test]
async fn failed_put_keeps_sink_for_retry() {
    let h = harness();
    let (runner, task) = running_task(&h).await;
    h.archive.set_fail_puts(true);

    assert!(h.log(&runner, task.task_id, 0, &["hello"], true).await.is_err());
    assert!(!h.task(task.task_id).log.in_storage);
    assert!(h.coord.sinks.path(task.task_id).exists());

    h.archive.set_fail_puts(false);
    h.coord.transfer_log(task.task_id).await.unwrap();
    assert!(h.task(task.task_id).log.in_storage);
    assert!(!h.coord.sinks.path(task.task_id).exists());
    assert_eq!(h.archive.put_count(), 1);
}

#[tokio::test]
async fn no_more_without_new_rows_only_echoes_ack() {
    let h = harness();
    let (runner, task) = running_task(&h).await;
    h.log(&runner, task.task_id, 0, &["a"], false).await.unwrap();

    assert_eq!(h.log(&runner, task.task_id, 1, &[], true).await.unwrap(), 1);
    assert_eq!(h.log(&runner, task.task_id, 0, &["a"], true).await.unwrap(), 1);

    assert!(!h.task(task.task_id).log.in_storage);
    assert!(h.coord.sinks.path(task.task_id).exists());
    assert_eq!(h.archive.put_count(), 0);
}

#[tokio::test]
async fn compressed_archive_round_trips_through_read_log() {
    let h = harness_with(EngineConfig { log_compression: crate::LogCompression::Zstd, ..EngineConfig::default() });
    let (runner, task) = running_task(&h).await;
    h.log(&runner, task.task_id, 0, &["x", "y"], true).await.unwrap();

    let filename = h.task(task.task_id).log.filename;
    let raw = h.archive.object(&filename).unwrap();
    assert_ne!(raw.first(), Some(&b'2'));

    let body = String::from_utf8(h.coord.read_log(task.task_id).await.unwrap()).unwrap();
    assert_eq!(body.lines().count(), 2);
}

#[tokio::test]
async fn log_of_other_runner_task_is_rejected() {
    let h = harness();
    let (_, task) = running_task(&h).await;
    let intruder = h.register(&[]);

    let err = h.log(&intruder, task.task_id, 0, &["x"], false).await.unwrap_err();
    assert_eq!(err.code(), "unauthenticated");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Whatever order chunks arrive in, the ack never decreases and the
    /// stored rows are a prefix of the sent rows.
    #[test]
    fn ack_is_monotonic(chunks in proptest::collection::vec((0u64..8, 0usize..4), 1..12)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let h = harness();
            let (runner, task) = running_task(&h).await;
            let all: Vec<String> = (0..12).map(|i| format!("row {i}")).collect();
            let mut last = 0;
            for (start, len) in chunks {
                let end = (start as usize + len).min(all.len());
                let slice: Vec<&str> = all[start as usize..end].iter().map(String::as_str).collect();
                let ack = h.log(&runner, task.task_id, start, &slice, false).await.unwrap();
                prop_assert!(ack >= last);
                last = ack;
            }
            let body = String::from_utf8(h.coord.read_log(task.task_id).await.unwrap()).unwrap();
            let stored: Vec<&str> = body.lines().map(|l| l.split_once(' ').unwrap().1).collect();
            prop_assert_eq!(stored.len() as u64, last);
            for (i, content) in stored.iter().enumerate() {
                prop_assert_eq!(*content, all[i].as_str());
            }
            Ok(())
        })?;
    }
}
