// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn at(secs: i64, nanos: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, nanos).unwrap()
}

#[test]
fn row_format_uses_rfc3339_nanos() {
    let row = LogRow { time: at(1_704_067_200, 42), content: "hello world".into() };
    assert_eq!(format_row(&row), "2024-01-01T00:00:00.000000042Z hello world\n");
}

#[tokio::test]
async fn sink_append_truncates_uncommitted_tail() {
    let dir = tempfile::tempdir().unwrap();
    let sinks = LogSinks::new(dir.path());
    let id = TaskId::new(7);

    sinks.append(id, 0, b"first\n").await.unwrap();
    sinks.append(id, 6, b"junk-from-lost-commit\n").await.unwrap();
    sinks.append(id, 6, b"second\n").await.unwrap();

    assert_eq!(sinks.read(id).await.unwrap(), b"first\nsecond\n");
}

#[tokio::test]
async fn missing_sink_reads_empty_and_removes_ok() {
    let dir = tempfile::tempdir().unwrap();
    let sinks = LogSinks::new(dir.path().join("nested"));
    let id = TaskId::new(1);

    assert!(sinks.read(id).await.unwrap().is_empty());
    sinks.remove(id).await.unwrap();
}

#[test]
fn sink_path_is_per_task() {
    let sinks = LogSinks::new("/tmp/drover-logs");
    assert_eq!(sinks.path(TaskId::new(12)), std::path::Path::new("/tmp/drover-logs/12.log"));
}
