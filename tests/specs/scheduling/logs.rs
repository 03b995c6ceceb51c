// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live log streaming and archival.

use crate::prelude::*;

#[tokio::test]
async fn resent_chunks_do_not_duplicate_rows() {
    let world = World::new();
    let runner = world.register("builder", &[]);
    world.submit(vec![job("build", &[])]).await;
    let task = world.fetch(&runner).await.unwrap();

    assert_eq!(world.log(&runner, task.task_id, 0, &["one", "two"], false).await.unwrap(), 2);
    assert_eq!(world.log(&runner, task.task_id, 0, &["one", "two"], false).await.unwrap(), 2);
    assert_eq!(world.log(&runner, task.task_id, 1, &["two", "three"], false).await.unwrap(), 3);
    // A chunk past the ack leaves a gap and is ignored
    assert_eq!(world.log(&runner, task.task_id, 5, &["six"], false).await.unwrap(), 3);

    let body = String::from_utf8(world.coord.read_log(task.task_id).await.unwrap()).unwrap();
    let contents: Vec<&str> = body.lines().map(|l| l.split_once(' ').unwrap().1).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn finished_log_is_archived_compressed_and_still_readable() {
    let world = World::with_config(EngineConfig { log_compression: LogCompression::Zstd, ..EngineConfig::default() });
    let runner = world.register("builder", &[]);
    world.submit(vec![job("build", &[])]).await;
    let task = world.fetch(&runner).await.unwrap();

    world.log(&runner, task.task_id, 0, &["compiling"], false).await.unwrap();
    world.report(&runner, task.task_id, TaskResult::Success).await;
    assert_eq!(world.log(&runner, task.task_id, 0, &["compiling", "done"], true).await.unwrap(), 2);

    let log = world.coord.store().read(|s| s.task(task.task_id).unwrap().log.clone());
    assert!(log.in_storage);
    assert!(!world.dir.path().join("logs").join(format!("{}.log", task.task_id)).exists());

    let stored = std::fs::read(world.dir.path().join("archive").join(&log.filename)).unwrap();
    let raw = zstd::decode_all(stored.as_slice()).unwrap();
    assert_eq!(raw, world.coord.read_log(task.task_id).await.unwrap());
    assert!(String::from_utf8(raw).unwrap().ends_with(" done\n"));

    let late = world.log(&runner, task.task_id, 2, &["more"], false).await;
    assert!(matches!(late, Err(ServiceError::AlreadyArchived(id)) if id == task.task_id));
}

#[tokio::test]
async fn another_runner_cannot_write_the_log() {
    let world = World::new();
    let owner = world.register("owner", &[]);
    let intruder = world.register("intruder", &[]);
    world.submit(vec![job("build", &[])]).await;
    let task = world.fetch(&owner).await.unwrap();

    let result = world.log(&intruder, task.task_id, 0, &["spoofed"], false).await;
    assert!(matches!(result, Err(ServiceError::Authentication(_))));
}
