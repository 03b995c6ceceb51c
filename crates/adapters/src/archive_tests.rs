// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use yare::parameterized;

#[tokio::test]
async fn fs_put_get_delete() {
    let dir = tempdir().unwrap();
    let archive = FsArchive::new(dir.path());

    archive.put("1/2/0a/10.log", b"hello\n".to_vec()).await.unwrap();
    assert_eq!(archive.get("1/2/0a/10.log").await.unwrap(), b"hello\n");
    assert!(dir.path().join("1/2/0a/10.log").exists());

    archive.delete("1/2/0a/10.log").await.unwrap();
    assert!(matches!(archive.get("1/2/0a/10.log").await, Err(ArchiveError::NotFound(_))));
    // Deleting again is fine.
    archive.delete("1/2/0a/10.log").await.unwrap();
}

#[tokio::test]
async fn fs_put_replaces_and_leaves_no_part_file() {
    let dir = tempdir().unwrap();
    let archive = FsArchive::new(dir.path());
    archive.put("a.log", b"one".to_vec()).await.unwrap();
    archive.put("a.log", b"two".to_vec()).await.unwrap();

    assert_eq!(archive.get("a.log").await.unwrap(), b"two");
    assert!(!dir.path().join("a.log.part").exists());
}

#[parameterized(
    empty = { "" },
    parent = { "../escape.log" },
    absolute = { "/etc/passwd" },
    inner_parent = { "1/../../x.log" },
)]
#[test_macro(tokio::test)]
async fn fs_rejects_paths_outside_root(path: &str) {
    let dir = tempdir().unwrap();
    let archive = FsArchive::new(dir.path());
    assert!(matches!(
        archive.put(path, Vec::new()).await,
        Err(ArchiveError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn fake_records_objects_and_injects_failures() {
    let archive = FakeArchive::new();
    archive.put("x.log", b"x".to_vec()).await.unwrap();
    assert_eq!(archive.object("x.log").unwrap(), b"x");
    assert_eq!(archive.put_count(), 1);

    archive.set_fail_puts(true);
    assert!(archive.put("y.log", b"y".to_vec()).await.is_err());
    assert!(archive.object("y.log").is_none());
}
