// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log Ingestion & Archival: live sink files, acknowledged appends, and
//! transfer to the archive once a task's log is complete.

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use chrono::{DateTime, SecondsFormat, Utc};
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{Clock, Runner, Task, TaskId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::OwnedMutexGuard;

/// zstd level used for archived logs.
const ARCHIVE_ZSTD_LEVEL: i32 = 3;

/// One line of task output as sent by a runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub time: DateTime<Utc>,
    pub content: String,
}

/// Format a row as stored: `{RFC3339 with nanoseconds} {content}\n`.
pub fn format_row(row: &LogRow) -> String {
    format!("{} {}\n", row.time.to_rfc3339_opts(SecondsFormat::Nanos, true), row.content)
}

/// A batch of rows starting at row `index` of the task's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChunk {
    pub task_id: TaskId,
    pub index: u64,
    #[serde(default)]
    pub rows: Vec<LogRow>,
    #[serde(default)]
    pub no_more: bool,
}

/// Live (not yet archived) task logs, one file per task under `dir`.
///
/// Writers for the same task are serialized through a per-task lock held
/// across the sink write and the store commit.
pub struct LogSinks {
    dir: PathBuf,
    locks: Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>,
}

impl LogSinks {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), locks: Mutex::new(HashMap::new()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, id: TaskId) -> PathBuf {
        self.dir.join(format!("{id}.log"))
    }

    pub(crate) async fn lock(&self, id: TaskId) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().entry(id).or_default().clone();
        lock.lock_owned().await
    }

    fn forget(&self, id: TaskId) {
        self.locks.lock().remove(&id);
    }

    /// Write `bytes` at offset `base_size`, discarding anything past it.
    ///
    /// Bytes beyond the committed size belong to an append whose commit
    /// never happened, so they are overwritten.
    pub async fn append(&self, id: TaskId, base_size: u64, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path(id))
            .await?;
        file.set_len(base_size).await?;
        file.seek(SeekFrom::Start(base_size)).await?;
        file.write_all(bytes).await?;
        file.sync_data().await
    }

    /// Sink contents; empty when the task never logged.
    pub async fn read(&self, id: TaskId) -> std::io::Result<Vec<u8>> {
        match tokio::fs::read(self.path(id)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn remove(&self, id: TaskId) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path(id)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Append log rows for a task held by `runner` and return the ack
    /// index (the number of rows stored).
    ///
    /// Rows the server already has are skipped, so a runner may resend a
    /// chunk freely. A chunk starting past the ack leaves a gap and is
    /// ignored; the runner resends from the returned ack. A chunk with
    /// nothing new only echoes the ack, even when it carries `no_more`.
    pub async fn update_log(&self, runner: &Runner, chunk: LogChunk) -> Result<u64, ServiceError> {
        let _guard = self.sinks.lock(chunk.task_id).await;
        let task = self.owned_task(runner, chunk.task_id)?;

        let mut ack = task.log.length;
        let rows = chunk.rows.len() as u64;
        let has_new_rows = rows > 0 && chunk.index <= ack && chunk.index + rows > ack;

        if has_new_rows {
            if task.log.in_storage {
                return Err(ServiceError::AlreadyArchived(task.id));
            }
            let skip = (ack - chunk.index) as usize;
            let mut buf = String::new();
            let mut offsets = Vec::with_capacity(chunk.rows.len() - skip);
            for row in &chunk.rows[skip..] {
                offsets.push(task.log.size + buf.len() as u64);
                buf.push_str(&format_row(row));
            }
            let size = task.log.size + buf.len() as u64;

            self.sinks.append(task.id, task.log.size, buf.as_bytes()).await?;
            let now = self.now_ms();
            ack = self.store.transact(|tx| tx.append_log(task.id, ack, offsets, size, now))?;
            tracing::debug!(task_id = %task.id, ack, size, "log rows appended");

            if chunk.no_more {
                self.archive_locked(task.id).await?;
            }
        }
        Ok(ack)
    }

    /// Move a task's live log to the archive if it is still live.
    pub(crate) async fn transfer_log(&self, id: TaskId) -> Result<(), ServiceError> {
        let _guard = self.sinks.lock(id).await;
        self.archive_locked(id).await
    }

    /// Full log of a task, from the sink while live and from the archive
    /// afterwards.
    pub async fn read_log(&self, id: TaskId) -> Result<Vec<u8>, ServiceError> {
        let task = self.store.read(|s| s.task(id).cloned()).ok_or_else(|| ServiceError::not_found("task", id))?;
        if !task.log.in_storage {
            return Ok(self.sinks.read(id).await?);
        }
        if task.log.expired {
            return Err(ServiceError::not_found("log", id));
        }
        let body = self.archive.get(&task.log.filename).await?;
        if is_compressed(&task) {
            return Ok(zstd::decode_all(body.as_slice())?);
        }
        Ok(body)
    }

    /// Put the sink into the archive, commit `in_storage`, then drop the
    /// sink. A failed put keeps the sink so a later call can retry.
    async fn archive_locked(&self, id: TaskId) -> Result<(), ServiceError> {
        let task = self.store.read(|s| s.task(id).cloned()).ok_or_else(|| ServiceError::not_found("task", id))?;
        if task.log.in_storage {
            return Ok(());
        }

        let raw = self.sinks.read(id).await?;
        let body = if is_compressed(&task) {
            zstd::encode_all(raw.as_slice(), ARCHIVE_ZSTD_LEVEL)?
        } else {
            raw
        };
        let bytes = body.len();
        self.archive.put(&task.log.filename, body).await?;
        self.store.transact(|tx| tx.mark_log_archived(id))?;

        if let Err(e) = self.sinks.remove(id).await {
            tracing::warn!(task_id = %id, error = %e, "failed to remove log sink");
        }
        self.sinks.forget(id);
        tracing::info!(task_id = %id, filename = %task.log.filename, bytes, "log archived");
        Ok(())
    }

    /// The task, provided `runner` is the one executing it.
    pub(crate) fn owned_task(&self, runner: &Runner, id: TaskId) -> Result<Task, ServiceError> {
        let task = self.store.read(|s| s.task(id).cloned()).ok_or_else(|| ServiceError::not_found("task", id))?;
        if task.runner_id != runner.id {
            tracing::warn!(task_id = %id, runner_id = %runner.id, "runner does not hold task");
            return Err(ServiceError::Authentication(format!("task {id} belongs to another runner")));
        }
        Ok(task)
    }

    /// Delete the archived log of a stopped task and mark it expired.
    pub(crate) async fn expire_log(&self, id: TaskId) -> Result<(), ServiceError> {
        let _guard = self.sinks.lock(id).await;
        let task = self.store.read(|s| s.task(id).cloned()).ok_or_else(|| ServiceError::not_found("task", id))?;
        if task.log.expired {
            return Ok(());
        }
        if task.log.in_storage {
            self.archive.delete(&task.log.filename).await?;
        } else {
            self.sinks.remove(id).await?;
        }
        self.store.transact(|tx| tx.mark_log_expired(id))?;
        self.sinks.forget(id);
        tracing::info!(task_id = %id, filename = %task.log.filename, "log expired");
        Ok(())
    }
}

fn is_compressed(task: &Task) -> bool {
    task.log.filename.ends_with(".zst")
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
