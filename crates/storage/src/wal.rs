// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of committed transactions.
//!
//! One JSON line per transaction: `{"seq": N, "events": [...]}`. A line is
//! only ever appended whole, so a crash can at worst leave a torn final line,
//! which [`Wal::open`] cuts off.

use drover_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub events: Vec<Event>,
}

pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
    write_seq: u64,
    unflushed: usize,
}

impl Wal {
    /// Open (or create) the log at `path`.
    ///
    /// `min_seq` is the sequence already covered by a snapshot; new entries
    /// are numbered after both it and the last entry on disk.
    pub fn open(path: &Path, min_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (entries, valid_len) = read_entries(path)?;
        if let Ok(meta) = fs::metadata(path) {
            if meta.len() > valid_len {
                tracing::warn!(
                    path = %path.display(),
                    kept = valid_len,
                    dropped = meta.len() - valid_len,
                    "truncating torn WAL tail"
                );
                OpenOptions::new().write(true).open(path)?.set_len(valid_len)?;
            }
        }

        let last_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            write_seq: last_seq.max(min_seq),
            unflushed: 0,
        })
    }

    /// Buffer one transaction; returns its sequence number.
    pub fn append(&mut self, events: &[Event]) -> Result<u64, WalError> {
        let seq = self.write_seq + 1;
        let entry = WalEntry { seq, events: events.to_vec() };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.write_seq = seq;
        self.unflushed += 1;
        Ok(seq)
    }

    /// Write buffered entries through to disk.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.unflushed == 0 {
            return Ok(());
        }
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unflushed = 0;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// Every flushed entry with `seq > after`, in order.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let (entries, _) = read_entries(&self.path)?;
        Ok(entries.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Drop entries with `seq < keep_from`; used once a snapshot covers them.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        self.flush()?;
        let (entries, _) = read_entries(&self.path)?;

        let tmp = self.path.with_extension("wal.tmp");
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            for entry in entries.iter().filter(|e| e.seq >= keep_from) {
                serde_json::to_writer(&mut out, entry)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
            out.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }
}

/// Parse entries up to the first unreadable line. Returns them together with
/// the byte length of the readable prefix.
fn read_entries(path: &Path) -> Result<(Vec<WalEntry>, u64), WalError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), 0)),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut valid_len = 0u64;
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        if !line.ends_with('\n') {
            break;
        }
        match serde_json::from_str::<WalEntry>(line.trim_end()) {
            Ok(entry) => {
                entries.push(entry);
                valid_len += n as u64;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable WAL entry");
                break;
            }
        }
    }
    Ok((entries, valid_len))
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
