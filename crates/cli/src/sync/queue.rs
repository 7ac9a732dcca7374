// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable local queue of pending mutations.
//!
//! Uses JSONL format for durability - each mutation is written as a single
//! line and fsynced before `enqueue` returns. File order is queue order.
//! Removal rewrites the file through a temp file and an atomic rename, so a
//! crash leaves either the old or the new queue, never a mix.
//!
//! Every read or write takes an exclusive lock on a sidecar `queue.lock`, so
//! a session runner and a `rep sync` in another process can share the queue.
//!
//! Mutations the remote refused permanently are moved to a separate
//! quarantine file, where they stay until the user clears them.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use rp_core::PendingMutation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const QUEUE_FILE_NAME: &str = "queue.jsonl";
const QUARANTINE_FILE_NAME: &str = "quarantine.jsonl";
const LOCK_FILE_NAME: &str = "queue.lock";

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The device holding the queue is full. Nothing already queued is lost.
    #[error("local storage is full, the change was not saved\n  hint: free some disk space and try again; earlier changes are still queued")]
    StorageExhausted,

    /// A complete line in the queue file could not be parsed.
    #[error("corrupted queue record at {path}:{line}: {reason}")]
    Corrupted {
        path: String,
        line: usize,
        reason: String,
    },
}

impl QueueError {
    fn from_write(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::StorageFull {
            QueueError::StorageExhausted
        } else {
            QueueError::Io(e)
        }
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// A mutation the remote refused permanently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantinedMutation {
    pub mutation: PendingMutation,
    pub reason: String,
    pub quarantined_at: DateTime<Utc>,
}

/// Append-only persisted list of pending mutations.
#[derive(Debug)]
pub struct DurableQueue {
    path: PathBuf,
    quarantine_path: PathBuf,
    lock_path: PathBuf,
}

impl DurableQueue {
    /// Opens or creates the queue in `dir`.
    ///
    /// A trailing line left half-written by a crash is cut off here, with a
    /// warning. Complete lines are never dropped.
    pub fn open(dir: &Path) -> QueueResult<Self> {
        fs::create_dir_all(dir)?;
        let queue = DurableQueue {
            path: dir.join(QUEUE_FILE_NAME),
            quarantine_path: dir.join(QUARANTINE_FILE_NAME),
            lock_path: dir.join(LOCK_FILE_NAME),
        };

        let _lock = queue.lock()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&queue.path)?;
        repair_torn_tail(&queue.path)?;
        Ok(queue)
    }

    /// Path to the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists a mutation at the tail.
    ///
    /// Returns the queue length after the append. On failure the file is
    /// left exactly as it was.
    pub fn enqueue(&self, mutation: &PendingMutation) -> QueueResult<usize> {
        let mut line = serde_json::to_string(mutation)?;
        line.push('\n');

        let _lock = self.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let before = file.metadata()?.len();

        let written = file
            .write_all(line.as_bytes())
            .and_then(|()| file.sync_all());
        if let Err(e) = written {
            // Best effort: drop the partial line so the next open has nothing to repair
            let _ = file.set_len(before);
            return Err(QueueError::from_write(e));
        }

        debug!(id = %mutation.id, kind = %mutation.kind(), "mutation queued");
        Ok(read_records(&self.path)?.len())
    }

    /// Reads all queued mutations in order without removing them.
    pub fn peek_all(&self) -> QueueResult<Vec<PendingMutation>> {
        let _lock = self.lock()?;
        read_records(&self.path)
    }

    /// The oldest queued mutation, if any.
    pub fn front(&self) -> QueueResult<Option<PendingMutation>> {
        Ok(self.peek_all()?.into_iter().next())
    }

    /// Removes the mutation with the given id.
    ///
    /// Returns false if no such mutation is queued.
    pub fn remove(&self, id: &str) -> QueueResult<bool> {
        let _lock = self.lock()?;
        let mut records = read_records(&self.path)?;
        let before = records.len();
        records.retain(|m| m.id != id);
        if records.len() == before {
            return Ok(false);
        }
        rewrite(&self.path, &records)?;
        Ok(true)
    }

    /// Number of queued mutations.
    pub fn len(&self) -> QueueResult<usize> {
        Ok(self.peek_all()?.len())
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Moves a mutation from the queue to quarantine.
    pub fn quarantine(&self, mutation: &PendingMutation, reason: &str) -> QueueResult<()> {
        let record = QuarantinedMutation {
            mutation: mutation.clone(),
            reason: reason.to_string(),
            quarantined_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _lock = self.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.quarantine_path)?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(QueueError::from_write)?;

        let mut records = read_records(&self.path)?;
        records.retain(|m| m.id != mutation.id);
        rewrite(&self.path, &records)?;
        Ok(())
    }

    /// All quarantined mutations, oldest first.
    pub fn quarantined(&self) -> QueueResult<Vec<QuarantinedMutation>> {
        let _lock = self.lock()?;
        let file = match File::open(&self.quarantine_path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Deletes every quarantined mutation. Returns how many were dropped.
    pub fn clear_quarantine(&self) -> QueueResult<usize> {
        let count = self.quarantined()?.len();
        let _lock = self.lock()?;
        match fs::remove_file(&self.quarantine_path) {
            Ok(()) => Ok(count),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn lock(&self) -> QueueResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;
        Ok(file)
    }
}

fn read_records(path: &Path) -> QueueResult<Vec<PendingMutation>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mutation: PendingMutation =
            serde_json::from_str(&line).map_err(|e| QueueError::Corrupted {
                path: path.display().to_string(),
                line: index + 1,
                reason: e.to_string(),
            })?;
        records.push(mutation);
    }
    Ok(records)
}

fn rewrite(path: &Path, records: &[PendingMutation]) -> QueueResult<()> {
    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut file = File::create(&tmp)?;
        for mutation in records {
            let json = serde_json::to_string(mutation)?;
            writeln!(file, "{}", json).map_err(QueueError::from_write)?;
        }
        file.sync_all().map_err(QueueError::from_write)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Cuts a trailing partial line (no newline) left by an interrupted write.
fn repair_torn_tail(path: &Path) -> QueueResult<()> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    let mut content = Vec::with_capacity(len as usize);
    file.read_to_end(&mut content)?;
    if content.last() == Some(&b'\n') {
        return Ok(());
    }

    let keep = content
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    warn!(
        path = %path.display(),
        dropped_bytes = content.len() - keep,
        "discarding partially written queue record"
    );
    file.set_len(keep as u64)?;
    file.seek(SeekFrom::End(0))?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
