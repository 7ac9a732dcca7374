// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync drainer.
//!
//! Replays the durable queue against the Remote Data Service, strictly in
//! order and one mutation at a time. The head of the queue is removed only
//! after the remote confirms it. A transient failure stops the drain with
//! the failed mutation still at the head; a permanent refusal moves that
//! mutation to quarantine and the drain goes on.
//!
//! Only one drain runs at a time: an in-process flag guards against
//! overlapping triggers and a file lock against other `rep` processes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fs2::FileExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::queue::{DurableQueue, QueueError};
use super::reachability::ReachabilityEvents;
use super::remote::{ApplyOutcome, RemoteDataService, RemoteError};

const DRAIN_LOCK_FILE_NAME: &str = "drain.lock";

/// Error type for drain operations.
#[derive(Debug, thiserror::Error)]
pub enum DrainError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Another drain holds the queue. Nothing was done.
    #[error("a sync is already in progress")]
    InProgress,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What one drain pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Mutations confirmed and removed, duplicates included.
    pub applied: usize,
    /// Of `applied`, how many the remote already had.
    pub duplicates: usize,
    /// Mutations moved to quarantine.
    pub quarantined: usize,
    /// Queue length when the pass ended.
    pub remaining: usize,
    /// The transient error that ended the pass early, if any.
    pub stopped: Option<RemoteError>,
}

impl DrainReport {
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none() && self.remaining == 0
    }
}

/// Clears the in-process drain flag when a pass ends or is cancelled.
struct DrainingGuard<'a>(&'a AtomicBool);

impl Drop for DrainingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Consumes the durable queue when the remote is reachable.
pub struct SyncDrainer<R: RemoteDataService> {
    queue: Arc<DurableQueue>,
    remote: R,
    draining: AtomicBool,
    lock_path: PathBuf,
}

impl<R: RemoteDataService> SyncDrainer<R> {
    /// Creates a drainer. `state_dir` holds the cross-process drain lock.
    pub fn new(queue: Arc<DurableQueue>, remote: R, state_dir: &Path) -> Self {
        SyncDrainer {
            queue,
            remote,
            draining: AtomicBool::new(false),
            lock_path: state_dir.join(DRAIN_LOCK_FILE_NAME),
        }
    }

    pub fn queue(&self) -> &Arc<DurableQueue> {
        &self.queue
    }

    /// Replays the queue from the head until it is empty or a transient
    /// error occurs.
    pub async fn drain(&self) -> Result<DrainReport, DrainError> {
        if self.draining.swap(true, Ordering::AcqRel) {
            return Err(DrainError::InProgress);
        }
        let _guard = DrainingGuard(&self.draining);
        let _lock = self.try_lock()?;

        let mut report = DrainReport::default();
        while let Some(mutation) = self.queue.front()? {
            match self.remote.apply(&mutation).await {
                Ok(outcome) => {
                    self.queue.remove(&mutation.id)?;
                    report.applied += 1;
                    if outcome == ApplyOutcome::Duplicate {
                        report.duplicates += 1;
                    }
                    debug!(id = %mutation.id, ?outcome, "mutation synced");
                }
                Err(e) if e.is_fatal() => {
                    error!(
                        id = %mutation.id,
                        kind = %mutation.kind(),
                        error = %e,
                        "remote refused mutation, moving it to quarantine"
                    );
                    self.queue.quarantine(&mutation, &e.to_string())?;
                    report.quarantined += 1;
                }
                Err(e) => {
                    warn!(id = %mutation.id, error = %e, "sync interrupted, will retry");
                    report.stopped = Some(e);
                    break;
                }
            }
        }

        report.remaining = self.queue.len()?;
        if report.applied > 0 || report.quarantined > 0 {
            info!(
                applied = report.applied,
                quarantined = report.quarantined,
                remaining = report.remaining,
                "sync pass finished"
            );
        }
        Ok(report)
    }

    /// Drains on every offline → online edge and on every trigger until
    /// cancelled. Each pass's report is sent to `reports` if given.
    pub async fn run(
        self,
        mut events: ReachabilityEvents,
        mut trigger: mpsc::UnboundedReceiver<()>,
        reports: Option<mpsc::UnboundedSender<Result<DrainReport, String>>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                alive = events.became_reachable() => {
                    if !alive {
                        break;
                    }
                    debug!("remote became reachable, draining");
                }
                request = trigger.recv() => {
                    if request.is_none() {
                        break;
                    }
                }
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.drain() => result,
            };
            let result = match result {
                Err(DrainError::InProgress) => continue,
                Err(e) => {
                    error!(error = %e, "sync pass failed");
                    Err(e.to_string())
                }
                Ok(report) => Ok(report),
            };
            if let Some(reports) = &reports {
                let _ = reports.send(result);
            }
        }
    }

    fn try_lock(&self) -> Result<File, DrainError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        file.try_lock_exclusive()
            .map_err(|_| DrainError::InProgress)?;
        Ok(file)
    }
}

#[cfg(test)]
#[path = "drainer_tests.rs"]
mod tests;
