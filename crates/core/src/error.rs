// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rp-core operations.

use thiserror::Error;

/// All possible errors that can occur in rp-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not ready: {0}")]
    NotReady(String),

    #[error("invalid status transition: cannot go from {from} to {to}\n  hint: from '{from}' you can go to: {valid_targets}")]
    InvalidTransition {
        from: String,
        to: String,
        valid_targets: String,
    },

    #[error("cannot {action} while the session is {status}")]
    NotOngoing {
        action: &'static str,
        status: String,
    },

    #[error("round {got} rejected: circuit {circuit} expects {expected}")]
    RoundOutOfOrder {
        circuit: u32,
        expected: String,
        got: u32,
    },

    #[error("no plan entry at position {0}\n  hint: positions are shown by 'status'")]
    NoSuchEntry(usize),

    #[error("no circuit numbered {0}")]
    NoSuchCircuit(u32),

    #[error("session feedback already recorded for {0}")]
    DuplicateSessionFeedback(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: planned, ongoing, done, skipped")]
    InvalidStatus(String),

    #[error("invalid mutation kind: '{0}'\n  hint: valid kinds are: set-log, feedback, session-status")]
    InvalidMutationKind(String),

    #[error("invalid proof media: {0}")]
    InvalidProof(String),

    #[error("plan for session {0} has no exercises")]
    EmptyPlan(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true for local validation failures that must never reach the queue.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Json(_) | Error::CorruptedData(_))
    }
}

/// A specialized Result type for rp-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
