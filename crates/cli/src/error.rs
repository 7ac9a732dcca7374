// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{DrainError, QueueError, RemoteError};

/// All possible errors that can occur in the reprs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'rep init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("{0}")]
    Core(#[from] rp_core::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("sync failed: {0}")]
    Drain(#[from] DrainError),

    #[error("no remote configured\n  hint: run 'rep init --remote ws://host:port' or set REP_REMOTE_URL")]
    NoRemote,

    #[error("session {0} has neither a program nor a workout")]
    NoPlan(String),

    #[error("session {0} is not cached on this device\n  hint: open it once while online")]
    NotCached(String),

    #[error("unknown command '{0}'\n  hint: type 'help' for the list of commands")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for reprs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
