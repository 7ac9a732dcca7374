// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background connection keeper.
//!
//! Whenever the remote is unreachable, a [`ConnectionManager`] task tries to
//! reconnect with exponential backoff. A successful connection flips the
//! [`ReachabilityMonitor`](super::ReachabilityMonitor), which is what wakes
//! the drainer.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::remote::WsRemote;
use super::transport::Transport;

const STATE_DISCONNECTED: u8 = 0;
const STATE_CONNECTING: u8 = 1;
const STATE_CONNECTED: u8 = 2;

/// Connection status readable without locks, for the status line.
#[derive(Debug, Default)]
pub struct ConnectionStatus {
    state: AtomicU8,
    attempt: AtomicU32,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, state: u8, attempt: u32) {
        self.state.store(state, Ordering::Release);
        self.attempt.store(attempt, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_CONNECTED
    }

    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self.state.load(Ordering::Acquire) {
            STATE_CONNECTING => match self.attempt.load(Ordering::Acquire) {
                0 => "connecting".to_string(),
                n => format!("connecting (attempt {})", n),
            },
            STATE_CONNECTED => "online".to_string(),
            _ => "offline".to_string(),
        }
    }
}

/// Backoff settings for reconnection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Attempts per round before pausing for `max_delay_secs` (0 = unlimited).
    pub max_retries: u32,
    /// Maximum delay between attempts (seconds).
    pub max_delay_secs: u64,
    /// Initial delay for exponential backoff (milliseconds).
    pub initial_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            max_delay_secs: 30,
            initial_delay_ms: 100,
        }
    }
}

impl ConnectionConfig {
    /// Delay before attempt `attempt + 1`, doubling from the initial delay.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let cap_ms = self.max_delay_secs.saturating_mul(1000);
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.initial_delay_ms.saturating_mul(factor).min(cap_ms))
    }
}

/// Keeps a [`WsRemote`] connected while it runs.
pub struct ConnectionManager<T: Transport + 'static> {
    remote: WsRemote<T>,
    config: ConnectionConfig,
    status: Arc<ConnectionStatus>,
}

impl<T: Transport + 'static> ConnectionManager<T> {
    pub fn new(remote: WsRemote<T>, config: ConnectionConfig) -> Self {
        Self {
            remote,
            config,
            status: Arc::new(ConnectionStatus::new()),
        }
    }

    pub fn status(&self) -> Arc<ConnectionStatus> {
        Arc::clone(&self.status)
    }

    /// Spawns the keeper. It stops when `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(self, cancel: CancellationToken) {
        let mut events = self.remote.monitor().subscribe();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                alive = events.unreachable() => {
                    if !alive {
                        break;
                    }
                }
            }
            self.status.set(STATE_DISCONNECTED, 0);

            if !self.connect_with_retry(&cancel).await {
                break;
            }
        }
        self.status.set(STATE_DISCONNECTED, 0);
    }

    /// Retries until connected. Returns false if cancelled.
    async fn connect_with_retry(&self, cancel: &CancellationToken) -> bool {
        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            self.status.set(STATE_CONNECTING, attempt);

            let result = tokio::select! {
                _ = cancel.cancelled() => return false,
                result = self.remote.ensure_connected() => result,
            };

            match result {
                Ok(()) => {
                    info!(attempt, "connected to remote");
                    self.status.set(STATE_CONNECTED, 0);
                    return true;
                }
                Err(e) => {
                    let delay = if self.config.max_retries > 0 && attempt >= self.config.max_retries
                    {
                        warn!(attempts = attempt, error = %e, "remote still unreachable, pausing");
                        attempt = 0;
                        Duration::from_secs(self.config.max_delay_secs)
                    } else {
                        debug!(attempt, error = %e, "connection attempt failed");
                        self.config.delay_after(attempt)
                    };
                    self.status.set(STATE_DISCONNECTED, attempt);

                    tokio::select! {
                        _ = cancel.cancelled() => return false,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
