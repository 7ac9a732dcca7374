// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability monitor.
//!
//! Holds the current online/offline state of the Remote Data Service and
//! lets subscribers wait for the offline → online edge. The monitor is an
//! ordinary value handed to whoever needs it; there is no global instance.

use tokio::sync::watch;
use tracing::info;

/// Shared view of whether the remote is reachable.
#[derive(Debug, Clone)]
pub struct ReachabilityMonitor {
    tx: watch::Sender<bool>,
}

impl ReachabilityMonitor {
    /// Creates a monitor starting in the given state.
    pub fn new(reachable: bool) -> Self {
        let (tx, _) = watch::channel(reachable);
        ReachabilityMonitor { tx }
    }

    pub fn is_reachable(&self) -> bool {
        *self.tx.borrow()
    }

    /// Records the observed state. Subscribers only wake on a change.
    pub fn set_reachable(&self, reachable: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == reachable {
                false
            } else {
                *current = reachable;
                true
            }
        });
        if changed {
            info!(reachable, "remote reachability changed");
        }
    }

    /// Subscribes to reachability edges.
    pub fn subscribe(&self) -> ReachabilityEvents {
        let rx = self.tx.subscribe();
        let last = *rx.borrow();
        ReachabilityEvents { rx, last }
    }
}

impl Default for ReachabilityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Receiver half of a [`ReachabilityMonitor`].
#[derive(Debug)]
pub struct ReachabilityEvents {
    rx: watch::Receiver<bool>,
    last: bool,
}

impl ReachabilityEvents {
    /// Waits for the next unreachable → reachable transition.
    ///
    /// Returns false once the monitor is gone.
    pub async fn became_reachable(&mut self) -> bool {
        loop {
            if self.rx.changed().await.is_err() {
                return false;
            }
            let now = *self.rx.borrow_and_update();
            let edge = now && !self.last;
            self.last = now;
            if edge {
                return true;
            }
        }
    }

    /// Resolves as soon as the remote is unreachable, immediately if it
    /// already is. Returns false once the monitor is gone.
    pub async fn unreachable(&mut self) -> bool {
        let result = self.rx.wait_for(|reachable| !*reachable).await.is_ok();
        self.last = *self.rx.borrow_and_update();
        result
    }
}

#[cfg(test)]
#[path = "reachability_tests.rs"]
mod tests;
