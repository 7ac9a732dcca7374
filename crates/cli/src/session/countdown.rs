// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellable rest countdown.
//!
//! A [`RestCountdown`] sends one tick per period to the session loop for as
//! long as it lives. Dropping it, or calling [`RestCountdown::cancel`],
//! stops the ticks, so tearing down the session view can never leave a
//! timer firing into a dead session.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Handle to a running countdown task.
pub struct RestCountdown {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RestCountdown {
    /// Starts sending `()` on `ticks` every `period`, first after one period.
    pub fn start(ticks: mpsc::UnboundedSender<()>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if ticks.send(()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        RestCountdown { cancel, task }
    }

    /// Handle that stops this countdown when cancelled.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RestCountdown {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "countdown_tests.rs"]
mod tests;
