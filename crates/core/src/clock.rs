// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock and id sources used when stamping sessions and mutations.
//!
//! Both are injected so state machines stay deterministic under test.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation using `chrono::Utc::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (*self).now()
    }
}

/// Source of unique mutation identifiers.
pub trait IdSource: Send + Sync {
    /// Returns a fresh identifier, never returned before by this source.
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Clock that advances one second per reading, for tests and replays.
#[derive(Debug)]
pub struct SteppingClock {
    start_secs: i64,
    ticks: AtomicU64,
}

impl SteppingClock {
    /// Creates a clock whose first reading is `start_secs` after the epoch.
    pub fn starting_at(start_secs: i64) -> Self {
        SteppingClock {
            start_secs,
            ticks: AtomicU64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) as i64;
        Utc.timestamp_opt(self.start_secs + tick, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Sequential ids with a fixed prefix (`m-1`, `m-2`, ...).
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
