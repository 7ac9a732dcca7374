// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables read by the CLI are named here and
//! read through typed accessors.

use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    pub const NO_COLOR: &str = "NO_COLOR";
    pub const COLOR: &str = "COLOR";
    pub const REP_STATE_DIR: &str = "REP_STATE_DIR";
    pub const REP_REMOTE_URL: &str = "REP_REMOTE_URL";
}

/// Returns `true` if `NO_COLOR=1`.
pub fn no_color() -> bool {
    std::env::var(vars::NO_COLOR).is_ok_and(|v| v == "1")
}

/// Returns `true` if `COLOR=1`.
pub fn force_color() -> bool {
    std::env::var(vars::COLOR).is_ok_and(|v| v == "1")
}

/// Directory holding the queue, quarantine and session cache, if overridden.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(vars::REP_STATE_DIR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Remote URL overriding the configured one.
pub fn remote_url() -> Option<String> {
    std::env::var(vars::REP_REMOTE_URL)
        .ok()
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
