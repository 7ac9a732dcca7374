// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::NO_COLOR, "NO_COLOR");
    assert_eq!(vars::COLOR, "COLOR");
    assert_eq!(vars::REP_STATE_DIR, "REP_STATE_DIR");
    assert_eq!(vars::REP_REMOTE_URL, "REP_REMOTE_URL");
}

// Each test owns its variable; tests run in parallel within one process.

#[test]
fn test_state_dir_unset_and_set() {
    std::env::remove_var(vars::REP_STATE_DIR);
    assert_eq!(state_dir(), None);

    std::env::set_var(vars::REP_STATE_DIR, "/tmp/rep-state");
    assert_eq!(state_dir(), Some(PathBuf::from("/tmp/rep-state")));

    std::env::set_var(vars::REP_STATE_DIR, "");
    assert_eq!(state_dir(), None);
    std::env::remove_var(vars::REP_STATE_DIR);
}

#[test]
fn test_remote_url_override() {
    std::env::set_var(vars::REP_REMOTE_URL, "ws://127.0.0.1:9");
    assert_eq!(remote_url().as_deref(), Some("ws://127.0.0.1:9"));
    std::env::remove_var(vars::REP_REMOTE_URL);
    assert_eq!(remote_url(), None);
}
