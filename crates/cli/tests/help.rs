// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

#[test]
fn top_level_help_groups_commands() {
    rep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessions:"))
        .stdout(predicate::str::contains("Sync:"))
        .stdout(predicate::str::contains("rep run <session>"));
}

#[test]
fn run_help_lists_session_commands() {
    rep()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skip-rest <circuit>"))
        .stdout(predicate::str::contains("Feedback targets:"));
}

#[test]
fn version_flag() {
    rep()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
