// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Sessions run without any remote: everything stays queued.

mod common;
use common::*;

#[test]
fn empty_queue_is_all_synced() {
    let temp = init_temp();

    rep()
        .arg("queue")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout("all synced\n");
}

#[test]
fn run_without_remote_or_cache_fails() {
    let temp = init_temp();

    rep()
        .args(["run", "s-1"])
        .current_dir(temp.path())
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"));
}

#[test]
fn run_from_cache_queues_actions() {
    let temp = init_temp();
    cache_session(&temp, "s-1");

    rep()
        .args(["run", "s-1"])
        .current_dir(temp.path())
        .write_stdin("start\nlog 0 8 60 7\nlog 0 8 62.5 8\ndone 0\ndone 1\ncomplete felt good\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("session s-1: planned"))
        .stdout(predicate::str::contains("session started (1 pending sync)"))
        .stdout(predicate::str::contains("session complete (4 pending sync)"))
        .stdout(predicate::str::ends_with("left session (4 pending sync)\n"));

    let output = rep()
        .args(["queue"])
        .current_dir(temp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let lines: Vec<String> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(String::from)
        .collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("session-status"));
    assert!(lines[1].contains("set 1 of squat: 8 reps @ 60 (rpe 7)"));
    assert!(lines[2].contains("set 2 of squat: 8 reps @ 62.5 (rpe 8)"));
    assert!(lines[3].contains("session-status"));
    assert_eq!(lines[4], "4 pending sync");
}

#[test]
fn incomplete_session_cannot_finish() {
    let temp = init_temp();
    cache_session(&temp, "s-1");

    rep()
        .args(["run", "s-1"])
        .current_dir(temp.path())
        .write_stdin("start\ndone 0\ncomplete\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("error: not ready"))
        .stdout(predicate::str::contains("left session (1 pending sync)"));
}

#[test]
fn resumed_session_is_read_from_cache() {
    let temp = init_temp();
    cache_session(&temp, "s-1");

    rep()
        .args(["run", "s-1"])
        .current_dir(temp.path())
        .write_stdin("start\n")
        .assert()
        .success();

    rep()
        .args(["plan", "s-1"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("session s-1: ongoing"));
}

#[test]
fn plan_json_from_cache() {
    let temp = init_temp();
    cache_session(&temp, "s-1");

    let output = rep()
        .args(["plan", "s-1", "-o", "json"])
        .current_dir(temp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["session"]["id"], "s-1");
    assert_eq!(json["plan"]["entries"].as_array().unwrap().len(), 2);
}

#[test]
fn sync_without_remote_fails_with_hint() {
    let temp = init_temp();

    rep()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn quarantine_starts_empty() {
    let temp = init_temp();

    rep()
        .arg("quarantine")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout("No refused changes\n");

    rep()
        .args(["quarantine", "--clear"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout("Cleared 0 refused change(s)\n");
}

#[test]
fn unreachable_remote_without_cache_fails() {
    let temp = init_temp();

    rep()
        .args(["run", "s-9"])
        .env("REP_REMOTE_URL", "ws://127.0.0.1:9")
        .current_dir(temp.path())
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not cached on this device"));
}
