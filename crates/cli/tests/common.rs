// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

use reprs::hydrate::{HydratedSession, SessionCache};
use rp_core::{normalize, PlanEntry, PlanRef, Session, UpstreamPlan, Workout, WorkoutKind};

/// `rep` with a clean environment: no colors, no overrides.
pub fn rep() -> Command {
    let mut cmd = cargo_bin_cmd!("rep");
    cmd.env("NO_COLOR", "1")
        .env_remove("COLOR")
        .env_remove("REP_REMOTE_URL")
        .env_remove("REP_STATE_DIR");
    cmd
}

/// Helper to create an initialized temp directory without a remote.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    rep().arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Writes a cached two-exercise session so `rep run` works offline.
pub fn cache_session(temp: &TempDir, session_id: &str) {
    let mut squat = PlanEntry::new(1, "squat");
    squat.reps = Some(8);
    squat.load = Some(60.0);
    let workout = Workout {
        id: "w-1".into(),
        name: "lower".into(),
        kind: WorkoutKind::Classic,
        entries: vec![squat, PlanEntry::new(2, "lunge")],
        rounds: None,
        rest_secs: None,
        circuits: Vec::new(),
    };
    let session = Session::planned(session_id, "c-1", PlanRef::workout("w-1"));
    let plan = normalize(session_id, UpstreamPlan::Single(workout)).unwrap();
    SessionCache::new(&temp.path().join(".rep"))
        .store(&HydratedSession::new(session, plan))
        .unwrap();
}
