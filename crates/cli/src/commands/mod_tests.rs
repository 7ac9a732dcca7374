// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

//! Shared fixtures for command tests.
//!
//! Workspaces are built with explicit paths so tests never depend on the
//! current directory or on `REP_*` overrides.

use super::*;
use crate::config::init_work_dir;
use crate::hydrate::{HydratedSession, SessionCache};
use crate::sync::test_helpers::{classic_workout, MockRemote};
use rp_core::{normalize, PlanRef, Session, UpstreamPlan};
use tempfile::TempDir;

pub(crate) fn workspace(temp: &TempDir) -> Workspace {
    let (work_dir, config) = init_work_dir(temp.path(), None).unwrap();
    Workspace {
        state_dir: work_dir.clone(),
        work_dir,
        config,
    }
}

/// Caches a one-exercise session so it can be opened without a remote.
pub(crate) fn cache_session(ws: &Workspace, session_id: &str) -> HydratedSession {
    let workout = classic_workout("w-1", &["squat"]);
    let session = Session::planned(session_id, &ws.config.client_id, PlanRef::workout("w-1"));
    let plan = normalize(session_id, UpstreamPlan::Single(workout)).unwrap();
    let hydrated = HydratedSession::new(session, plan);
    SessionCache::new(&ws.state_dir).store(&hydrated).unwrap();
    hydrated
}

#[test]
fn test_open_queue_creates_state_dir() {
    let temp = TempDir::new().unwrap();
    let mut ws = workspace(&temp);
    ws.state_dir = temp.path().join("state/nested");

    let queue = ws.open_queue().unwrap();
    assert!(queue.is_empty().unwrap());
    assert!(ws.state_dir.is_dir());
}

#[test]
fn test_workspace_at_loads_config() {
    let temp = TempDir::new().unwrap();
    let expected = workspace(&temp);
    let ws = Workspace::at(&expected.work_dir).unwrap();
    assert_eq!(ws.config, expected.config);
}

#[test]
fn test_workspace_at_requires_init() {
    let temp = TempDir::new().unwrap();
    assert!(Workspace::at(temp.path()).is_err());
}

#[test]
fn test_runtime_builds() {
    let rt = runtime().unwrap();
    assert_eq!(rt.block_on(async { 1 + 1 }), 2);
}

#[tokio::test]
async fn test_load_session_without_remote_uses_cache() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let cached = cache_session(&ws, "s-7");

    let cache = SessionCache::new(&ws.state_dir);
    let loaded = load_session(None::<MockRemote>, &cache, "s-7").await.unwrap();
    assert_eq!(loaded, cached);

    let err = load_session(None::<MockRemote>, &cache, "s-8").await.unwrap_err();
    assert!(matches!(err, Error::NoRemote));
}

#[tokio::test]
async fn test_load_session_prefers_remote_and_refreshes_cache() {
    let temp = TempDir::new().unwrap();
    let ws = workspace(&temp);
    let remote = MockRemote::new();
    remote.add_session(Session::planned("s-1", "c-1", PlanRef::workout("w-2")));
    remote.add_workout(classic_workout("w-2", &["bench", "row"]));

    let cache = SessionCache::new(&ws.state_dir);
    let loaded = load_session(Some(remote), &cache, "s-1").await.unwrap();
    assert_eq!(loaded.plan.len(), 2);
    assert_eq!(cache.load("s-1").unwrap(), Some(loaded));
}
