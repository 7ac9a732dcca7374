// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::hydrate::SessionCache;
use crate::sync::test_helpers::{circuit_workout, classic_workout, MockRemote};
use crate::sync::{DurableQueue, SyncDrainer};
use rp_core::clock::{SequentialIds, SteppingClock};
use rp_core::{normalize, PlanRef, Session, SessionMachine, UpstreamPlan, Workout};
use tempfile::TempDir;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

fn runner_for(
    dir: &TempDir,
    workout: Workout,
) -> (SessionRunner<SteppingClock, SequentialIds>, Arc<DurableQueue>) {
    let session = Session::planned("s-1", "c-1", PlanRef::workout(workout.id.clone()));
    let plan = normalize("s-1", UpstreamPlan::Single(workout)).unwrap();
    let machine = SessionMachine::with_sources(
        session,
        plan,
        SteppingClock::starting_at(0),
        SequentialIds::new("m"),
    );
    let queue = Arc::new(DurableQueue::open(dir.path()).unwrap());
    let runner = SessionRunner::new(machine, Arc::clone(&queue)).with_cache(SessionCache::new(dir.path()));
    (runner, queue)
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn scripted_offline_session() {
    std::env::set_var("NO_COLOR", "1");
    let dir = TempDir::new().unwrap();
    let (mut runner, queue) = runner_for(&dir, classic_workout("w-1", &["squat"]));

    let input: &[u8] = b"start\nlog 0 8 60 7\n\nbogus\ncomplete\ndone 0\ncomplete\n";
    let mut out = Vec::new();
    drive(&mut runner, input, &mut out, SyncLink::offline())
        .await
        .unwrap();

    let out = text(out);
    assert!(out.contains("session started (1 pending sync)"), "{}", out);
    assert!(out.contains("error: unknown command 'bogus'"));
    assert!(out.contains("error: not ready"));
    assert!(out.contains("session complete (3 pending sync)"));
    assert!(out.ends_with("left session (3 pending sync)\n"));
    assert_eq!(queue.len().unwrap(), 3);
}

#[tokio::test]
async fn sync_without_remote_is_reported() {
    std::env::set_var("NO_COLOR", "1");
    let dir = TempDir::new().unwrap();
    let (mut runner, _) = runner_for(&dir, classic_workout("w-1", &["squat"]));

    let input: &[u8] = b"sync\nstatus\nquit\nstart\n";
    let mut out = Vec::new();
    drive(&mut runner, input, &mut out, SyncLink::offline())
        .await
        .unwrap();

    let out = text(out);
    assert!(out.contains("cannot sync: no remote configured"));
    assert!(out.contains("  remote: no remote configured"));
    assert!(!out.contains("session started"), "quit must stop reading");
}

#[tokio::test(start_paused = true)]
async fn rest_ticks_reach_the_session() {
    std::env::set_var("NO_COLOR", "1");
    let dir = TempDir::new().unwrap();
    let (mut runner, _) = runner_for(&dir, circuit_workout("w-c", &["burpee"], 2, 3));

    let (mut writer, reader) = tokio::io::duplex(256);
    let mut out = Vec::new();
    let feed = async move {
        writer.write_all(b"start\nround 1 1\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        writer.write_all(b"round 1 2\n").await.unwrap();
    };
    let (result, ()) = tokio::join!(
        drive(&mut runner, BufReader::new(reader), &mut out, SyncLink::offline()),
        feed
    );
    result.unwrap();

    let out = text(out);
    assert!(out.contains("rest 3s before round 2"), "{}", out);
    assert!(out.contains("circuit 1: 2s"));
    assert!(out.contains("circuit 1: rest over, round 2 starts"));
    assert!(out.contains("circuit 1: all rounds complete"));
}

#[tokio::test]
async fn recorded_actions_are_pushed_when_reachable() {
    std::env::set_var("NO_COLOR", "1");
    let dir = TempDir::new().unwrap();
    let (mut runner, queue) = runner_for(&dir, classic_workout("w-1", &["squat"]));

    let remote = Arc::new(MockRemote::new());
    let monitor = ReachabilityMonitor::new(true);
    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());
    let task = tokio::spawn(drainer.run(
        monitor.subscribe(),
        trigger_rx,
        Some(report_tx),
        cancel.clone(),
    ));

    let link = SyncLink {
        monitor,
        trigger: Some(trigger_tx),
        reports: Some(report_rx),
        connection: None,
    };
    let (mut writer, reader) = tokio::io::duplex(256);
    let mut out = Vec::new();
    let feed = async move {
        writer.write_all(b"start\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
    };
    let (result, ()) = tokio::join!(
        drive(&mut runner, BufReader::new(reader), &mut out, link),
        feed
    );
    result.unwrap();
    cancel.cancel();
    task.await.unwrap();

    let out = text(out);
    assert!(out.contains("synced 1, all synced"), "{}", out);
    assert!(out.ends_with("left session (all synced)\n"));
    assert_eq!(remote.applied(), vec!["m-1"]);
}

#[test]
fn report_summary_mentions_refusals() {
    std::env::set_var("NO_COLOR", "1");
    let report = DrainReport {
        applied: 2,
        duplicates: 0,
        quarantined: 1,
        remaining: 0,
        stopped: None,
    };
    assert_eq!(
        describe_report(&report),
        "synced 2, 1 refused (see 'rep quarantine'), all synced"
    );
}
