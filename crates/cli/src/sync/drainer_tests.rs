// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::test_helpers::{ids, make_set_log, make_status, MockRemote};
use crate::sync::ReachabilityMonitor;
use rp_core::SessionStatus;
use std::time::Duration;
use tempfile::TempDir;

fn setup() -> (TempDir, Arc<DurableQueue>) {
    let dir = TempDir::new().unwrap();
    let queue = Arc::new(DurableQueue::open(dir.path()).unwrap());
    (dir, queue)
}

#[tokio::test]
async fn drains_in_fifo_order() {
    let (dir, queue) = setup();
    for (i, id) in ["m-1", "m-2", "m-3"].iter().enumerate() {
        queue.enqueue(&make_set_log(id, i as u32 + 1)).unwrap();
    }
    queue
        .enqueue(&make_status("m-4", SessionStatus::Completed))
        .unwrap();

    let remote = Arc::new(MockRemote::new());
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());
    let report = drainer.drain().await.unwrap();

    assert_eq!(report.applied, 4);
    assert!(report.is_complete());
    assert_eq!(remote.applied(), vec!["m-1", "m-2", "m-3", "m-4"]);
    assert!(queue.is_empty().unwrap());
}

#[tokio::test]
async fn transient_failure_keeps_the_rest_in_order() {
    let (dir, queue) = setup();
    for (i, id) in ["m-1", "m-2", "m-3"].iter().enumerate() {
        queue.enqueue(&make_set_log(id, i as u32 + 1)).unwrap();
    }

    let remote = Arc::new(MockRemote::new());
    remote.fail("m-2", RemoteError::Unreachable("connection reset".into()));
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());

    let report = drainer.drain().await.unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(report.remaining, 2);
    assert!(matches!(report.stopped, Some(RemoteError::Unreachable(_))));
    assert_eq!(ids(&queue.peek_all().unwrap()), vec!["m-2", "m-3"]);

    let report = drainer.drain().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(remote.applied(), vec!["m-1", "m-2", "m-3"]);
}

#[tokio::test]
async fn restart_resumes_without_duplicates() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemote::new());
    {
        let queue = Arc::new(DurableQueue::open(dir.path()).unwrap());
        queue.enqueue(&make_set_log("m-1", 1)).unwrap();
        queue.enqueue(&make_set_log("m-2", 2)).unwrap();
        remote.fail("m-2", RemoteError::Unreachable("offline".into()));
        let drainer = SyncDrainer::new(queue, Arc::clone(&remote), dir.path());
        drainer.drain().await.unwrap();
    }

    let queue = Arc::new(DurableQueue::open(dir.path()).unwrap());
    assert_eq!(ids(&queue.peek_all().unwrap()), vec!["m-2"]);
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());
    let report = drainer.drain().await.unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(report.duplicates, 0);
    assert_eq!(remote.applied(), vec!["m-1", "m-2"]);
}

#[tokio::test]
async fn already_applied_mutation_counts_as_duplicate() {
    let (dir, queue) = setup();
    let remote = Arc::new(MockRemote::new());
    remote.apply(&make_set_log("m-1", 1)).await.unwrap();

    queue.enqueue(&make_set_log("m-1", 1)).unwrap();
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());
    let report = drainer.drain().await.unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(report.duplicates, 1);
    assert!(queue.is_empty().unwrap());
}

#[tokio::test]
async fn refused_mutation_is_quarantined_and_drain_continues() {
    let (dir, queue) = setup();
    queue.enqueue(&make_set_log("m-1", 1)).unwrap();
    queue.enqueue(&make_set_log("m-2", 2)).unwrap();

    let remote = Arc::new(MockRemote::new());
    remote.fail("m-1", RemoteError::Rejected("bad set".into()));
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());
    let report = drainer.drain().await.unwrap();

    assert_eq!(report.quarantined, 1);
    assert_eq!(report.applied, 1);
    assert!(report.is_complete());
    assert_eq!(remote.applied(), vec!["m-2"]);

    let held = queue.quarantined().unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].mutation.id, "m-1");
    assert!(held[0].reason.contains("bad set"));
}

#[tokio::test]
async fn second_process_lock_makes_drain_a_no_op() {
    let (dir, queue) = setup();
    queue.enqueue(&make_set_log("m-1", 1)).unwrap();

    let holder = SyncDrainer::new(Arc::clone(&queue), MockRemote::new(), dir.path());
    let _held = holder.try_lock().unwrap();

    let drainer = SyncDrainer::new(Arc::clone(&queue), MockRemote::new(), dir.path());
    assert!(matches!(drainer.drain().await, Err(DrainError::InProgress)));
    assert_eq!(queue.len().unwrap(), 1);
}

#[tokio::test]
async fn run_drains_on_trigger_and_on_reconnect() {
    let (dir, queue) = setup();
    let remote = Arc::new(MockRemote::new());
    let monitor = ReachabilityMonitor::new(false);
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());

    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(drainer.run(
        monitor.subscribe(),
        trigger_rx,
        Some(report_tx),
        cancel.clone(),
    ));

    queue.enqueue(&make_set_log("m-1", 1)).unwrap();
    trigger_tx.send(()).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(2), report_rx.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(report.applied, 1);

    queue.enqueue(&make_set_log("m-2", 2)).unwrap();
    monitor.set_reachable(true);
    let report = tokio::time::timeout(Duration::from_secs(2), report_rx.recv())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(remote.applied(), vec!["m-1", "m-2"]);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn overlapping_drain_in_one_process_is_rejected() {
    let (dir, queue) = setup();
    queue.enqueue(&make_set_log("m-1", 1)).unwrap();
    queue.enqueue(&make_set_log("m-2", 2)).unwrap();
    let remote = Arc::new(MockRemote::new());
    let gate = remote.hold_applies();
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());

    let (first, second) = tokio::join!(drainer.drain(), async {
        gate.entered().await;
        let second = drainer.drain().await;
        gate.open();
        second
    });

    assert!(matches!(second, Err(DrainError::InProgress)));
    let report = first.unwrap();
    assert!(report.is_complete());
    assert_eq!(remote.applied(), vec!["m-1", "m-2"]);
}

#[tokio::test]
async fn cancelled_drain_releases_the_flag() {
    let (dir, queue) = setup();
    queue.enqueue(&make_set_log("m-1", 1)).unwrap();
    let remote = Arc::new(MockRemote::new());
    let gate = remote.hold_applies();
    let drainer = SyncDrainer::new(Arc::clone(&queue), Arc::clone(&remote), dir.path());

    let cut = tokio::time::timeout(Duration::from_millis(50), drainer.drain()).await;
    assert!(cut.is_err());
    assert_eq!(queue.len().unwrap(), 1);

    gate.open();
    let report = drainer.drain().await.unwrap();
    assert_eq!(report.applied, 1);
    assert!(queue.is_empty().unwrap());
}
