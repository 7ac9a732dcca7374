// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use rp_core::{SessionMachine, SystemClock, UuidSource};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{load_session, runtime, Workspace};
use crate::config::log_path;
use crate::error::{Error, Result};
use crate::hydrate::{HydratedSession, SessionCache};
use crate::logging;
use crate::session::{drive, SessionRunner, SyncLink};
use crate::sync::{
    ConnectionManager, DurableQueue, ReachabilityMonitor, RemoteDataService, SyncDrainer,
    WsRemote,
};

type LiveRunner = SessionRunner<SystemClock, UuidSource>;

/// Time allowed for background tasks, including the stdin reader, to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

pub fn run(session_id: &str) -> Result<()> {
    let ws = Workspace::open()?;
    logging::init(&log_path(&ws.work_dir));

    let rt = runtime()?;
    let result = rt.block_on(execute(&ws, session_id));
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn execute(ws: &Workspace, session_id: &str) -> Result<()> {
    let queue = ws.open_queue()?;
    let cache = SessionCache::new(&ws.state_dir);

    let Some(remote_config) = ws.config.effective_remote() else {
        info!(session = %session_id, "no remote configured, running from cache");
        let hydrated = load_session(None::<WsRemote>, &cache, session_id).await?;
        let mut runner = build_runner(ws, hydrated, queue, cache)?;
        return interact(&mut runner, SyncLink::offline()).await;
    };

    let monitor = ReachabilityMonitor::new(false);
    let remote = ws.connect_remote(&remote_config, monitor.clone());
    let drainer = SyncDrainer::new(Arc::clone(&queue), remote.clone(), &ws.state_dir);

    // Push anything left from earlier sessions before reading fresh state.
    let hydrated = match remote.ensure_connected().await {
        Ok(()) => {
            drain_once(&drainer).await;
            load_session(Some(remote.clone()), &cache, session_id).await?
        }
        Err(e) => {
            warn!(error = %e, "remote unreachable, using cached session");
            cache
                .load(session_id)?
                .ok_or_else(|| Error::NotCached(session_id.to_string()))?
        }
    };
    let mut runner = build_runner(ws, hydrated, Arc::clone(&queue), cache)?;

    let cancel = CancellationToken::new();
    let manager = ConnectionManager::new(remote.clone(), remote_config.connection_config());
    let status = manager.status();
    let keeper = manager.spawn(cancel.clone());

    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let pusher = tokio::spawn(drainer.run(
        monitor.subscribe(),
        trigger_rx,
        Some(report_tx),
        cancel.clone(),
    ));

    let link = SyncLink {
        monitor,
        trigger: Some(trigger_tx),
        reports: Some(report_rx),
        connection: Some(status),
    };
    let result = interact(&mut runner, link).await;

    cancel.cancel();
    let _ = keeper.await;
    let _ = pusher.await;
    remote.disconnect().await;
    result
}

async fn drain_once<R: RemoteDataService>(drainer: &SyncDrainer<R>) {
    match drainer.drain().await {
        Ok(report) if report.applied > 0 => {
            info!(applied = report.applied, remaining = report.remaining, "pushed earlier changes")
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "could not push earlier changes"),
    }
}

/// A runner for `hydrated`, resuming any progress made on this device.
fn build_runner(
    ws: &Workspace,
    hydrated: HydratedSession,
    queue: Arc<DurableQueue>,
    cache: SessionCache,
) -> Result<LiveRunner> {
    let mut machine = SessionMachine::new(hydrated.session, hydrated.plan)
        .with_proof_limit(ws.config.session.proof_max_bytes);
    if !hydrated.execution.is_empty() {
        machine.resume(hydrated.execution)?;
        info!(session = %machine.session().id, "resumed local progress");
    }
    Ok(SessionRunner::new(machine, queue).with_cache(cache))
}

async fn interact(runner: &mut LiveRunner, link: SyncLink) -> Result<()> {
    let mut stdout = std::io::stdout();
    for line in runner.status_lines()? {
        println!("{}", line);
    }
    println!("{}", crate::colors::context("type 'help' for commands"));
    drive(runner, BufReader::new(tokio::io::stdin()), &mut stdout, link).await
}
