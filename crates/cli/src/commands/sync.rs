// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use super::{runtime, Workspace};
use crate::config::log_path;
use crate::error::{Error, Result};
use crate::logging;
use crate::session::describe_report;
use crate::sync::{DurableQueue, ReachabilityMonitor, RemoteDataService, SyncDrainer};

pub fn run() -> Result<()> {
    let ws = Workspace::open()?;
    logging::init(&log_path(&ws.work_dir));
    let remote_config = ws.require_remote()?;
    let queue = ws.open_queue()?;

    if queue.is_empty()? {
        println!("Nothing to sync");
        return Ok(());
    }

    let remote = ws.connect_remote(&remote_config, ReachabilityMonitor::new(false));
    runtime()?.block_on(async {
        let result = match remote.ensure_connected().await {
            Ok(()) => {
                push(queue, remote.clone(), &ws.state_dir, &mut std::io::stdout()).await
            }
            Err(e) => Err(e.into()),
        };
        remote.disconnect().await;
        result
    })
}

/// Runs one drain pass and prints its summary. A pass that stopped early
/// is reported as an error after the summary.
pub(crate) async fn push<R: RemoteDataService>(
    queue: Arc<DurableQueue>,
    remote: R,
    state_dir: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let report = SyncDrainer::new(queue, remote, state_dir).drain().await?;
    writeln!(out, "{}", describe_report(&report))?;
    match report.stopped {
        Some(e) => Err(Error::Remote(e)),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
