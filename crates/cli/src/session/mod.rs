// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive session execution.
//!
//! [`drive`] is the single-threaded event loop behind `rep run`. It waits
//! on three sources at once: input lines, rest ticks while a circuit is
//! resting, and reports from the background drainer. Nothing in the loop
//! blocks on the network; recorded actions go to the queue and the drainer
//! is nudged when the remote is reachable.

mod command;
mod countdown;
mod runner;

pub use command::SessionCommand;
pub use countdown::RestCountdown;
pub use runner::{pending_note, Reply, SessionRunner};

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use rp_core::{Clock, IdSource};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::colors;
use crate::error::Result;
use crate::sync::{ConnectionStatus, DrainReport, ReachabilityMonitor};

const REST_TICK: Duration = Duration::from_secs(1);

/// Links between the loop and the background sync tasks.
pub struct SyncLink {
    pub monitor: ReachabilityMonitor,
    /// Requests a drain pass.
    pub trigger: Option<mpsc::UnboundedSender<()>>,
    /// Results of drain passes.
    pub reports: Option<mpsc::UnboundedReceiver<std::result::Result<DrainReport, String>>>,
    pub connection: Option<Arc<ConnectionStatus>>,
}

impl SyncLink {
    /// No remote: everything stays queued.
    pub fn offline() -> Self {
        SyncLink {
            monitor: ReachabilityMonitor::new(false),
            trigger: None,
            reports: None,
            connection: None,
        }
    }

    fn describe(&self) -> String {
        match &self.connection {
            Some(status) if status.is_connected() => colors::good(&status.describe()),
            Some(status) => colors::warn(&status.describe()),
            None => colors::warn("no remote configured"),
        }
    }

    fn request_drain(&self) -> bool {
        match &self.trigger {
            Some(trigger) => trigger.send(()).is_ok(),
            None => false,
        }
    }
}

/// Runs the session loop until `quit` or end of input.
pub async fn drive<C, I, R, W>(
    runner: &mut SessionRunner<C, I>,
    input: R,
    out: &mut W,
    mut link: SyncLink,
) -> Result<()>
where
    C: Clock,
    I: IdSource,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let mut countdown: Option<RestCountdown> = None;
    let mut reports = link.reports.take();

    loop {
        // A countdown runs exactly while some circuit is resting.
        match (runner.is_resting(), countdown.is_some()) {
            (true, false) => countdown = Some(RestCountdown::start(tick_tx.clone(), REST_TICK)),
            (false, true) => countdown = None,
            _ => {}
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("input closed");
                    break;
                };
                let command = match SessionCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        writeln!(out, "error: {}", e)?;
                        continue;
                    }
                };
                let is_status = command == SessionCommand::Status;
                let reply = match runner.handle(command) {
                    Ok(reply) => reply,
                    Err(e) => {
                        writeln!(out, "error: {}", e)?;
                        continue;
                    }
                };
                for line in &reply.lines {
                    writeln!(out, "{}", line)?;
                }
                if reply.quit {
                    break;
                }
                if reply.sync {
                    if link.request_drain() {
                        writeln!(out, "syncing ({})", link.describe())?;
                    } else {
                        writeln!(out, "cannot sync: {}", link.describe())?;
                    }
                }
                if reply.recorded && link.monitor.is_reachable() {
                    link.request_drain();
                }
                if is_status {
                    writeln!(out, "  remote: {}", link.describe())?;
                }
            }
            Some(()) = tick_rx.recv() => {
                for line in runner.tick() {
                    writeln!(out, "{}", line)?;
                }
            }
            Some(report) = recv_report(&mut reports) => {
                match report {
                    Ok(report) => {
                        if report.applied > 0 || report.quarantined > 0 || report.stopped.is_some() {
                            writeln!(out, "{}", describe_report(&report))?;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "sync pass failed");
                        writeln!(out, "sync failed: {}", e)?;
                    }
                }
            }
        }
        out.flush()?;
    }

    if let Some(countdown) = countdown.take() {
        countdown.cancel();
    }
    writeln!(out, "left session ({})", pending_note(runner.pending()?))?;
    Ok(())
}

async fn recv_report(
    reports: &mut Option<mpsc::UnboundedReceiver<std::result::Result<DrainReport, String>>>,
) -> Option<std::result::Result<DrainReport, String>> {
    match reports {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// One-line summary of a drain pass.
pub fn describe_report(report: &DrainReport) -> String {
    let mut parts = vec![format!("synced {}", report.applied)];
    if report.quarantined > 0 {
        parts.push(colors::warn(&format!(
            "{} refused (see 'rep quarantine')",
            report.quarantined
        )));
    }
    if let Some(stopped) = &report.stopped {
        parts.push(colors::warn(&format!("stopped: {}", stopped)));
    }
    parts.push(pending_note(report.remaining));
    parts.join(", ")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
