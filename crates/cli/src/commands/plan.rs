// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use super::{load_session, runtime, Workspace};
use crate::cli::OutputFormat;
use crate::config::log_path;
use crate::display::format_plan;
use crate::error::Result;
use crate::hydrate::{HydratedSession, SessionCache};
use crate::logging;
use crate::sync::ReachabilityMonitor;

pub fn run(session_id: &str, output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    logging::init(&log_path(&ws.work_dir));

    let cache = SessionCache::new(&ws.state_dir);
    let remote = ws
        .config
        .effective_remote()
        .map(|remote| ws.connect_remote(&remote, ReachabilityMonitor::new(false)));

    let hydrated = runtime()?.block_on(async {
        let result = load_session(remote.clone(), &cache, session_id).await;
        if let Some(remote) = &remote {
            remote.disconnect().await;
        }
        result
    })?;

    write_plan(&hydrated, output, &mut std::io::stdout())
}

pub(crate) fn write_plan(
    hydrated: &HydratedSession,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    match output {
        OutputFormat::Text => {
            for line in format_plan(&hydrated.session, &hydrated.plan) {
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(hydrated)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
