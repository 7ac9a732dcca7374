// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use super::Workspace;
use crate::colors;
use crate::display::format_quarantined;
use crate::error::Result;

pub fn run(clear: bool) -> Result<()> {
    let ws = Workspace::open()?;
    run_impl(&ws, clear, &mut std::io::stdout())
}

pub(crate) fn run_impl(ws: &Workspace, clear: bool, out: &mut impl Write) -> Result<()> {
    let queue = ws.open_queue()?;

    if clear {
        let cleared = queue.clear_quarantine()?;
        writeln!(out, "Cleared {} refused change(s)", cleared)?;
        return Ok(());
    }

    let entries = queue.quarantined()?;
    if entries.is_empty() {
        writeln!(out, "{}", colors::context("No refused changes"))?;
        return Ok(());
    }
    for entry in &entries {
        for line in format_quarantined(entry) {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "quarantine_tests.rs"]
mod tests;
