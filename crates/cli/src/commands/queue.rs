// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use super::Workspace;
use crate::cli::OutputFormat;
use crate::colors;
use crate::display::format_mutation_line;
use crate::error::Result;
use crate::session::pending_note;

pub fn run(output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    run_impl(&ws, output, &mut std::io::stdout())
}

pub(crate) fn run_impl(ws: &Workspace, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let pending = ws.open_queue()?.peek_all()?;

    match output {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&pending)?)?;
        }
        OutputFormat::Text => {
            for mutation in &pending {
                writeln!(out, "{}", format_mutation_line(mutation))?;
            }
            writeln!(out, "{}", colors::context(&pending_note(pending.len())))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
