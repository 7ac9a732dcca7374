// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::PathBuf;

use crate::colors;
use crate::config::init_work_dir;
use crate::error::Result;

pub fn run(path: Option<String>, remote: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    run_impl(&target_path, remote.as_deref(), &mut std::io::stdout())
}

pub(crate) fn run_impl(
    target_path: &std::path::Path,
    remote: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let (work_dir, config) = init_work_dir(target_path, remote)?;

    writeln!(out, "Initialized rep at {}", work_dir.display())?;
    writeln!(out, "Client: {}", colors::literal(&config.client_id))?;
    match &config.remote {
        Some(remote) => writeln!(out, "Remote: {}", remote.url)?,
        None => writeln!(
            out,
            "{}",
            colors::context("No remote configured; actions will stay queued on this device")
        )?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
