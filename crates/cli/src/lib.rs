// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! reprs - offline-tolerant workout session execution.
//!
//! This crate provides the functionality behind the `rep` CLI: running a
//! session from its flattened plan, recording sets, feedback and status
//! changes while offline, and pushing them to the Remote Data Service in
//! order once it is reachable.
//!
//! # Main Components
//!
//! - [`session`] - the interactive loop and its command grammar
//! - [`sync`] - durable queue, reachability, remote client and drainer
//! - [`hydrate`] - session + plan loading with an on-device cache
//! - [`Config`] - project configuration in `.rep/config.toml`
//! - [`Error`] - error types for all operations
//!
//! The pure session semantics (plan normalization, circuit timing, the
//! completion guard) live in `rp-core`.

mod cli;
pub mod colors;
mod commands;
mod display;
mod env;
pub mod help;
mod logging;

pub mod config;
pub mod error;
pub mod hydrate;
pub mod session;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{find_work_dir, init_work_dir, Config};
pub use error::{Error, Result};

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { path, remote } => commands::init::run(path, remote),
        Command::Run { session } => commands::run::run(&session),
        Command::Plan { session, output } => commands::plan::run(&session, output),
        Command::Queue { output } => commands::queue::run(output),
        Command::Sync => commands::sync::run(),
        Command::Quarantine { clear } => commands::quarantine::run(clear),
    }
}
