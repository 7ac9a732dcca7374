// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "rep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "An offline-tolerant workout session runner")]
#[command(
    long_about = "An offline-tolerant workout session runner.\n\n\
    Log sets, feedback and completion while offline; changes sync to the remote in order once it is reachable."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
// Allow the unit type field pattern which is required for clap's ArgAction::Version/Help
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────
    /// Run a session interactively
    #[command(
        arg_required_else_help = true,
        after_help = help::session_commands()
    )]
    Run {
        /// Session ID
        #[arg(value_parser = non_empty_string)]
        session: String,
    },

    /// Show a session's flattened plan
    #[command(
        arg_required_else_help = true,
        after_help = colors::examples("\
Examples:
  rep plan s-1                 Show the plan for session s-1
  rep plan s-1 -o json         Output session and plan as JSON")
    )]
    Plan {
        /// Session ID
        #[arg(value_parser = non_empty_string)]
        session: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────
    /// List changes waiting to sync
    Queue {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Push queued changes to the remote now
    Sync,

    /// List or clear changes the remote refused
    Quarantine {
        /// Delete every refused change
        #[arg(long)]
        clear: bool,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Setup
    // ─────────────────────────────────────────────────────────────────────────
    /// Initialize rep in this directory
    #[command(after_help = colors::examples("\
Examples:
  rep init                                Queue-only, no remote
  rep init --remote ws://host:7878        Sync with a remote
  rep init --path ~/gym                   Initialize another directory"))]
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(long)]
        path: Option<String>,

        /// Remote Data Service URL (ws:// or wss://)
        #[arg(long)]
        remote: Option<String>,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
