// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    let header = fg(colors::codes::HEADER);
    let context = fg(colors::codes::CONTEXT);

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(fg(colors::codes::LITERAL))
        .placeholder(context)
        .valid(context)
        .invalid(fg(colors::codes::WARN))
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    format!(
        "\
{header_sessions}
  {run}         Run a session interactively
  {plan}        Show a session's flattened plan

{header_sync}
  {queue}       List changes waiting to sync
  {sync}        Push queued changes to the remote now
  {quarantine}  List or clear changes the remote refused

{header_setup}
  {init}        Initialize rep in this directory
",
        header_sessions = colors::header("Sessions:"),
        header_sync = colors::header("Sync:"),
        header_setup = colors::header("Setup:"),
        run = colors::literal("run"),
        plan = colors::literal("plan"),
        queue = colors::literal("queue"),
        sync = colors::literal("sync"),
        quarantine = colors::literal("quarantine"),
        init = colors::literal("init"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  rep init --remote ws://host:7878    Initialize with a remote
  rep plan <session>                  Preview the plan
  rep run <session>                   Start or resume a session
  rep queue                           See what has not synced yet",
    )
}

/// Commands accepted inside `rep run`.
pub fn session_commands() -> String {
    colors::examples(
        "\
Session commands:
  start                                          Start the session
  log <position> <reps> <load> <rpe> [comment]   Log one set
  feedback <target> <difficulty> <enjoyment> [rpe] [comment]
  done <position>                                Mark an exercise done
  round <circuit> <n>                            Complete round n of a circuit
  skip-rest <circuit>                            End the current rest early
  complete [comment]                             Finish the session
  proof <url> <content-type> [bytes]             Attach proof media
  status                                         Show progress and sync state
  sync                                           Push queued changes now
  help                                           Show this list
  quit                                           Leave; queued changes are kept

Feedback targets:
  <position>, c<circuit> or session",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
