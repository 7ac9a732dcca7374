// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help and session output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use crate::env;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders/context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Online, confirmed: soft green
    pub const GOOD: u8 = 114;
    /// Offline, pending, rejected: amber
    pub const WARN: u8 = 179;
}

const RESET: &str = "\x1b[0m";

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

pub fn good(text: &str) -> String {
    paint(codes::GOOD, text)
}

pub fn warn(text: &str) -> String {
    paint(codes::WARN, text)
}

/// Colorize an examples block.
///
/// Lines ending in `:` are headers. Other lines are split at the first
/// run of two spaces into a command (literal, `<placeholders>` as context)
/// and a plain description.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let mut out = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            out.push(format!("{}{}", indent, header(trimmed)));
        } else if let Some(end) = find_description_start(trimmed) {
            let (cmd, desc) = trimmed.split_at(end);
            out.push(format!("{}{}{}", indent, colorize_command(cmd), desc));
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

/// Colors a command as literal text with `<placeholders>` as context.
pub fn colorize_command(cmd: &str) -> String {
    let mut result = String::with_capacity(cmd.len() + 32);
    let mut rest = cmd;
    while let Some(open) = rest.find('<') {
        let close = rest[open..].find('>').map(|i| open + i + 1).unwrap_or(rest.len());
        if open > 0 {
            result.push_str(&literal(&rest[..open]));
        }
        result.push_str(&context(&rest[open..close]));
        rest = &rest[close..];
    }
    if !rest.is_empty() {
        result.push_str(&literal(rest));
    }
    result
}

/// Find where the description starts (after 2+ spaces following the command).
pub fn find_description_start(line: &str) -> Option<usize> {
    let start = line.find("  ")?;
    let after = line[start..].find(|c: char| c != ' ')?;
    (after >= 2).then_some(start)
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
