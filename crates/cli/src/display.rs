// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rp_core::{PendingMutation, Session, SessionPlan};

use crate::colors;
use crate::sync::QuarantinedMutation;

/// Maximum line width for wrapped coach notes (excluding indent).
const WRAP_WIDTH: usize = 72;

/// Wrap text at word boundaries if it's a single line.
///
/// Multi-line content is returned as-is to preserve the author's layout.
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in content.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Plan listing for `rep plan`.
pub fn format_plan(session: &Session, plan: &SessionPlan) -> Vec<String> {
    let kind = if plan.is_circuit() { "circuit" } else { "classic" };
    let mut lines = vec![format!(
        "{} {} ({} plan, {} exercises)",
        colors::header(&format!("session {}:", session.id)),
        session.status,
        kind,
        plan.len()
    )];

    let mut segment: Option<&str> = None;
    for entry in &plan.entries {
        if let Some(tag) = &entry.segment {
            if segment != Some(tag.segment_id.as_str()) {
                segment = Some(tag.segment_id.as_str());
                lines.push(format!("  {}", colors::header(&format!("{}:", tag.kind))));
            }
        }

        let name = if entry.exercise_name.is_empty() {
            entry.exercise_id.as_str()
        } else {
            entry.exercise_name.as_str()
        };
        let mut line = format!("  {:>2}. {}", entry.position, name);
        let prescription = entry.prescription();
        if !prescription.is_empty() {
            line.push_str(&format!("  {}", colors::context(&prescription)));
        }
        if let Some(circuit) = entry.circuit {
            line.push_str(&format!("  {}", colors::context(&format!("circuit {}", circuit))));
        }
        lines.push(line);

        if let Some(notes) = &entry.notes {
            for note_line in wrap_text(notes, WRAP_WIDTH).lines() {
                lines.push(format!("      {}", note_line));
            }
        }
    }

    for circuit in &plan.circuits {
        lines.push(format!(
            "  circuit {}: {} rounds, {}s rest",
            circuit.number, circuit.rounds, circuit.rest_secs
        ));
    }
    lines
}

/// One queue entry: `id  kind  summary`.
pub fn format_mutation_line(mutation: &PendingMutation) -> String {
    format!(
        "{}  {:<14}  {}  {}",
        colors::literal(&mutation.id),
        mutation.kind().as_str(),
        mutation.summary(),
        colors::context(&mutation.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
    )
}

/// One quarantine entry, with the reason on its own line.
pub fn format_quarantined(entry: &QuarantinedMutation) -> Vec<String> {
    vec![
        format_mutation_line(&entry.mutation),
        format!("    {}", colors::warn(&format!("refused: {}", entry.reason))),
    ]
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
