// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session runner: applies line commands to a session machine.
//!
//! Every accepted action that produces a mutation is appended to the
//! durable queue before the runner answers, so the pending count shown
//! to the user always matches what is on disk. Rejected actions change
//! nothing and enqueue nothing. An action whose mutation cannot be queued
//! is undone, so it can simply be retried.

use std::sync::Arc;

use rp_core::{
    Checkpoint, Clock, FeedbackFor, IdSource, PendingMutation, RoundOutcome, SessionMachine,
    SessionStatus, TickOutcome,
};
use tracing::{info, warn};

use super::command::SessionCommand;
use crate::colors;
use crate::error::Result;
use crate::help;
use crate::hydrate::{HydratedSession, SessionCache};
use crate::sync::DurableQueue;

/// What the loop should do after a command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    /// A mutation was queued.
    pub recorded: bool,
    /// The user asked for an immediate sync.
    pub sync: bool,
    pub quit: bool,
}

impl Reply {
    fn say(line: impl Into<String>) -> Self {
        Reply {
            lines: vec![line.into()],
            ..Reply::default()
        }
    }
}

/// Drives one session from user input.
pub struct SessionRunner<C: Clock, I: IdSource> {
    machine: SessionMachine<C, I>,
    queue: Arc<DurableQueue>,
    cache: Option<SessionCache>,
}

impl<C: Clock, I: IdSource> SessionRunner<C, I> {
    pub fn new(machine: SessionMachine<C, I>, queue: Arc<DurableQueue>) -> Self {
        SessionRunner {
            machine,
            queue,
            cache: None,
        }
    }

    /// Keeps the cached copy of the session current after each action.
    pub fn with_cache(mut self, cache: SessionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn machine(&self) -> &SessionMachine<C, I> {
        &self.machine
    }

    pub fn is_resting(&self) -> bool {
        self.machine.is_resting()
    }

    pub fn pending(&self) -> Result<usize> {
        Ok(self.queue.len()?)
    }

    pub fn handle(&mut self, command: SessionCommand) -> Result<Reply> {
        let checkpoint = self.machine.checkpoint();
        let reply = match command {
            SessionCommand::Start => match self.machine.start()? {
                Some(m) => {
                    let pending = self.record(m, checkpoint)?;
                    recorded(format!("session started ({})", pending_note(pending)))
                }
                None => Reply::say("session already ongoing"),
            },
            SessionCommand::Log {
                position,
                reps,
                load,
                rpe,
                comment,
            } => {
                let m = self
                    .machine
                    .log_set(position, reps, load, rpe, comment.as_deref())?;
                let summary = m.summary();
                let pending = self.record(m, checkpoint)?;
                recorded(format!("{} ({})", summary, pending_note(pending)))
            }
            SessionCommand::Feedback { target, ratings } => {
                let m = self.machine.record_feedback(target, ratings)?;
                let pending = self.record(m, checkpoint)?;
                let what = match target {
                    FeedbackFor::Exercise(p) => format!("exercise {}", p),
                    FeedbackFor::Circuit(c) => format!("circuit {}", c),
                    FeedbackFor::Session => "session".to_string(),
                };
                recorded(format!("feedback saved for {} ({})", what, pending_note(pending)))
            }
            SessionCommand::Done(position) => {
                if self.machine.mark_exercise_done(position)? {
                    self.save();
                    Reply::say(format!("exercise {} done", position))
                } else {
                    Reply::say(format!("exercise {} was already done", position))
                }
            }
            SessionCommand::Round { circuit, n } => {
                let line = match self.machine.complete_round(circuit, n)? {
                    RoundOutcome::Resting {
                        next_round,
                        rest_secs,
                    } => format!(
                        "circuit {}: round {} done, rest {}s before round {}",
                        circuit, n, rest_secs, next_round
                    ),
                    RoundOutcome::NextRound { round } => {
                        format!("circuit {}: round {} done, round {} starts", circuit, n, round)
                    }
                    RoundOutcome::AllRoundsComplete => {
                        format!("circuit {}: all rounds complete", circuit)
                    }
                };
                self.save();
                Reply::say(line)
            }
            SessionCommand::SkipRest(circuit) => {
                let round = self.machine.skip_rest(circuit)?;
                self.save();
                Reply::say(format!("circuit {}: rest skipped, round {} starts", circuit, round))
            }
            SessionCommand::Complete(comment) => {
                let m = self.machine.request_completion(comment.as_deref())?;
                let pending = self.record(m, checkpoint)?;
                info!(session = %self.machine.session().id, "session completed");
                recorded(format!("session complete ({})", pending_note(pending)))
            }
            SessionCommand::Proof(proof) => {
                let m = self.machine.attach_proof(proof)?;
                let pending = self.record(m, checkpoint)?;
                recorded(format!("proof attached ({})", pending_note(pending)))
            }
            SessionCommand::Status => Reply {
                lines: self.status_lines()?,
                ..Reply::default()
            },
            SessionCommand::Sync => Reply {
                sync: true,
                ..Reply::default()
            },
            SessionCommand::Help => Reply::say(help::session_commands()),
            SessionCommand::Quit => Reply {
                quit: true,
                ..Reply::default()
            },
        };
        Ok(reply)
    }

    /// Delivers one second of rest. Returns lines worth showing.
    pub fn tick(&mut self) -> Vec<String> {
        self.machine
            .tick()
            .into_iter()
            .filter_map(|(circuit, outcome)| match outcome {
                TickOutcome::RestOver { round } => Some(format!(
                    "circuit {}: rest over, round {} starts",
                    circuit, round
                )),
                TickOutcome::Counting { remaining_secs }
                    if remaining_secs <= 3 || remaining_secs % 10 == 0 =>
                {
                    Some(format!("circuit {}: {}s", circuit, remaining_secs))
                }
                _ => None,
            })
            .collect()
    }

    /// Session overview: status, plan entries and progress.
    pub fn status_lines(&self) -> Result<Vec<String>> {
        let session = self.machine.session();
        let progress = self.machine.progress();
        let mut lines = vec![format!(
            "{} {}",
            colors::header(&format!("session {}:", session.id)),
            status_label(session.status)
        )];

        for entry in &self.machine.plan().entries {
            let mark = if self.machine.has_signal(entry.position) {
                "x"
            } else {
                " "
            };
            let mut line = format!(
                "  [{}] {:>2}. {}",
                mark,
                entry.position,
                if entry.exercise_name.is_empty() {
                    &entry.exercise_id
                } else {
                    &entry.exercise_name
                }
            );
            let prescription = entry.prescription();
            if !prescription.is_empty() {
                line.push_str(&format!("  {}", colors::context(&prescription)));
            }
            if let Some(circuit) = entry.circuit {
                line.push_str(&format!("  {}", colors::context(&format!("circuit {}", circuit))));
            }
            lines.push(line);
        }

        for circuit in self.machine.circuits() {
            lines.push(format!(
                "  circuit {}: {}/{} rounds{}",
                circuit.number(),
                circuit.rounds_done(),
                circuit.config().rounds,
                if circuit.is_resting() {
                    format!(", resting {}s", circuit.countdown_display())
                } else {
                    String::new()
                }
            ));
        }

        lines.push(format!(
            "  {} of {} exercises signalled, {} sets logged, {}",
            progress.entries_signalled,
            progress.entries_required,
            progress.sets_logged,
            pending_note(self.pending()?)
        ));
        Ok(lines)
    }

    /// Queues `mutation`, or undoes the action that produced it.
    fn record(&mut self, mutation: PendingMutation, checkpoint: Checkpoint) -> Result<usize> {
        match self.queue.enqueue(&mutation) {
            Ok(pending) => {
                self.save();
                Ok(pending)
            }
            Err(e) => {
                warn!(id = %mutation.id, error = %e, "could not queue mutation, action undone");
                self.machine.rollback(checkpoint);
                Err(e.into())
            }
        }
    }

    /// Writes the session and its progress to the cache.
    fn save(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let snapshot = HydratedSession {
            session: self.machine.session().clone(),
            plan: self.machine.plan().clone(),
            execution: self.machine.execution_state(),
        };
        if let Err(e) = cache.store(&snapshot) {
            warn!(error = %e, "failed to update session cache");
        }
    }
}

fn recorded(line: String) -> Reply {
    Reply {
        lines: vec![line],
        recorded: true,
        ..Reply::default()
    }
}

fn status_label(status: SessionStatus) -> String {
    match status {
        SessionStatus::Completed => colors::good(status.as_str()),
        SessionStatus::Skipped => colors::warn(status.as_str()),
        _ => status.as_str().to_string(),
    }
}

/// "all synced" or "n pending sync".
pub fn pending_note(pending: usize) -> String {
    if pending == 0 {
        colors::good("all synced")
    } else {
        colors::warn(&format!("{} pending sync", pending))
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
