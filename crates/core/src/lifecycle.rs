// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle state machine.
//!
//! A [`SessionMachine`] owns one session for the duration of its execution,
//! together with the flattened plan and one [`CircuitMachine`] per circuit
//! group. Every accepted user action returns the [`PendingMutation`] to hand
//! to the local queue; rejected actions return an error and change nothing.
//!
//! ```text
//! Planned ──start──► Ongoing ──request_completion──► Completed
//!                                (guarded)
//! Skipped: set externally only
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::circuit::{CircuitMachine, CircuitState, RoundOutcome, TickOutcome};
use crate::clock::{Clock, IdSource, SystemClock, UuidSource};
use crate::error::{Error, Result};
use crate::mutation::{MutationPayload, PendingMutation};
use crate::plan::SessionPlan;
use crate::records::{
    clean_comment, ExerciseFeedback, FeedbackTarget, SetLog, StatusUpdate,
};
use crate::session::{ProofMedia, Session, SessionStatus};

/// Default proof-media ceiling (10 MiB).
pub const DEFAULT_PROOF_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// What a feedback request rates, addressed the way the user sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackFor {
    /// Plan entry by position in the flattened view.
    Exercise(usize),
    Circuit(u32),
    Session,
}

/// Ratings supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ratings {
    pub difficulty: u8,
    pub enjoyment: u8,
    pub rpe: Option<u8>,
    pub comment: Option<String>,
}

/// Why the completion guard currently fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Standalone entries without feedback or a done mark.
    pub missing_entries: Vec<usize>,
    /// Circuits that have not reached `AllRoundsComplete`.
    pub incomplete_circuits: Vec<u32>,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.missing_entries.is_empty() && self.incomplete_circuits.is_empty()
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing_entries.is_empty() {
            let list: Vec<String> = self.missing_entries.iter().map(|p| p.to_string()).collect();
            parts.push(format!(
                "exercises at positions {} need feedback or a done mark",
                list.join(", ")
            ));
        }
        if !self.incomplete_circuits.is_empty() {
            let list: Vec<String> = self
                .incomplete_circuits
                .iter()
                .map(|c| c.to_string())
                .collect();
            parts.push(format!("circuits {} have rounds left", list.join(", ")));
        }
        parts.join("; ")
    }
}

/// Progress counters for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub entries_signalled: usize,
    pub entries_required: usize,
    pub rounds_done: u32,
    pub rounds_total: u32,
    pub sets_logged: u32,
}

/// Local execution progress of a session, kept across restarts.
///
/// Set logs and feedback are also queued for the remote; done marks and
/// round progress only ever exist on this device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionState {
    /// Entry positions holding a completion signal.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub signals: BTreeSet<usize>,
    /// Last set index per entry position.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set_counts: BTreeMap<usize, u32>,
    /// Circuits that have left `Idle`, by number.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub circuits: BTreeMap<u32, CircuitState>,
    #[serde(default)]
    pub session_feedback: bool,
}

impl ExecutionState {
    pub fn is_empty(&self) -> bool {
        *self == ExecutionState::default()
    }
}

/// Everything an action can change, taken before the action runs.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    session: Session,
    circuits: Vec<CircuitMachine>,
    signals: BTreeSet<usize>,
    set_counts: BTreeMap<usize, u32>,
    session_feedback: bool,
}

/// Owns the status of one session and gates its completion.
pub struct SessionMachine<C: Clock = SystemClock, I: IdSource = UuidSource> {
    session: Session,
    plan: SessionPlan,
    circuits: Vec<CircuitMachine>,
    /// Entry positions holding a completion signal.
    signals: BTreeSet<usize>,
    /// Last set index per entry position.
    set_counts: BTreeMap<usize, u32>,
    session_feedback: bool,
    proof_max_bytes: u64,
    clock: C,
    ids: I,
}

impl SessionMachine<SystemClock, UuidSource> {
    pub fn new(session: Session, plan: SessionPlan) -> Self {
        Self::with_sources(session, plan, SystemClock, UuidSource)
    }
}

impl<C: Clock, I: IdSource> SessionMachine<C, I> {
    /// Creates a machine with custom time and id sources.
    pub fn with_sources(session: Session, plan: SessionPlan, clock: C, ids: I) -> Self {
        let circuits = plan
            .circuits
            .iter()
            .copied()
            .map(CircuitMachine::new)
            .collect();
        SessionMachine {
            session,
            plan,
            circuits,
            signals: BTreeSet::new(),
            set_counts: BTreeMap::new(),
            session_feedback: false,
            proof_max_bytes: DEFAULT_PROOF_MAX_BYTES,
            clock,
            ids,
        }
    }

    pub fn with_proof_limit(mut self, max_bytes: u64) -> Self {
        self.proof_max_bytes = max_bytes;
        self
    }

    /// Picks up a session where an earlier run left it.
    ///
    /// A rest that was counting down is treated as over. Fails without
    /// changing anything if `state` does not fit this plan.
    pub fn resume(&mut self, state: ExecutionState) -> Result<()> {
        if let Some(position) = state
            .signals
            .iter()
            .chain(state.set_counts.keys())
            .find(|p| self.plan.entry(**p).is_err())
        {
            return Err(Error::NoSuchEntry(*position));
        }

        let mut circuits: Vec<CircuitMachine> = self
            .plan
            .circuits
            .iter()
            .copied()
            .map(CircuitMachine::new)
            .collect();
        for (number, saved) in &state.circuits {
            let circuit = circuits
                .iter_mut()
                .find(|c| c.number() == *number)
                .ok_or(Error::NoSuchCircuit(*number))?;
            let saved = match *saved {
                CircuitState::Resting { next_round, .. } => {
                    CircuitState::RoundInProgress { round: next_round }
                }
                other => other,
            };
            circuit.restore(saved)?;
        }

        self.circuits = circuits;
        self.signals = state.signals;
        self.set_counts = state.set_counts;
        self.session_feedback = state.session_feedback;
        Ok(())
    }

    /// Progress worth keeping if the process stops now.
    pub fn execution_state(&self) -> ExecutionState {
        ExecutionState {
            signals: self.signals.clone(),
            set_counts: self.set_counts.clone(),
            circuits: self
                .circuits
                .iter()
                .filter(|c| c.state() != CircuitState::Idle)
                .map(|c| (c.number(), c.state()))
                .collect(),
            session_feedback: self.session_feedback,
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            session: self.session.clone(),
            circuits: self.circuits.clone(),
            signals: self.signals.clone(),
            set_counts: self.set_counts.clone(),
            session_feedback: self.session_feedback,
        }
    }

    /// Undoes every change made since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.session = checkpoint.session;
        self.circuits = checkpoint.circuits;
        self.signals = checkpoint.signals;
        self.set_counts = checkpoint.set_counts;
        self.session_feedback = checkpoint.session_feedback;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn circuits(&self) -> &[CircuitMachine] {
        &self.circuits
    }

    pub fn circuit(&self, number: u32) -> Result<&CircuitMachine> {
        self.circuits
            .iter()
            .find(|c| c.number() == number)
            .ok_or(Error::NoSuchCircuit(number))
    }

    /// True while any circuit is counting down a rest.
    pub fn is_resting(&self) -> bool {
        self.circuits.iter().any(CircuitMachine::is_resting)
    }

    pub fn has_signal(&self, position: usize) -> bool {
        self.signals.contains(&position)
    }

    /// Planned → Ongoing.
    ///
    /// Returns `None` when the session is already ongoing.
    pub fn start(&mut self) -> Result<Option<PendingMutation>> {
        match self.session.status {
            SessionStatus::Ongoing => return Ok(None),
            SessionStatus::Planned => {}
            other => return Err(transition_error(other, SessionStatus::Ongoing)),
        }

        let now = self.clock.now();
        self.session.status = SessionStatus::Ongoing;
        self.session.started_at = Some(now);

        let update = StatusUpdate {
            session_id: self.session.id.clone(),
            status: SessionStatus::Ongoing,
            started_at: Some(now),
            completed_at: None,
            comment: None,
            proof: None,
        };
        Ok(Some(self.mutation(MutationPayload::SessionStatus(update))))
    }

    /// Evaluates the completion guard without changing anything.
    pub fn readiness(&self) -> Readiness {
        Readiness {
            missing_entries: self
                .plan
                .standalone_entries()
                .map(|e| e.position)
                .filter(|p| !self.signals.contains(p))
                .collect(),
            incomplete_circuits: self
                .circuits
                .iter()
                .filter(|c| !c.is_complete())
                .map(CircuitMachine::number)
                .collect(),
        }
    }

    /// Ongoing → Completed, if every plan entry has been accounted for.
    pub fn request_completion(&mut self, comment: Option<&str>) -> Result<PendingMutation> {
        if self.session.status != SessionStatus::Ongoing {
            return Err(transition_error(self.session.status, SessionStatus::Completed));
        }
        let readiness = self.readiness();
        if !readiness.is_ready() {
            return Err(Error::NotReady(readiness.describe()));
        }

        let now = self.clock.now();
        let comment = clean_comment(comment);
        self.session.status = SessionStatus::Completed;
        self.session.completed_at = Some(now);
        self.session.comment = comment.clone();

        let update = StatusUpdate {
            session_id: self.session.id.clone(),
            status: SessionStatus::Completed,
            started_at: self.session.started_at,
            completed_at: Some(now),
            comment,
            proof: None,
        };
        Ok(self.mutation(MutationPayload::SessionStatus(update)))
    }

    /// Records one completed set for the entry at `position`.
    pub fn log_set(
        &mut self,
        position: usize,
        reps: u32,
        load: f64,
        rpe: u8,
        comment: Option<&str>,
    ) -> Result<PendingMutation> {
        self.require_ongoing("log a set")?;
        let exercise_id = self.plan.entry(position)?.exercise_id.clone();
        let set_index = self.set_counts.get(&position).copied().unwrap_or(0) + 1;

        let log = SetLog {
            session_id: self.session.id.clone(),
            exercise_id,
            entry: position,
            set_index,
            reps,
            load,
            rpe,
            comment: clean_comment(comment),
            logged_at: self.clock.now(),
        };
        log.validate()?;

        self.set_counts.insert(position, set_index);
        Ok(self.mutation(MutationPayload::SetLog(log)))
    }

    /// Records a subjective rating. Exercise feedback also counts as that
    /// entry's completion signal.
    pub fn record_feedback(
        &mut self,
        target: FeedbackFor,
        ratings: Ratings,
    ) -> Result<PendingMutation> {
        let target = match target {
            FeedbackFor::Exercise(position) => {
                self.require_ongoing("rate an exercise")?;
                let entry = self.plan.entry(position)?;
                FeedbackTarget::Exercise {
                    entry: position,
                    exercise_id: entry.exercise_id.clone(),
                }
            }
            FeedbackFor::Circuit(number) => {
                self.require_ongoing("rate a circuit")?;
                self.circuit(number)?;
                FeedbackTarget::Circuit { number }
            }
            FeedbackFor::Session => {
                if !matches!(
                    self.session.status,
                    SessionStatus::Ongoing | SessionStatus::Completed
                ) {
                    return Err(Error::NotOngoing {
                        action: "rate the session",
                        status: self.session.status.to_string(),
                    });
                }
                if self.session_feedback {
                    return Err(Error::DuplicateSessionFeedback(self.session.id.clone()));
                }
                FeedbackTarget::Session
            }
        };

        let feedback = ExerciseFeedback {
            session_id: self.session.id.clone(),
            target,
            difficulty: ratings.difficulty,
            enjoyment: ratings.enjoyment,
            rpe: ratings.rpe,
            comment: clean_comment(ratings.comment.as_deref()),
            recorded_at: self.clock.now(),
        };
        feedback.validate()?;

        match &feedback.target {
            FeedbackTarget::Exercise { entry, .. } => {
                self.signals.insert(*entry);
            }
            FeedbackTarget::Session => self.session_feedback = true,
            FeedbackTarget::Circuit { .. } => {}
        }
        Ok(self.mutation(MutationPayload::Feedback(feedback)))
    }

    /// Sets the explicit per-exercise completion flag. Local only.
    ///
    /// Returns false if the entry was already signalled.
    pub fn mark_exercise_done(&mut self, position: usize) -> Result<bool> {
        self.require_ongoing("mark an exercise done")?;
        self.plan.entry(position)?;
        Ok(self.signals.insert(position))
    }

    /// Completes round `n` of circuit `number`.
    pub fn complete_round(&mut self, number: u32, n: u32) -> Result<RoundOutcome> {
        self.require_ongoing("complete a round")?;
        self.circuit_mut(number)?.complete_round(n)
    }

    /// Delivers one second to every resting circuit.
    ///
    /// Returns the outcome of each circuit that was resting.
    pub fn tick(&mut self) -> Vec<(u32, TickOutcome)> {
        self.circuits
            .iter_mut()
            .filter(|c| c.is_resting())
            .map(|c| (c.number(), c.tick()))
            .collect()
    }

    pub fn skip_rest(&mut self, number: u32) -> Result<u32> {
        self.require_ongoing("skip a rest")?;
        self.circuit_mut(number)?.skip_rest()
    }

    /// Attaches proof-of-completion media to a completed session.
    pub fn attach_proof(&mut self, proof: ProofMedia) -> Result<PendingMutation> {
        if self.session.status != SessionStatus::Completed {
            return Err(Error::NotOngoing {
                action: "attach proof",
                status: self.session.status.to_string(),
            });
        }
        proof.validate(self.proof_max_bytes)?;
        self.session.proof = Some(proof.clone());

        let update = StatusUpdate {
            session_id: self.session.id.clone(),
            status: SessionStatus::Completed,
            started_at: self.session.started_at,
            completed_at: self.session.completed_at,
            comment: self.session.comment.clone(),
            proof: Some(proof),
        };
        Ok(self.mutation(MutationPayload::SessionStatus(update)))
    }

    pub fn progress(&self) -> Progress {
        let required: Vec<usize> = self.plan.standalone_entries().map(|e| e.position).collect();
        Progress {
            entries_signalled: required.iter().filter(|p| self.signals.contains(p)).count(),
            entries_required: required.len(),
            rounds_done: self.circuits.iter().map(CircuitMachine::rounds_done).sum(),
            rounds_total: self.circuits.iter().map(|c| c.config().rounds).sum(),
            sets_logged: self.set_counts.values().sum(),
        }
    }

    fn circuit_mut(&mut self, number: u32) -> Result<&mut CircuitMachine> {
        self.circuits
            .iter_mut()
            .find(|c| c.number() == number)
            .ok_or(Error::NoSuchCircuit(number))
    }

    fn require_ongoing(&self, action: &'static str) -> Result<()> {
        if self.session.status != SessionStatus::Ongoing {
            return Err(Error::NotOngoing {
                action,
                status: self.session.status.to_string(),
            });
        }
        Ok(())
    }

    fn mutation(&self, payload: MutationPayload) -> PendingMutation {
        PendingMutation::new(self.ids.next_id(), payload, self.clock.now())
    }
}

fn transition_error(from: SessionStatus, to: SessionStatus) -> Error {
    Error::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
        valid_targets: from.valid_targets(),
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
