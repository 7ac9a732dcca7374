// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rp-core: Shared library for the rep workout session engine
//!
//! This crate provides the data model, the session lifecycle and circuit
//! machines, plan normalization, pending mutations and the wire protocol
//! used by both the rep CLI and the rp-remote service.

pub mod circuit;
pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod mutation;
pub mod plan;
pub mod protocol;
pub mod records;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use circuit::{CircuitMachine, CircuitState, RoundOutcome, TickOutcome};
pub use clock::{Clock, IdSource, SystemClock, UuidSource};
pub use error::{Error, Result};
pub use lifecycle::{
    Checkpoint, ExecutionState, FeedbackFor, Progress, Ratings, Readiness, SessionMachine,
};
pub use mutation::{MutationKind, MutationPayload, PendingMutation};
pub use plan::{
    normalize, CircuitConfig, PlanEntry, Segment, SegmentKind, SegmentTag, SessionPlan,
    UpstreamPlan, Workout, WorkoutKind,
};
pub use records::{ExerciseFeedback, FeedbackTarget, SetLog, StatusUpdate};
pub use session::{PlanRef, ProofMedia, Session, SessionStatus};
