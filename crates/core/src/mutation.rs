// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending mutations: the unit of offline work.
//!
//! Every user action taken while a session runs becomes a
//! [`PendingMutation`]. Mutations are:
//!
//! - Serializable: persisted one per line in the local queue
//! - Uniquely identified: the id doubles as an idempotency key remotely
//! - Ordered by the queue, never by their own fields
//!
//! On disk and on the wire a mutation is
//! `{ "id", "kind", "payload", "created_at" }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::records::{ExerciseFeedback, SetLog, StatusUpdate};

/// Discriminant of a mutation's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    #[serde(rename = "set-log")]
    SetLog,
    #[serde(rename = "feedback")]
    Feedback,
    #[serde(rename = "session-status")]
    SessionStatus,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::SetLog => "set-log",
            MutationKind::Feedback => "feedback",
            MutationKind::SessionStatus => "session-status",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "set-log" => Ok(MutationKind::SetLog),
            "feedback" => Ok(MutationKind::Feedback),
            "session-status" => Ok(MutationKind::SessionStatus),
            _ => Err(Error::InvalidMutationKind(s.to_string())),
        }
    }
}

/// Entity-shaped data carried by a mutation.
///
/// Serializes as the bare record; the kind travels next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MutationPayload {
    SetLog(SetLog),
    Feedback(ExerciseFeedback),
    SessionStatus(StatusUpdate),
}

impl MutationPayload {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationPayload::SetLog(_) => MutationKind::SetLog,
            MutationPayload::Feedback(_) => MutationKind::Feedback,
            MutationPayload::SessionStatus(_) => MutationKind::SessionStatus,
        }
    }

    /// Returns the session this payload belongs to.
    pub fn session_id(&self) -> &str {
        match self {
            MutationPayload::SetLog(log) => &log.session_id,
            MutationPayload::Feedback(feedback) => &feedback.session_id,
            MutationPayload::SessionStatus(update) => &update.session_id,
        }
    }
}

/// A locally queued, not-yet-confirmed write destined for the remote store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawMutation")]
pub struct PendingMutation {
    /// Locally generated unique identifier.
    pub id: String,
    pub payload: MutationPayload,
    pub created_at: DateTime<Utc>,
}

impl PendingMutation {
    pub fn new(id: impl Into<String>, payload: MutationPayload, created_at: DateTime<Utc>) -> Self {
        PendingMutation {
            id: id.into(),
            payload,
            created_at,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.payload.kind()
    }

    pub fn session_id(&self) -> &str {
        self.payload.session_id()
    }

    /// One-line description for queue listings.
    pub fn summary(&self) -> String {
        match &self.payload {
            MutationPayload::SetLog(log) => format!(
                "set {} of {}: {} reps @ {} (rpe {})",
                log.set_index, log.exercise_id, log.reps, log.load, log.rpe
            ),
            MutationPayload::Feedback(feedback) => format!(
                "feedback difficulty {} enjoyment {}",
                feedback.difficulty, feedback.enjoyment
            ),
            MutationPayload::SessionStatus(update) => {
                format!("session {} -> {}", update.session_id, update.status)
            }
        }
    }
}

impl Serialize for PendingMutation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        MutationRecord {
            id: &self.id,
            kind: self.kind(),
            payload: &self.payload,
            created_at: &self.created_at,
        }
        .serialize(serializer)
    }
}

/// Written record shape.
#[derive(Serialize)]
struct MutationRecord<'a> {
    id: &'a str,
    kind: MutationKind,
    payload: &'a MutationPayload,
    created_at: &'a DateTime<Utc>,
}

/// Read record shape, with the payload left untyped until `kind` is known.
#[derive(Deserialize)]
struct RawMutation {
    id: String,
    kind: MutationKind,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<RawMutation> for PendingMutation {
    type Error = Error;

    fn try_from(raw: RawMutation) -> Result<Self> {
        let payload = match raw.kind {
            MutationKind::SetLog => MutationPayload::SetLog(serde_json::from_value(raw.payload)?),
            MutationKind::Feedback => {
                MutationPayload::Feedback(serde_json::from_value(raw.payload)?)
            }
            MutationKind::SessionStatus => {
                MutationPayload::SessionStatus(serde_json::from_value(raw.payload)?)
            }
        };
        Ok(PendingMutation {
            id: raw.id,
            payload,
            created_at: raw.created_at,
        })
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
