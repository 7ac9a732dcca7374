// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core session types: Session, SessionStatus, PlanRef and ProofMedia.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Execution status of a workout session.
///
/// Serialized with the wire names used by the remote store, where the
/// terminal completed state is spelled `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Assigned but not yet started. Initial state.
    #[serde(rename = "planned")]
    Planned,
    /// Being executed by the client.
    #[serde(rename = "ongoing")]
    Ongoing,
    /// Finished with all performance data captured.
    #[serde(rename = "done")]
    Completed,
    /// Dropped by the coach or an administrative action.
    #[serde(rename = "skipped")]
    Skipped,
}

impl SessionStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Completed => "done",
            SessionStatus::Skipped => "skipped",
        }
    }

    /// Check if this core may drive a transition from this status to target.
    ///
    /// Only planned → ongoing and ongoing → done are driven here. Skipping is
    /// an external action and is never a valid target.
    pub fn can_transition_to(&self, target: SessionStatus) -> bool {
        matches!(
            (self, target),
            (SessionStatus::Planned, SessionStatus::Ongoing)
                | (SessionStatus::Ongoing, SessionStatus::Completed)
        )
    }

    /// Get valid transition targets as a formatted string.
    pub fn valid_targets(&self) -> String {
        match self {
            SessionStatus::Planned => "ongoing".to_string(),
            SessionStatus::Ongoing => "done".to_string(),
            SessionStatus::Completed | SessionStatus::Skipped => "(none, terminal)".to_string(),
        }
    }

    /// Returns true if this is a terminal state (done or skipped).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Skipped)
    }

    /// Position in the forward-only lifecycle, used to reject regressions.
    pub fn rank(&self) -> u8 {
        match self {
            SessionStatus::Planned => 0,
            SessionStatus::Ongoing => 1,
            SessionStatus::Completed | SessionStatus::Skipped => 2,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(SessionStatus::Planned),
            "ongoing" => Ok(SessionStatus::Ongoing),
            "done" | "completed" => Ok(SessionStatus::Completed),
            "skipped" => Ok(SessionStatus::Skipped),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Reference to the plan a session executes.
///
/// A session may point at a single workout, a composed program of several
/// workout segments, or both (the program wins when it has segments).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

impl PlanRef {
    pub fn workout(id: impl Into<String>) -> Self {
        PlanRef {
            workout_id: Some(id.into()),
            program_id: None,
        }
    }

    pub fn program(id: impl Into<String>) -> Self {
        PlanRef {
            workout_id: None,
            program_id: Some(id.into()),
        }
    }
}

/// Proof-of-completion media attached after a session is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMedia {
    /// Opaque reference returned by the upload collaborator.
    pub url: String,
    /// MIME type of the uploaded media.
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl ProofMedia {
    /// Checks the reference against the image-only constraint and the size
    /// ceiling, when the size is known.
    pub fn validate(&self, max_bytes: u64) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidProof("empty media reference".to_string()));
        }
        if !self.content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(Error::InvalidProof(format!(
                "'{}' is not an image type",
                self.content_type
            )));
        }
        if let Some(size) = self.size_bytes {
            if size > max_bytes {
                return Err(Error::InvalidProof(format!(
                    "{} bytes exceeds the {} byte limit",
                    size, max_bytes
                )));
            }
        }
        Ok(())
    }
}

/// One assignment of a plan to a client for one calendar occasion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub client_id: String,
    pub plan: PlanRef,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-text closing comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofMedia>,
}

impl Session {
    /// Creates a planned session, as the external planner would.
    pub fn planned(id: impl Into<String>, client_id: impl Into<String>, plan: PlanRef) -> Self {
        Session {
            id: id.into(),
            client_id: client_id.into(),
            plan,
            status: SessionStatus::Planned,
            started_at: None,
            completed_at: None,
            comment: None,
            proof: None,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
