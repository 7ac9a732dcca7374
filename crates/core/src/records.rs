// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Performance records captured while a session runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::{ProofMedia, SessionStatus};

/// Upper bound of every 0–10 subjective scale.
pub const SCALE_MAX: u8 = 10;

fn check_scale(field: &str, value: u8) -> Result<()> {
    if value > SCALE_MAX {
        return Err(Error::InvalidInput(format!(
            "{} must be between 0 and {}, got {}",
            field, SCALE_MAX, value
        )));
    }
    Ok(())
}

/// One completed set. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    pub session_id: String,
    pub exercise_id: String,
    /// Position of the plan entry in the flattened view.
    pub entry: usize,
    /// 1-based, increasing within one entry during one session.
    pub set_index: u32,
    pub reps: u32,
    #[serde(default)]
    pub load: f64,
    /// Perceived exertion, 0–10.
    pub rpe: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl SetLog {
    pub fn validate(&self) -> Result<()> {
        if self.set_index == 0 {
            return Err(Error::InvalidInput("set index is 1-based".to_string()));
        }
        if !self.load.is_finite() || self.load < 0.0 {
            return Err(Error::InvalidInput(format!(
                "load must be a non-negative number, got {}",
                self.load
            )));
        }
        check_scale("perceived exertion", self.rpe)
    }
}

/// What a feedback record rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FeedbackTarget {
    Exercise { entry: usize, exercise_id: String },
    Circuit { number: u32 },
    Session,
}

/// Subjective rating of an exercise, a circuit or the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseFeedback {
    pub session_id: String,
    pub target: FeedbackTarget,
    /// 0–10.
    pub difficulty: u8,
    /// 0–10.
    pub enjoyment: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ExerciseFeedback {
    pub fn validate(&self) -> Result<()> {
        check_scale("difficulty", self.difficulty)?;
        check_scale("enjoyment", self.enjoyment)?;
        if let Some(rpe) = self.rpe {
            check_scale("rpe", rpe)?;
        }
        Ok(())
    }
}

/// Session status change as sent to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofMedia>,
}

/// Trims free text, mapping blank input to `None`.
pub fn clean_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
