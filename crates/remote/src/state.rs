// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! The catalog (sessions, programs, workouts) is seeded from
//! `catalog.json` in the data directory. Every applied mutation is appended
//! to `applied.jsonl`; replaying that journal on startup rebuilds session
//! state and the set of ids already applied, so a retried mutation is
//! answered as a duplicate even across restarts.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use rp_core::protocol::{RejectCode, ServerMessage};
use rp_core::{
    ExerciseFeedback, FeedbackTarget, MutationPayload, PendingMutation, Segment, Session,
    SetLog, StatusUpdate, Workout,
};

const CATALOG_FILE: &str = "catalog.json";
const JOURNAL_FILE: &str = "applied.jsonl";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StateError>;

/// Seed data written by the external planner.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Program id to its ordered segments.
    #[serde(default)]
    pub programs: HashMap<String, Vec<Segment>>,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

/// Shared server state.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<Mutex<Store>>,
}

struct Store {
    sessions: HashMap<String, Session>,
    programs: HashMap<String, Vec<Segment>>,
    workouts: HashMap<String, Workout>,
    applied: HashSet<String>,
    set_logs: Vec<SetLog>,
    feedback: Vec<ExerciseFeedback>,
    journal_path: PathBuf,
}

impl ServerState {
    /// Opens the state in `data_dir`, replaying the journal if present.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let catalog = match fs::read_to_string(data_dir.join(CATALOG_FILE)) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Catalog::default(),
            Err(e) => return Err(e.into()),
        };

        let mut store = Store {
            sessions: HashMap::new(),
            programs: catalog.programs,
            workouts: HashMap::new(),
            applied: HashSet::new(),
            set_logs: Vec::new(),
            feedback: Vec::new(),
            journal_path: data_dir.join(JOURNAL_FILE),
        };
        for session in catalog.sessions {
            store.sessions.insert(session.id.clone(), session);
        }
        for workout in catalog.workouts {
            store.workouts.insert(workout.id.clone(), workout);
        }

        let replayed = store.replay()?;
        info!(
            sessions = store.sessions.len(),
            workouts = store.workouts.len(),
            replayed,
            "state loaded"
        );
        Ok(ServerState {
            inner: Arc::new(Mutex::new(store)),
        })
    }

    pub async fn insert_session(&self, session: Session) {
        let mut store = self.inner.lock().await;
        store.sessions.insert(session.id.clone(), session);
    }

    pub async fn insert_program(&self, program_id: &str, segments: Vec<Segment>) {
        let mut store = self.inner.lock().await;
        store.programs.insert(program_id.to_string(), segments);
    }

    pub async fn insert_workout(&self, workout: Workout) {
        let mut store = self.inner.lock().await;
        store.workouts.insert(workout.id.clone(), workout);
    }

    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.inner.lock().await.sessions.get(session_id).cloned()
    }

    /// Segments of a program; empty when the program is not composed.
    pub async fn segments(&self, program_id: &str) -> Vec<Segment> {
        self.inner
            .lock()
            .await
            .programs
            .get(program_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn workout(&self, workout_id: &str) -> Option<Workout> {
        self.inner.lock().await.workouts.get(workout_id).cloned()
    }

    /// Set logs recorded for a session, in applied order.
    pub async fn set_logs(&self, session_id: &str) -> Vec<SetLog> {
        let store = self.inner.lock().await;
        store
            .set_logs
            .iter()
            .filter(|log| log.session_id == session_id)
            .cloned()
            .collect()
    }

    pub async fn feedback(&self, session_id: &str) -> Vec<ExerciseFeedback> {
        let store = self.inner.lock().await;
        store
            .feedback
            .iter()
            .filter(|f| f.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Applies a mutation on behalf of `client_id`.
    ///
    /// Returns `applied` (possibly as a duplicate) or `rejected`. Only
    /// storage failures are errors.
    pub async fn apply(&self, client_id: &str, mutation: PendingMutation) -> Result<ServerMessage> {
        let mut store = self.inner.lock().await;

        if store.applied.contains(&mutation.id) {
            return Ok(ServerMessage::applied(mutation.id, true));
        }

        let session_id = mutation.session_id().to_string();
        let owner = match store.sessions.get(&session_id) {
            Some(session) => session.client_id.clone(),
            None => {
                let reason = format!("unknown session '{}'", session_id);
                return Ok(reject(&mutation, RejectCode::Invalid, reason));
            }
        };
        if owner != client_id {
            warn!(
                id = %mutation.id,
                session = %session_id,
                client = %client_id,
                "unauthorized mutation"
            );
            return Ok(reject(
                &mutation,
                RejectCode::Unauthorized,
                format!("session '{}' belongs to another client", session_id),
            ));
        }
        if let Err(reason) = store.check(&mutation.payload) {
            return Ok(reject(&mutation, RejectCode::Invalid, reason));
        }

        store.append(&mutation)?;
        store.commit(mutation.payload);
        store.applied.insert(mutation.id.clone());
        info!(id = %mutation.id, session = %session_id, "mutation applied");
        Ok(ServerMessage::applied(mutation.id, false))
    }
}

fn reject(mutation: &PendingMutation, code: RejectCode, reason: String) -> ServerMessage {
    info!(id = %mutation.id, ?code, %reason, "mutation rejected");
    ServerMessage::rejected(mutation.id.as_str(), code, reason)
}

impl Store {
    /// Why `payload` can never be applied, if it cannot.
    fn check(&self, payload: &MutationPayload) -> std::result::Result<(), String> {
        match payload {
            MutationPayload::SetLog(log) => log.validate().map_err(|e| e.to_string()),
            MutationPayload::Feedback(feedback) => {
                feedback.validate().map_err(|e| e.to_string())?;
                let repeated = feedback.target == FeedbackTarget::Session
                    && self.feedback.iter().any(|f| {
                        f.session_id == feedback.session_id && f.target == FeedbackTarget::Session
                    });
                if repeated {
                    return Err(format!(
                        "session feedback already recorded for {}",
                        feedback.session_id
                    ));
                }
                Ok(())
            }
            MutationPayload::SessionStatus(update) => {
                let Some(session) = self.sessions.get(&update.session_id) else {
                    return Err(format!("unknown session '{}'", update.session_id));
                };
                // One step at a time. A terminal status may be sent again, for
                // example to attach proof.
                let current = session.status;
                let allowed = current.can_transition_to(update.status)
                    || (current.is_terminal() && update.status == current);
                if !allowed {
                    return Err(format!("cannot go from {} to {}", current, update.status));
                }
                Ok(())
            }
        }
    }

    fn commit(&mut self, payload: MutationPayload) {
        match payload {
            MutationPayload::SetLog(log) => self.set_logs.push(log),
            MutationPayload::Feedback(feedback) => self.feedback.push(feedback),
            MutationPayload::SessionStatus(update) => self.update_session(update),
        }
    }

    fn update_session(&mut self, update: StatusUpdate) {
        let Some(session) = self.sessions.get_mut(&update.session_id) else {
            return;
        };
        session.status = update.status;
        // Timestamps are set once and kept
        if session.started_at.is_none() {
            session.started_at = update.started_at;
        }
        if session.completed_at.is_none() {
            session.completed_at = update.completed_at;
        }
        if update.comment.is_some() {
            session.comment = update.comment;
        }
        if update.proof.is_some() {
            session.proof = update.proof;
        }
    }

    fn append(&self, mutation: &PendingMutation) -> Result<()> {
        let mut line = serde_json::to_string(mutation)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.journal_path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Re-applies the journal. A torn last line is skipped.
    fn replay(&mut self) -> Result<usize> {
        let file = match File::open(&self.journal_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mutation: PendingMutation = match serde_json::from_str(&line) {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable journal line");
                    continue;
                }
            };
            if self.applied.insert(mutation.id.clone()) {
                self.commit(mutation.payload);
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
