// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session hydration.
//!
//! Loads a session and its plan from the Remote Data Service and resolves
//! the plan into the flattened view the session machine runs on. The last
//! hydrated copy of each session is cached under `.rep/sessions/`, together
//! with the progress made on this device, so a session can be opened again
//! without a connection and picked up where it was left.

use std::fs;
use std::path::{Path, PathBuf};

use rp_core::{normalize, ExecutionState, Session, SessionPlan, SessionStatus, UpstreamPlan};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sync::{RemoteDataService, RemoteError};

const SESSIONS_DIR_NAME: &str = "sessions";

/// A session together with its resolved plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedSession {
    pub session: Session,
    pub plan: SessionPlan,
    /// Progress made on this device. Empty for a freshly fetched session.
    #[serde(default, skip_serializing_if = "ExecutionState::is_empty")]
    pub execution: ExecutionState,
}

impl HydratedSession {
    pub fn new(session: Session, plan: SessionPlan) -> Self {
        HydratedSession {
            session,
            plan,
            execution: ExecutionState::default(),
        }
    }

    /// Carries progress from the cached copy over to a fresh one.
    ///
    /// Status changes still waiting in the queue leave the cached session
    /// ahead of the remote, and then its lifecycle fields win. Execution
    /// state is kept only while the plan is unchanged.
    fn with_local(mut self, local: HydratedSession) -> Self {
        if local.session.status.rank() > self.session.status.rank() {
            self.session.status = local.session.status;
            self.session.started_at = local.session.started_at;
            self.session.completed_at = local.session.completed_at;
            self.session.comment = local.session.comment;
            self.session.proof = local.session.proof;
        }
        if self.session.status == SessionStatus::Planned || local.execution.is_empty() {
            return self;
        }
        if local.plan == self.plan {
            self.execution = local.execution;
        } else {
            warn!(session = %self.session.id, "plan changed since the last run, local progress dropped");
        }
        self
    }
}

/// Fetches sessions and normalizes their plans.
pub struct SessionHydrator<R: RemoteDataService> {
    remote: R,
}

impl<R: RemoteDataService> SessionHydrator<R> {
    pub fn new(remote: R) -> Self {
        SessionHydrator { remote }
    }

    /// Loads `session_id` from the remote.
    ///
    /// A program with at least one segment is used as a composed plan;
    /// otherwise the session's single workout is used.
    pub async fn hydrate(&self, session_id: &str) -> Result<HydratedSession> {
        let session = self.remote.fetch_session(session_id).await?;
        let upstream = self.upstream_plan(&session).await?;
        let plan = normalize(&session.id, upstream)?;
        info!(
            session = %session.id,
            kind = ?plan.kind,
            entries = plan.len(),
            "session hydrated"
        );
        Ok(HydratedSession::new(session, plan))
    }

    async fn upstream_plan(&self, session: &Session) -> Result<UpstreamPlan> {
        if let Some(program_id) = &session.plan.program_id {
            let segments = self.remote.fetch_segments(program_id).await?;
            if !segments.is_empty() {
                debug!(program = %program_id, segments = segments.len(), "using composed plan");
                return Ok(UpstreamPlan::Composed(segments));
            }
            debug!(program = %program_id, "program has no segments, falling back to workout");
        }

        let workout_id = session
            .plan
            .workout_id
            .as_deref()
            .ok_or_else(|| Error::NoPlan(session.id.clone()))?;
        let workout = self.remote.fetch_workout(workout_id).await?;
        Ok(UpstreamPlan::Single(workout))
    }
}

/// Local copies of hydrated sessions.
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(state_dir: &Path) -> Self {
        SessionCache {
            dir: state_dir.join(SESSIONS_DIR_NAME),
        }
    }

    /// One file per session id. Bytes outside `[A-Za-z0-9-]` are written as
    /// `_xx` hex, so distinct ids never share a file.
    fn path_for(&self, session_id: &str) -> PathBuf {
        let mut name = String::with_capacity(session_id.len());
        for b in session_id.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' {
                name.push(char::from(b));
            } else {
                name.push_str(&format!("_{:02x}", b));
            }
        }
        self.dir.join(format!("{}.json", name))
    }

    pub fn store(&self, hydrated: &HydratedSession) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&hydrated.session.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(hydrated)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn load(&self, session_id: &str) -> Result<Option<HydratedSession>> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let hydrated: HydratedSession = serde_json::from_str(&content)?;
        if hydrated.session.id != session_id {
            warn!(
                session = %session_id,
                found = %hydrated.session.id,
                "cached file holds another session, ignoring it"
            );
            return Ok(None);
        }
        Ok(Some(hydrated))
    }
}

/// Hydrates from the remote, falling back to the cache when the remote
/// cannot be reached. A fresh copy replaces the cached one, keeping the
/// local progress it carried.
pub async fn hydrate_or_cached<R: RemoteDataService>(
    hydrator: &SessionHydrator<R>,
    cache: &SessionCache,
    session_id: &str,
) -> Result<HydratedSession> {
    match hydrator.hydrate(session_id).await {
        Ok(fresh) => {
            let hydrated = match cache.load(session_id) {
                Ok(Some(local)) => fresh.with_local(local),
                Ok(None) => fresh,
                Err(e) => {
                    warn!(session = %session_id, error = %e, "ignoring unreadable cached session");
                    fresh
                }
            };
            cache.store(&hydrated)?;
            Ok(hydrated)
        }
        Err(Error::Remote(RemoteError::Unreachable(reason))) => {
            warn!(session = %session_id, %reason, "remote unreachable, using cached session");
            cache
                .load(session_id)?
                .ok_or_else(|| Error::NotCached(session_id.to_string()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "hydrate_tests.rs"]
mod tests;
