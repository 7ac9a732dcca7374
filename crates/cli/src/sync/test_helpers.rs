// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Notify, Semaphore};
use rp_core::protocol::{ClientMessage, ServerMessage};
use rp_core::{
    MutationPayload, PendingMutation, PlanEntry, Segment, SegmentKind, Session, SessionStatus,
    SetLog, StatusUpdate, Workout, WorkoutKind,
};

use super::remote::{ApplyOutcome, RemoteDataService, RemoteError, RemoteFuture, RemoteResult};
use super::transport::{Transport, TransportError, TransportFuture};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .unwrap_or_default()
}

/// A set-log mutation whose set index doubles as its sequence number.
pub fn make_set_log(id: &str, set_index: u32) -> PendingMutation {
    PendingMutation::new(
        id,
        MutationPayload::SetLog(SetLog {
            session_id: "s-1".into(),
            exercise_id: "squat".into(),
            entry: 0,
            set_index,
            reps: 8,
            load: 60.0,
            rpe: 7,
            comment: None,
            logged_at: at(set_index as i64),
        }),
        at(set_index as i64),
    )
}

pub fn make_status(id: &str, status: SessionStatus) -> PendingMutation {
    PendingMutation::new(
        id,
        MutationPayload::SessionStatus(StatusUpdate {
            session_id: "s-1".into(),
            status,
            started_at: Some(at(0)),
            completed_at: (status == SessionStatus::Completed).then(|| at(60)),
            comment: None,
            proof: None,
        }),
        at(60),
    )
}

pub fn classic_workout(id: &str, exercises: &[&str]) -> Workout {
    Workout {
        id: id.to_string(),
        name: format!("Workout {}", id),
        kind: WorkoutKind::Classic,
        entries: exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| PlanEntry::new(i as u32 + 1, *ex))
            .collect(),
        rounds: None,
        rest_secs: None,
        circuits: Vec::new(),
    }
}

pub fn circuit_workout(id: &str, exercises: &[&str], rounds: u32, rest_secs: u32) -> Workout {
    Workout {
        kind: WorkoutKind::Circuit,
        rounds: Some(rounds),
        rest_secs: Some(rest_secs),
        ..classic_workout(id, exercises)
    }
}

pub fn segment(id: &str, kind: SegmentKind, position: u32, workout: Workout) -> Segment {
    Segment {
        id: id.to_string(),
        kind,
        position,
        workout,
    }
}

/// Ids of the given mutations, in order.
pub fn ids(mutations: &[PendingMutation]) -> Vec<String> {
    mutations.iter().map(|m| m.id.clone()).collect()
}

/// In-memory transport answering each request through a responder.
///
/// Returning `None` from the responder simulates the peer hanging up.
pub struct MockTransport {
    connected: bool,
    connect_fails: Arc<AtomicBool>,
    replies: VecDeque<Option<ServerMessage>>,
    sent: Arc<Mutex<Vec<ClientMessage>>>,
    responder: Box<dyn FnMut(&ClientMessage) -> Option<ServerMessage> + Send + Sync>,
}

impl MockTransport {
    pub fn new(
        responder: impl FnMut(&ClientMessage) -> Option<ServerMessage> + Send + Sync + 'static,
    ) -> Self {
        MockTransport {
            connected: false,
            connect_fails: Arc::new(AtomicBool::new(false)),
            replies: VecDeque::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            responder: Box::new(responder),
        }
    }

    /// A transport whose server welcomes and then applies everything.
    pub fn accepting() -> Self {
        Self::new(|msg| match msg {
            ClientMessage::Hello { .. } => Some(ServerMessage::welcome()),
            ClientMessage::Apply { mutation } => Some(ServerMessage::applied(&mutation.id, false)),
            ClientMessage::Ping { id } => Some(ServerMessage::Pong { id: *id }),
            _ => Some(ServerMessage::error("unsupported")),
        })
    }

    /// Handle recording every message sent.
    pub fn sent(&self) -> Arc<Mutex<Vec<ClientMessage>>> {
        Arc::clone(&self.sent)
    }

    /// Switch making connection attempts fail.
    pub fn connect_fails(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connect_fails)
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            if self.connect_fails.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionFailed(format!("{} refused", url)));
            }
            self.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected = false;
            self.replies.clear();
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            let reply = (self.responder)(&msg);
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(msg);
            }
            self.replies.push_back(reply);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>> {
        Box::pin(async move {
            match self.replies.pop_front() {
                Some(Some(reply)) => Ok(Some(reply)),
                Some(None) | None => {
                    self.connected = false;
                    Ok(None)
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Holds applies on a [`MockRemote`] until opened.
#[derive(Clone)]
pub struct ApplyGate {
    entered: Arc<Notify>,
    open: Arc<Semaphore>,
}

impl ApplyGate {
    /// Resolves once an apply is waiting at the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets every waiting and later apply through.
    pub fn open(&self) {
        self.open.add_permits(1);
    }
}

/// Scripted Remote Data Service.
///
/// Applies succeed unless an error was scripted for that mutation id. Each
/// scripted error is used once.
#[derive(Default)]
pub struct MockRemote {
    gate: Mutex<Option<ApplyGate>>,
    applied: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, RemoteError>>,
    sessions: Mutex<HashMap<String, Session>>,
    segments: Mutex<HashMap<String, Vec<Segment>>>,
    workouts: Mutex<HashMap<String, Workout>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes applies wait until the returned gate is opened.
    pub fn hold_applies(&self) -> ApplyGate {
        let gate = ApplyGate {
            entered: Arc::new(Notify::new()),
            open: Arc::new(Semaphore::new(0)),
        };
        if let Ok(mut slot) = self.gate.lock() {
            *slot = Some(gate.clone());
        }
        gate
    }

    pub fn fail(&self, id: &str, error: RemoteError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(id.to_string(), error);
        }
    }

    /// Ids applied so far, in order. Duplicates appear once.
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn add_session(&self, session: Session) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(session.id.clone(), session);
        }
    }

    pub fn add_segments(&self, program_id: &str, segments: Vec<Segment>) {
        if let Ok(mut all) = self.segments.lock() {
            all.insert(program_id.to_string(), segments);
        }
    }

    pub fn add_workout(&self, workout: Workout) {
        if let Ok(mut workouts) = self.workouts.lock() {
            workouts.insert(workout.id.clone(), workout);
        }
    }

    fn lookup<T: Clone>(
        map: &Mutex<HashMap<String, T>>,
        resource: &'static str,
        id: &str,
    ) -> RemoteResult<T> {
        map.lock()
            .ok()
            .and_then(|m| m.get(id).cloned())
            .ok_or_else(|| RemoteError::NotFound {
                resource,
                id: id.to_string(),
            })
    }
}

impl RemoteDataService for MockRemote {
    fn apply<'a>(&'a self, mutation: &'a PendingMutation) -> RemoteFuture<'a, ApplyOutcome> {
        Box::pin(async move {
            let gate = self.gate.lock().ok().and_then(|g| g.clone());
            if let Some(gate) = gate {
                gate.entered.notify_one();
                // The permit goes back on drop, so one open releases all
                let _ = gate.open.acquire().await;
            }
            let scripted = self
                .failures
                .lock()
                .ok()
                .and_then(|mut f| f.remove(&mutation.id));
            if let Some(error) = scripted {
                return Err(error);
            }
            let mut applied = self
                .applied
                .lock()
                .map_err(|_| RemoteError::Protocol("poisoned".into()))?;
            if applied.contains(&mutation.id) {
                return Ok(ApplyOutcome::Duplicate);
            }
            applied.push(mutation.id.clone());
            Ok(ApplyOutcome::Applied)
        })
    }

    fn fetch_session<'a>(&'a self, session_id: &'a str) -> RemoteFuture<'a, Session> {
        Box::pin(async move { Self::lookup(&self.sessions, "session", session_id) })
    }

    fn fetch_segments<'a>(&'a self, program_id: &'a str) -> RemoteFuture<'a, Vec<Segment>> {
        Box::pin(async move {
            Ok(self
                .segments
                .lock()
                .ok()
                .and_then(|m| m.get(program_id).cloned())
                .unwrap_or_default())
        })
    }

    fn fetch_workout<'a>(&'a self, workout_id: &'a str) -> RemoteFuture<'a, Workout> {
        Box::pin(async move { Self::lookup(&self.workouts, "workout", workout_id) })
    }
}
