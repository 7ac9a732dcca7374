// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote Data Service client.
//!
//! [`RemoteDataService`] is the seam the drainer and the hydrator talk to.
//! [`WsRemote`] implements it over a [`Transport`], connecting lazily and
//! greeting the server with `hello` before the first request.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rp_core::protocol::{ClientMessage, RejectCode, Resource, ServerMessage};
use rp_core::{PendingMutation, Segment, Session, Workout};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::reachability::ReachabilityMonitor;
use super::transport::{Transport, TransportError, WebSocketTransport};

/// Outcome of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The service had already applied this mutation id.
    Duplicate,
}

/// Errors reported by the Remote Data Service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected reply from remote: {0}")]
    Protocol(String),

    #[error("remote has no {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("not authorized: {0}\n  hint: check client_id in .rep/config.toml")]
    Unauthorized(String),

    #[error("rejected by remote: {0}")]
    Rejected(String),
}

impl RemoteError {
    /// Fatal errors will never succeed on retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RemoteError::Unauthorized(_) | RemoteError::Rejected(_))
    }
}

impl From<TransportError> for RemoteError {
    fn from(e: TransportError) -> Self {
        RemoteError::Unreachable(e.to_string())
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteDataService`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// The server-side store of sessions, plans and captured data.
pub trait RemoteDataService: Send + Sync {
    /// Applies one mutation. The mutation id is sent as the idempotency key.
    fn apply<'a>(&'a self, mutation: &'a PendingMutation) -> RemoteFuture<'a, ApplyOutcome>;

    fn fetch_session<'a>(&'a self, session_id: &'a str) -> RemoteFuture<'a, Session>;

    /// Segments of a composed program. Empty when the program is not composed.
    fn fetch_segments<'a>(&'a self, program_id: &'a str) -> RemoteFuture<'a, Vec<Segment>>;

    fn fetch_workout<'a>(&'a self, workout_id: &'a str) -> RemoteFuture<'a, Workout>;
}

impl<R: RemoteDataService + ?Sized> RemoteDataService for Arc<R> {
    fn apply<'a>(&'a self, mutation: &'a PendingMutation) -> RemoteFuture<'a, ApplyOutcome> {
        (**self).apply(mutation)
    }

    fn fetch_session<'a>(&'a self, session_id: &'a str) -> RemoteFuture<'a, Session> {
        (**self).fetch_session(session_id)
    }

    fn fetch_segments<'a>(&'a self, program_id: &'a str) -> RemoteFuture<'a, Vec<Segment>> {
        (**self).fetch_segments(program_id)
    }

    fn fetch_workout<'a>(&'a self, workout_id: &'a str) -> RemoteFuture<'a, Workout> {
        (**self).fetch_workout(workout_id)
    }
}

/// Remote Data Service over a WebSocket-like [`Transport`].
///
/// Requests are serialized through one connection. Any transport failure
/// drops the connection and marks the remote unreachable; the next request
/// reconnects.
pub struct WsRemote<T: Transport = WebSocketTransport> {
    url: String,
    client_id: String,
    transport: Arc<Mutex<T>>,
    monitor: ReachabilityMonitor,
}

impl<T: Transport> Clone for WsRemote<T> {
    fn clone(&self) -> Self {
        WsRemote {
            url: self.url.clone(),
            client_id: self.client_id.clone(),
            transport: Arc::clone(&self.transport),
            monitor: self.monitor.clone(),
        }
    }
}

impl<T: Transport> WsRemote<T> {
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        transport: T,
        monitor: ReachabilityMonitor,
    ) -> Self {
        WsRemote {
            url: url.into(),
            client_id: client_id.into(),
            transport: Arc::new(Mutex::new(transport)),
            monitor,
        }
    }

    pub fn monitor(&self) -> &ReachabilityMonitor {
        &self.monitor
    }

    /// Connects and greets the server unless already connected.
    pub async fn ensure_connected(&self) -> RemoteResult<()> {
        let mut transport = self.transport.lock().await;
        self.connect_locked(&mut transport).await
    }

    /// Closes the connection, if any.
    pub async fn disconnect(&self) {
        let mut transport = self.transport.lock().await;
        let _ = transport.disconnect().await;
    }

    async fn connect_locked(&self, transport: &mut T) -> RemoteResult<()> {
        if transport.is_connected() {
            return Ok(());
        }
        let greeted: RemoteResult<()> = async {
            transport.connect(&self.url).await?;
            transport
                .send(ClientMessage::hello(self.client_id.as_str()))
                .await?;
            match transport.recv().await? {
                Some(ServerMessage::Welcome { server_version }) => {
                    debug!(url = %self.url, %server_version, "connected to remote");
                    Ok(())
                }
                Some(other) => Err(RemoteError::Protocol(format!(
                    "expected welcome, got {:?}",
                    other
                ))),
                None => Err(RemoteError::Unreachable("closed during handshake".into())),
            }
        }
        .await;

        match greeted {
            Ok(()) => {
                self.monitor.set_reachable(true);
                Ok(())
            }
            Err(e) => {
                let _ = transport.disconnect().await;
                self.monitor.set_reachable(false);
                Err(e)
            }
        }
    }

    /// Sends one request and waits for its reply.
    async fn request(&self, msg: ClientMessage) -> RemoteResult<ServerMessage> {
        let mut transport = self.transport.lock().await;
        self.connect_locked(&mut transport).await?;

        let reply: RemoteResult<ServerMessage> = async {
            transport.send(msg).await?;
            transport
                .recv()
                .await?
                .ok_or_else(|| RemoteError::Unreachable("connection closed".into()))
        }
        .await;

        match reply {
            Ok(ServerMessage::Error { message }) => Err(RemoteError::Protocol(message)),
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(error = %e, "lost connection to remote");
                let _ = transport.disconnect().await;
                self.monitor.set_reachable(false);
                Err(e)
            }
        }
    }
}

fn unexpected<T>(reply: ServerMessage) -> RemoteResult<T> {
    Err(RemoteError::Protocol(format!("unexpected {:?}", reply)))
}

fn not_found<T>(resource: Resource, id: String) -> RemoteResult<T> {
    let resource = match resource {
        Resource::Session => "session",
        Resource::Program => "program",
        Resource::Workout => "workout",
    };
    Err(RemoteError::NotFound { resource, id })
}

impl<T: Transport + 'static> RemoteDataService for WsRemote<T> {
    fn apply<'a>(&'a self, mutation: &'a PendingMutation) -> RemoteFuture<'a, ApplyOutcome> {
        Box::pin(async move {
            match self.request(ClientMessage::apply(mutation.clone())).await? {
                ServerMessage::Applied { id, duplicate } if id == mutation.id => Ok(if duplicate {
                    ApplyOutcome::Duplicate
                } else {
                    ApplyOutcome::Applied
                }),
                ServerMessage::Rejected { id, reason, code } if id == mutation.id => match code {
                    RejectCode::Unauthorized => Err(RemoteError::Unauthorized(reason)),
                    RejectCode::Invalid => Err(RemoteError::Rejected(reason)),
                },
                other => unexpected(other),
            }
        })
    }

    fn fetch_session<'a>(&'a self, session_id: &'a str) -> RemoteFuture<'a, Session> {
        Box::pin(async move {
            let msg = ClientMessage::FetchSession {
                session_id: session_id.to_string(),
            };
            match self.request(msg).await? {
                ServerMessage::Session { session } => Ok(session),
                ServerMessage::NotFound { resource, id } => not_found(resource, id),
                other => unexpected(other),
            }
        })
    }

    fn fetch_segments<'a>(&'a self, program_id: &'a str) -> RemoteFuture<'a, Vec<Segment>> {
        Box::pin(async move {
            let msg = ClientMessage::FetchSegments {
                program_id: program_id.to_string(),
            };
            match self.request(msg).await? {
                ServerMessage::Segments { segments } => Ok(segments),
                ServerMessage::NotFound { resource, id } => not_found(resource, id),
                other => unexpected(other),
            }
        })
    }

    fn fetch_workout<'a>(&'a self, workout_id: &'a str) -> RemoteFuture<'a, Workout> {
        Box::pin(async move {
            let msg = ClientMessage::FetchWorkout {
                workout_id: workout_id.to_string(),
            };
            match self.request(msg).await? {
                ServerMessage::Workout { workout } => Ok(workout),
                ServerMessage::NotFound { resource, id } => not_found(resource, id),
                other => unexpected(other),
            }
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
