// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between the client and the Remote Data Service.
//!
//! Every exchange is request/response over one connection:
//! - Client opens with `hello` and waits for `welcome`
//! - Each `apply` is answered by `applied` or `rejected` for the same id
//! - Each fetch is answered by its payload or `not_found`

use serde::{Deserialize, Serialize};

use crate::mutation::PendingMutation;
use crate::plan::{Segment, Workout};
use crate::session::Session;

/// Why the service refused a mutation. All codes are permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectCode {
    /// The client does not own the targeted session.
    Unauthorized,
    /// The payload can never be applied (unknown session, status regression, ...).
    Invalid,
}

/// What a `not_found` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Session,
    Program,
    Workout,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on a connection. Identifies the caller for authorization.
    Hello { client_id: String },

    /// Apply a mutation. The mutation id is the idempotency key.
    Apply { mutation: PendingMutation },

    FetchSession { session_id: String },

    /// Segments of a composed program. An empty list means the program is
    /// not composed.
    FetchSegments { program_id: String },

    FetchWorkout { workout_id: String },

    /// Keepalive.
    Ping { id: u64 },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome { server_version: String },

    /// The mutation is applied. `duplicate` is set when the id had already
    /// been applied earlier and nothing changed.
    Applied { id: String, duplicate: bool },

    Rejected {
        id: String,
        reason: String,
        code: RejectCode,
    },

    Session { session: Session },

    Segments { segments: Vec<Segment> },

    Workout { workout: Workout },

    NotFound { resource: Resource, id: String },

    Pong { id: u64 },

    /// Malformed request or internal failure. Treated as transient.
    Error { message: String },
}

impl ClientMessage {
    pub fn hello(client_id: impl Into<String>) -> Self {
        ClientMessage::Hello {
            client_id: client_id.into(),
        }
    }

    pub fn apply(mutation: PendingMutation) -> Self {
        ClientMessage::Apply { mutation }
    }

    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    pub fn welcome() -> Self {
        ServerMessage::Welcome {
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn applied(id: impl Into<String>, duplicate: bool) -> Self {
        ServerMessage::Applied {
            id: id.into(),
            duplicate,
        }
    }

    pub fn rejected(id: impl Into<String>, code: RejectCode, reason: impl Into<String>) -> Self {
        ServerMessage::Rejected {
            id: id.into(),
            reason: reason.into(),
            code,
        }
    }

    pub fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        ServerMessage::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
