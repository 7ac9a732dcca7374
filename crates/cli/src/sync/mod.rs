// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-tolerant sync with the Remote Data Service.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ enqueue ┌──────────────┐  apply   ┌──────────────┐
//! │   Session    │────────►│ DurableQueue │─────────►│  WsRemote    │
//! │   runner     │         │   (JSONL)    │ drainer  │ (Transport)  │
//! └──────────────┘         └──────────────┘          └──────────────┘
//!                                 ▲                         │
//!                                 │ offline → online        ▼
//!                          ┌──────────────┐          ┌──────────────┐
//!                          │ Reachability │◄─────────│  Connection  │
//!                          │   Monitor    │          │   Manager    │
//!                          └──────────────┘          └──────────────┘
//! ```
//!
//! Every recorded action lands in the queue first. The drainer replays it
//! in order whenever the remote becomes reachable or a sync is requested.

mod connection;
mod drainer;
mod queue;
mod reachability;
mod remote;
mod transport;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionStatus};
pub use drainer::{DrainError, DrainReport, SyncDrainer};
pub use queue::{DurableQueue, QuarantinedMutation, QueueError, QueueResult};
pub use reachability::{ReachabilityEvents, ReachabilityMonitor};
pub use remote::{
    ApplyOutcome, RemoteDataService, RemoteError, RemoteFuture, RemoteResult, WsRemote,
};
pub use transport::{Transport, TransportError, WebSocketTransport};

#[cfg(test)]
pub(crate) mod test_helpers;
