// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Each connection is a strict request/response exchange. The first
//! message must be `hello`; its client id is used to authorize every
//! mutation on that connection.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

use rp_core::protocol::{ClientMessage, Resource, ServerMessage};

use crate::state::ServerState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), BoxError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), BoxError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();
    let mut client_id: Option<String> = None;

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = match handle_client_message(text.as_str(), &state, &mut client_id).await
                {
                    Ok(response) => response,
                    Err(e) => ServerMessage::error(e.to_string()),
                };
                ws_sink.send(Message::Text(response.to_json()?.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(_) => {
                // Ignore other message types (Binary, Pong, Frame)
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process one client message and build its reply.
pub(crate) async fn handle_client_message(
    text: &str,
    state: &ServerState,
    client_id: &mut Option<String>,
) -> Result<ServerMessage, BoxError> {
    let msg = ClientMessage::from_json(text)?;
    debug!("Received message: {:?}", msg);

    if let ClientMessage::Hello { client_id: id } = msg {
        info!(client = %id, "client said hello");
        *client_id = Some(id);
        return Ok(ServerMessage::welcome());
    }
    let Some(client) = client_id.as_deref() else {
        return Ok(ServerMessage::error("expected hello first"));
    };

    let reply = match msg {
        ClientMessage::Hello { .. } => ServerMessage::welcome(),
        ClientMessage::Apply { mutation } => state.apply(client, mutation).await?,
        ClientMessage::FetchSession { session_id } => match state.session(&session_id).await {
            Some(session) => ServerMessage::Session { session },
            None => ServerMessage::not_found(Resource::Session, session_id),
        },
        ClientMessage::FetchSegments { program_id } => ServerMessage::Segments {
            segments: state.segments(&program_id).await,
        },
        ClientMessage::FetchWorkout { workout_id } => match state.workout(&workout_id).await {
            Some(workout) => ServerMessage::Workout { workout },
            None => ServerMessage::not_found(Resource::Workout, workout_id),
        },
        ClientMessage::Ping { id } => ServerMessage::Pong { id },
    };
    Ok(reply)
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
