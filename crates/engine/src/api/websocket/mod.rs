//! WebSocket handling for player connections.
//!
//! Handles the JSON message protocol between the tavern server and browser
//! clients.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

mod ws_combat;
mod ws_lobby;

use taberna_domain::{ConnectionId, PlayerId};
use taberna_protocol::{ClientMessage, ErrorCode, ServerMessage};

use super::connections::ConnectionManager;
use crate::app::App;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();

    // Create a bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    state.connections.register(connection_id, tx.clone()).await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Spawn a task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &state, connection_id).await {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send response, channel full or closed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let error = ServerMessage::error(
                        ErrorCode::ParseError,
                        format!("Invalid message format: {}", e),
                    );
                    let _ = tx.try_send(error);
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            // Ping and Pong frames are answered at the protocol level
            _ => {}
        }
    }

    // Clean up: unregister first so the departure broadcasts skip this
    // socket, then settle whatever the player leaves behind.
    state.connections.unregister(connection_id).await;
    state
        .app
        .use_cases
        .lobby
        .leave_by_connection(connection_id)
        .await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client message to the appropriate handler.
async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    connection_id: ConnectionId,
) -> Option<ServerMessage> {
    // Joining is the only thing an anonymous connection may do.
    if let ClientMessage::JoinGame { name } = msg {
        return ws_lobby::handle_join_game(state, connection_id, name).await;
    }

    let Some(player) = state.connections.player_of(connection_id).await else {
        return Some(ServerMessage::error(
            ErrorCode::NotJoined,
            "Join the game before sending other messages",
        ));
    };

    match msg {
        // Handled above
        ClientMessage::JoinGame { .. } => None,

        // Lobby
        ClientMessage::UpdatePosition { x, y, direction } => {
            ws_lobby::handle_update_position(state, player, x, y, direction).await
        }
        ClientMessage::ChatMessage { message } => {
            ws_lobby::handle_chat(state, player, message).await
        }
        ClientMessage::Heartbeat => ws_lobby::handle_heartbeat(state, player).await,

        // Duels and combat
        ClientMessage::ChallengePlayer { target_id } => {
            ws_combat::handle_challenge_player(state, player, target_id).await
        }
        ClientMessage::RespondToChallenge {
            challenge_id,
            accepted,
        } => {
            ws_combat::handle_respond_to_challenge(state, player, challenge_id, accepted).await
        }
        ClientMessage::CombatAction { combat_id, action } => {
            ws_combat::handle_combat_action(state, player, combat_id, action).await
        }
    }
}

// =============================================================================
// WebSocket Integration Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support;
