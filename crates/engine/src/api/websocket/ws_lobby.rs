use super::*;

use crate::use_cases::lobby::JoinError;

pub(super) async fn handle_join_game(
    state: &WsState,
    connection_id: ConnectionId,
    name: String,
) -> Option<ServerMessage> {
    if let Some(player) = state.connections.player_of(connection_id).await {
        tracing::debug!(connection_id = %connection_id, player_id = %player, "Duplicate join ignored");
        return None;
    }

    match state.app.use_cases.lobby.join(connection_id, &name).await {
        Ok(_) => None,
        Err(e) => match e {
            JoinError::BlankName => Some(ServerMessage::error(
                ErrorCode::InvalidPlayerData,
                e.to_string(),
            )),
            // The socket is already gone; nobody is listening for a reply.
            JoinError::ConnectionClosed => None,
        },
    }
}

pub(super) async fn handle_update_position(
    state: &WsState,
    player: PlayerId,
    x: f64,
    y: f64,
    direction: Option<String>,
) -> Option<ServerMessage> {
    state
        .app
        .use_cases
        .lobby
        .update_position(player, x, y, direction)
        .await;
    None
}

pub(super) async fn handle_chat(
    state: &WsState,
    player: PlayerId,
    message: String,
) -> Option<ServerMessage> {
    state.app.use_cases.lobby.chat(player, &message).await;
    None
}

pub(super) async fn handle_heartbeat(state: &WsState, player: PlayerId) -> Option<ServerMessage> {
    state.app.use_cases.lobby.heartbeat(player).await;
    Some(ServerMessage::HeartbeatAck)
}
