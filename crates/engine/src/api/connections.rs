//! Connection management for WebSocket clients.
//!
//! Tracks live sockets and which player each one authenticated as. Game
//! state never holds a transport handle; everything addresses peers through
//! `ConnectionId` or `PlayerId` and the fan-out lives here.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use taberna_domain::{ConnectionId, PlayerId};
use taberna_protocol::ServerMessage;

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: ConnectionId,
    /// The player this connection joined as, once `joinGame` succeeded
    pub player_id: Option<PlayerId>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<ConnectionId, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    pub async fn register(&self, connection_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        let info = ConnectionInfo {
            connection_id,
            player_id: None,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| info.clone())
    }

    /// Tie a connection to the player it joined as.
    /// Returns false when the connection is already gone.
    pub async fn bind_player(&self, connection_id: ConnectionId, player_id: PlayerId) -> bool {
        let mut connections = self.connections.write().await;
        if let Some((info, _)) = connections.get_mut(&connection_id) {
            info.player_id = Some(player_id);
            tracing::info!(
                connection_id = %connection_id,
                player_id = %player_id,
                "Connection bound to player"
            );
            true
        } else {
            false
        }
    }

    /// The player a connection joined as, if any.
    pub async fn player_of(&self, connection_id: ConnectionId) -> Option<PlayerId> {
        let connections = self.connections.read().await;
        connections
            .get(&connection_id)
            .and_then(|(info, _)| info.player_id)
    }

    /// Send a message to one connection.
    pub async fn send_to_connection(&self, connection_id: ConnectionId, message: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some((info, sender)) = connections.get(&connection_id) {
            if let Err(e) = sender.try_send(message) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to send to connection"
                );
            }
        }
    }

    /// Send a message to the connection a player joined on.
    pub async fn send_to_player(&self, player_id: PlayerId, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.player_id == Some(player_id) {
                if let Err(e) = sender.try_send(message.clone()) {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to send to player"
                    );
                }
            }
        }
    }

    /// Broadcast a message to every connection, joined or not.
    pub async fn broadcast(&self, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if let Err(e) = sender.try_send(message.clone()) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
