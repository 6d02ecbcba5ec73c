//! Tavern lobby: joining, movement, chat and liveness.

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use taberna_domain::{ConnectionId, PlayerId, StatBlock};
use taberna_protocol::ServerMessage;

use crate::api::connections::ConnectionManager;
use crate::infrastructure::ports::ClockPort;
use crate::stores::{PlayerRecord, PlayerRegistry};
use crate::use_cases::broadcast_roster;
use crate::use_cases::combat::CombatService;
use crate::use_cases::duel::DuelService;

/// Where new arrivals stand until they move.
const SPAWN_X: f64 = 400.0;
const SPAWN_Y: f64 = 300.0;
const SPAWN_DIRECTION: &str = "down";

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("player name must not be blank")]
    BlankName,
    #[error("connection closed before the join completed")]
    ConnectionClosed,
}

/// Owns the player roster and the session lifecycle around it.
///
/// Departures route through here regardless of cause (socket close or idle
/// sweep), so pending challenges and running combats are always settled the
/// same way.
pub struct LobbyService {
    players: Arc<PlayerRegistry>,
    connections: Arc<ConnectionManager>,
    duels: Arc<DuelService>,
    combats: Arc<CombatService>,
    clock: Arc<dyn ClockPort>,
    idle_timeout: Duration,
}

impl LobbyService {
    pub fn new(
        players: Arc<PlayerRegistry>,
        connections: Arc<ConnectionManager>,
        duels: Arc<DuelService>,
        combats: Arc<CombatService>,
        clock: Arc<dyn ClockPort>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            players,
            connections,
            duels,
            combats,
            clock,
            idle_timeout,
        }
    }

    /// Register a player for this connection, answer with their id and
    /// announce the new roster to everyone.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        name: &str,
    ) -> Result<PlayerId, JoinError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(JoinError::BlankName);
        }

        let now = self.clock.now();
        let record = PlayerRecord {
            id: PlayerId::new(),
            connection_id,
            name: name.to_string(),
            x: SPAWN_X,
            y: SPAWN_Y,
            direction: SPAWN_DIRECTION.to_string(),
            stats: StatBlock::default(),
            in_combat: false,
            joined_at: now,
            last_seen: now,
        };
        let player_id = record.id;
        self.players.insert(record).await;

        if !self.connections.bind_player(connection_id, player_id).await {
            // Socket vanished mid-join; drop the half-registered player.
            self.players.remove(player_id).await;
            return Err(JoinError::ConnectionClosed);
        }

        self.connections
            .send_to_connection(
                connection_id,
                ServerMessage::PlayerAssigned {
                    player_id: player_id.to_uuid(),
                },
            )
            .await;
        broadcast_roster(&self.players, &self.connections).await;
        tracing::info!(player_id = %player_id, name = %name, "Player joined the tavern");
        Ok(player_id)
    }

    /// Move a player across the tavern floor.
    pub async fn update_position(
        &self,
        player: PlayerId,
        x: f64,
        y: f64,
        direction: Option<String>,
    ) {
        let now = self.clock.now();
        if self
            .players
            .update_position(player, x, y, direction, now)
            .await
        {
            broadcast_roster(&self.players, &self.connections).await;
        }
    }

    /// Relay tavern chat to everyone. Blank messages are dropped.
    pub async fn chat(&self, player: PlayerId, message: &str) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        let Some(record) = self.players.get(player).await else {
            return;
        };
        self.players.touch(player, self.clock.now()).await;
        self.connections
            .broadcast(ServerMessage::ChatMessage {
                player_id: player.to_uuid(),
                name: record.name,
                message: message.to_string(),
            })
            .await;
    }

    /// Refresh the liveness timestamp.
    pub async fn heartbeat(&self, player: PlayerId) {
        self.players.touch(player, self.clock.now()).await;
    }

    /// Remove the player joined on this connection, if any, and settle
    /// whatever they leave behind. Idempotent.
    pub async fn leave_by_connection(&self, connection_id: ConnectionId) {
        let Some(record) = self.players.remove_by_connection(connection_id).await else {
            return;
        };
        self.settle_departure(record).await;
    }

    /// Drop players whose last activity is older than the idle timeout.
    /// Runs on the background sweep cadence.
    pub async fn sweep_idle(&self) {
        let now = self.clock.now();
        for player in self.players.idle_players(now, self.idle_timeout).await {
            let Some(record) = self.players.remove(player).await else {
                continue;
            };
            tracing::info!(
                player_id = %player,
                idle_secs = (now - record.last_seen).num_seconds(),
                "Dropping idle player"
            );
            // Cut the zombie socket first so nothing is sent to it below.
            self.connections.unregister(record.connection_id).await;
            self.settle_departure(record).await;
        }
    }

    async fn settle_departure(&self, record: PlayerRecord) {
        self.duels.discard_for(record.id).await;
        self.combats.forfeit(record.id).await;
        self.connections
            .broadcast(ServerMessage::PlayerLeft {
                player_id: record.id.to_uuid(),
                name: record.name.clone(),
            })
            .await;
        broadcast_roster(&self.players, &self.connections).await;
        tracing::info!(player_id = %record.id, name = %record.name, "Player left the tavern");
    }
}
