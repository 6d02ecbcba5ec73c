//! Use cases - user story orchestration.
//!
//! Each module owns one slice of the duel protocol and orchestrates across
//! the stores, the connection fan-out and the infrastructure ports.

pub mod combat;
pub mod duel;
pub mod lobby;

// Re-export main types
pub use combat::CombatService;
pub use duel::DuelService;
pub use lobby::LobbyService;

use taberna_protocol::{PlayerDto, ServerMessage};

use crate::api::connections::ConnectionManager;
use crate::stores::{PlayerRecord, PlayerRegistry};

fn player_dto(record: &PlayerRecord) -> PlayerDto {
    PlayerDto {
        id: record.id.to_uuid(),
        name: record.name.clone(),
        x: record.x,
        y: record.y,
        direction: record.direction.clone(),
        level: record.stats.level,
        in_combat: record.in_combat,
    }
}

/// Push the full roster to every connection. Sent after every roster
/// change: join, leave, movement, combat start and combat end.
pub(crate) async fn broadcast_roster(players: &PlayerRegistry, connections: &ConnectionManager) {
    let roster: Vec<PlayerDto> = players.roster().await.iter().map(player_dto).collect();
    connections
        .broadcast(ServerMessage::PlayersUpdate { players: roster })
        .await;
}

#[cfg(test)]
pub(crate) mod support;
