//! WebSocket message types for client-engine communication
//!
//! Every message crosses the wire as a `{"type": "...", "data": {...}}`
//! envelope with camelCase type and field names. `ClientMessage` is what the
//! engine receives; `ServerMessage` is what it sends.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::{ChallengeDto, CombatActionDto, CombatStateDto, PlayerDto, RewardsDto};

// =============================================================================
// Client Messages (Browser -> Engine)
// =============================================================================

/// Messages from the client to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Enter the tavern under a display name
    JoinGame { name: String },
    /// Move around the tavern floor
    UpdatePosition {
        x: f64,
        y: f64,
        #[serde(default)]
        direction: Option<String>,
    },
    /// Say something to everyone in the tavern
    ChatMessage { message: String },
    /// Challenge another player to a duel
    ChallengePlayer { target_id: Uuid },
    /// Accept or decline a received challenge
    RespondToChallenge { challenge_id: Uuid, accepted: bool },
    /// Take a combat turn
    CombatAction {
        combat_id: Uuid,
        action: CombatActionDto,
    },
    /// Liveness ping
    Heartbeat,
}

// =============================================================================
// Server Messages (Engine -> Browser)
// =============================================================================

/// Messages from the engine to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// The id assigned to the joining player
    #[serde(rename = "playerId")]
    PlayerAssigned { player_id: Uuid },
    /// Full tavern roster, sent after every roster change
    PlayersUpdate { players: Vec<PlayerDto> },
    /// A player left the tavern
    PlayerLeft { player_id: Uuid, name: String },
    /// Tavern chat relayed to everyone
    ChatMessage {
        player_id: Uuid,
        name: String,
        message: String,
    },
    /// A duel invitation, delivered to the challenged player only
    CombatChallenge { challenge: ChallengeDto },
    /// The challenged player turned the duel down
    ChallengeDeclined { challenge_id: Uuid },
    /// The invitation sat unanswered past its TTL
    ChallengeExpired { challenge_id: Uuid },
    /// Authoritative combat state after every accepted action
    CombatStateUpdate {
        combat_state: CombatStateDto,
        is_your_turn: bool,
    },
    /// Payout for a finished duel, sent to both participants
    CombatRewards {
        combat_id: Uuid,
        winner_id: Uuid,
        rewards: RewardsDto,
        xp_loss: i32,
    },
    /// Answer to a heartbeat ping
    HeartbeatAck,
    /// A rejected request; the connection stays up
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes sent inside `ServerMessage::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Join payload was malformed (empty name)
    InvalidPlayerData,
    /// Game message arrived before a successful join
    NotJoined,
    /// Challenge target is not in the tavern
    UnknownTarget,
    /// A player challenged themselves
    SelfChallenge,
    /// These two players already have a live challenge between them
    ChallengePending,
    /// One side is already fighting someone
    PlayerBusy,
    /// Challenge id is stale, resolved, or never existed
    UnknownChallenge,
    /// Combat id does not refer to a live combat
    UnknownCombat,
    /// Action submitted out of turn
    NotYourTurn,
    /// Action submitted after the combat finished
    CombatNotActive,
    /// Envelope could not be parsed
    ParseError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_game_envelope_parses() {
        let raw = r#"{"type":"joinGame","data":{"name":"Mira"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).expect("parses");
        assert_eq!(msg, ClientMessage::JoinGame { name: "Mira".into() });
    }

    #[test]
    fn combat_action_envelope_parses() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"type":"combatAction","data":{{"combatId":"{id}","action":"heavyAttack"}}}}"#
        );
        let msg: ClientMessage = serde_json::from_str(&raw).expect("parses");
        assert_eq!(
            msg,
            ClientMessage::CombatAction {
                combat_id: id,
                action: CombatActionDto::HeavyAttack,
            }
        );
    }

    #[test]
    fn heartbeat_has_no_data_payload() {
        let json = serde_json::to_value(&ClientMessage::Heartbeat).expect("serializes");
        assert_eq!(json["type"], "heartbeat");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn player_assigned_uses_the_player_id_type_tag() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(ServerMessage::PlayerAssigned { player_id: id })
            .expect("serializes");
        assert_eq!(json["type"], "playerId");
        assert_eq!(json["data"]["playerId"], id.to_string());
    }

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let json = serde_json::to_value(ServerMessage::error(
            ErrorCode::NotYourTurn,
            "wait for your turn",
        ))
        .expect("serializes");
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["code"], "NOT_YOUR_TURN");
    }

    #[test]
    fn server_envelope_fields_are_camel_case() {
        let json = serde_json::to_value(ServerMessage::CombatRewards {
            combat_id: Uuid::new_v4(),
            winner_id: Uuid::new_v4(),
            rewards: crate::dto::RewardsDto {
                gold: 85,
                experience: 75,
                item: None,
                penalties: crate::dto::PenaltiesDto {
                    level_difference: 0,
                    no_rewards: false,
                    reason: None,
                },
            },
            xp_loss: 12,
        })
        .expect("serializes");
        assert_eq!(json["type"], "combatRewards");
        assert!(json["data"].get("winnerId").is_some());
        assert!(json["data"].get("xpLoss").is_some());
    }
}
