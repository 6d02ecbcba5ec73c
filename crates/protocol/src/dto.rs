//! Data Transfer Objects (DTOs)
//!
//! Wire-format mirrors of domain state. These types use raw UUIDs for
//! transport and camelCase field names to match the browser client; the
//! `From` impls are the only place domain state is flattened for the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taberna_domain::{
    AttackKind, BonusEffect, Challenge, CombatAction, CombatRewards, CombatState, CombatStatus,
    Combatant, ItemDrop, Rarity, RewardPenalties, Turn, TurnAction,
};

// =============================================================================
// Roster
// =============================================================================

/// One entry in the tavern roster broadcast to every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: Uuid,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub direction: String,
    pub level: i32,
    pub in_combat: bool,
}

// =============================================================================
// Combat actions
// =============================================================================

/// Action names as the client sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatActionDto {
    Attack,
    HeavyAttack,
    QuickAttack,
    Block,
    Dodge,
}

impl CombatActionDto {
    pub fn to_domain(self) -> CombatAction {
        match self {
            CombatActionDto::Attack => CombatAction::Attack(AttackKind::Normal),
            CombatActionDto::HeavyAttack => CombatAction::Attack(AttackKind::Heavy),
            CombatActionDto::QuickAttack => CombatAction::Attack(AttackKind::Quick),
            CombatActionDto::Block => CombatAction::Block,
            CombatActionDto::Dodge => CombatAction::Dodge,
        }
    }
}

impl From<CombatAction> for CombatActionDto {
    fn from(action: CombatAction) -> Self {
        match action {
            CombatAction::Attack(AttackKind::Normal) => CombatActionDto::Attack,
            CombatAction::Attack(AttackKind::Heavy) => CombatActionDto::HeavyAttack,
            CombatAction::Attack(AttackKind::Quick) => CombatActionDto::QuickAttack,
            CombatAction::Block => CombatActionDto::Block,
            CombatAction::Dodge => CombatActionDto::Dodge,
        }
    }
}

// =============================================================================
// Combat state
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantDto {
    pub id: Uuid,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub level: i32,
    pub is_alive: bool,
}

impl From<&Combatant> for CombatantDto {
    fn from(c: &Combatant) -> Self {
        Self {
            id: c.id.to_uuid(),
            name: c.name.clone(),
            health: c.health,
            max_health: c.max_health,
            attack: c.attack,
            defense: c.defense,
            speed: c.speed,
            level: c.level,
            is_alive: c.is_alive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatStatusDto {
    Active,
    Finished,
}

impl From<CombatStatus> for CombatStatusDto {
    fn from(status: CombatStatus) -> Self {
        match status {
            CombatStatus::Active => CombatStatusDto::Active,
            CombatStatus::Finished => CombatStatusDto::Finished,
        }
    }
}

/// The resolved record of one action, as transmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnActionDto {
    #[serde(rename = "type")]
    pub kind: CombatActionDto,
    pub damage: i32,
    pub is_critical: bool,
    pub is_blocked: bool,
    pub is_dodged: bool,
    pub effects: Vec<BonusEffect>,
}

impl From<&TurnAction> for TurnActionDto {
    fn from(action: &TurnAction) -> Self {
        Self {
            kind: action.action.into(),
            damage: action.damage,
            is_critical: action.is_critical,
            is_blocked: action.is_blocked,
            is_dodged: action.is_dodged,
            effects: action.effects.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDto {
    pub player_id: Uuid,
    pub action: TurnActionDto,
    pub timestamp: DateTime<Utc>,
}

impl From<&Turn> for TurnDto {
    fn from(turn: &Turn) -> Self {
        Self {
            player_id: turn.player_id.to_uuid(),
            action: (&turn.action).into(),
            timestamp: turn.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatStateDto {
    pub id: Uuid,
    pub challenger: CombatantDto,
    pub challenged: CombatantDto,
    pub current_turn: Uuid,
    pub turns: Vec<TurnDto>,
    pub status: CombatStatusDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl From<&CombatState> for CombatStateDto {
    fn from(state: &CombatState) -> Self {
        Self {
            id: state.id.to_uuid(),
            challenger: (&state.challenger).into(),
            challenged: (&state.challenged).into(),
            current_turn: state.current_turn.to_uuid(),
            turns: state.turns.iter().map(TurnDto::from).collect(),
            status: state.status.into(),
            winner: state.winner.map(|id| id.to_uuid()),
            start_time: state.started_at,
            end_time: state.ended_at,
        }
    }
}

// =============================================================================
// Challenges
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDto {
    pub id: Uuid,
    pub challenger: CombatantDto,
    pub challenged: CombatantDto,
    pub created_at: DateTime<Utc>,
}

impl From<&Challenge> for ChallengeDto {
    fn from(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id.to_uuid(),
            challenger: (&challenge.challenger).into(),
            challenged: (&challenge.challenged).into(),
            created_at: challenge.created_at,
        }
    }
}

// =============================================================================
// Rewards
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDropDto {
    pub id: Uuid,
    pub name: String,
    pub rarity: Rarity,
}

impl From<&ItemDrop> for ItemDropDto {
    fn from(item: &ItemDrop) -> Self {
        Self {
            id: item.id.to_uuid(),
            name: item.name.clone(),
            rarity: item.rarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltiesDto {
    pub level_difference: i32,
    pub no_rewards: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&RewardPenalties> for PenaltiesDto {
    fn from(penalties: &RewardPenalties) -> Self {
        Self {
            level_difference: penalties.level_difference,
            no_rewards: penalties.no_rewards,
            reason: penalties.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsDto {
    pub gold: i32,
    pub experience: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemDropDto>,
    pub penalties: PenaltiesDto,
}

impl From<&CombatRewards> for RewardsDto {
    fn from(rewards: &CombatRewards) -> Self {
        Self {
            gold: rewards.gold,
            experience: rewards.experience,
            item: rewards.item.as_ref().map(ItemDropDto::from),
            penalties: (&rewards.penalties).into(),
        }
    }
}
