//! Combat actions and the immutable turn records they produce

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// How hard an attack swings.
///
/// Heavier swings hit harder but are easier to see coming; quick jabs trade
/// damage for being hard to dodge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Quick,
    Normal,
    Heavy,
}

impl AttackKind {
    /// Multiplier applied to the attacker's base damage.
    pub fn damage_multiplier(&self) -> f64 {
        match self {
            AttackKind::Quick => 0.7,
            AttackKind::Normal => 1.0,
            AttackKind::Heavy => 1.5,
        }
    }

    /// Flat adjustment, in percentage points, to the defender's dodge chance.
    pub fn dodge_adjustment(&self) -> f64 {
        match self {
            AttackKind::Quick => -10.0,
            AttackKind::Normal => 0.0,
            AttackKind::Heavy => 10.0,
        }
    }
}

/// A defensive posture held until the opponent's next attack lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Block,
    Dodge,
}

/// What a player can do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    Attack(AttackKind),
    Block,
    Dodge,
}

impl CombatAction {
    /// The stance this action prepares, if it is a defensive action.
    pub fn stance(&self) -> Option<Stance> {
        match self {
            CombatAction::Attack(_) => None,
            CombatAction::Block => Some(Stance::Block),
            CombatAction::Dodge => Some(Stance::Dodge),
        }
    }
}

/// Extra effect a critical hit can land on the defender.
/// Serialized camelCase; it crosses the wire inside turn records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusEffect {
    Stun,
    Bleed,
    ArmorBreak,
}

/// The resolved record of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnAction {
    pub action: CombatAction,
    pub damage: i32,
    pub is_critical: bool,
    pub is_blocked: bool,
    pub is_dodged: bool,
    pub effects: Vec<BonusEffect>,
}

impl TurnAction {
    /// Record for a stance action, which never touches health.
    pub fn stance_only(action: CombatAction) -> Self {
        Self {
            action,
            damage: 0,
            is_critical: false,
            is_blocked: false,
            is_dodged: false,
            effects: Vec::new(),
        }
    }
}

/// One entry in a combat's append-only history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub player_id: PlayerId,
    pub action: TurnAction,
    pub timestamp: DateTime<Utc>,
}
