//! Combatant snapshots - the per-duel view of a player's stats
//!
//! A `Combatant` is captured from the live player record when a challenge is
//! issued and lives only as long as the duel. Mutating it never touches the
//! player the snapshot was taken from.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// Base stats a player carries into a duel.
///
/// All values are whole points. `level` scales crit chance, damage bonuses
/// and reward math; the other four feed the damage resolution rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub max_health: i32,
    pub level: i32,
}

impl Default for StatBlock {
    /// Starting stats for a freshly joined player.
    fn default() -> Self {
        Self {
            attack: 10,
            defense: 5,
            speed: 5,
            max_health: 100,
            level: 1,
        }
    }
}

/// A player's combat-local stat snapshot.
///
/// Captured at challenge time, mutated only by the combat state machine,
/// discarded when the duel ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: PlayerId,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub level: i32,
    pub is_alive: bool,
}

impl Combatant {
    /// Snapshot a player entering a duel at full health.
    pub fn from_stats(id: PlayerId, name: impl Into<String>, stats: StatBlock) -> Self {
        Self {
            id,
            name: name.into(),
            health: stats.max_health,
            max_health: stats.max_health,
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed,
            level: stats.level,
            is_alive: true,
        }
    }

    /// Apply damage, clamping health at zero and updating `is_alive`.
    pub fn apply_damage(&mut self, damage: i32) {
        self.health = (self.health - damage).max(0);
        self.is_alive = self.health > 0;
    }
}
