//! Port traits for infrastructure boundaries.
//!
//! The engine keeps all game state in memory, so ports exist only where it
//! touches the outside world: the clock (for testable TTL and timeout
//! logic), the loot table, and the progression backend that receives
//! finished duel results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use taberna_domain::{CatalogItem, CombatRewards, PlayerId};

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Game Data Ports
// =============================================================================

/// Source of loot candidates for the reward roll.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCatalogPort: Send + Sync {
    /// Items with a level requirement of at most `max_level`.
    async fn eligible_items(&self, max_level: i32) -> Vec<CatalogItem>;
}

/// Errors from the progression backend.
#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    #[error("progression backend unavailable: {0}")]
    Unavailable(String),
}

/// Receives the result of every finished duel.
///
/// The combat core never writes durable storage itself; it hands each
/// result across this boundary exactly once, when the combat finishes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionPort: Send + Sync {
    async fn record_combat_result(
        &self,
        winner: PlayerId,
        loser: PlayerId,
        rewards: CombatRewards,
        xp_loss: i32,
    ) -> Result<(), ProgressionError>;
}
