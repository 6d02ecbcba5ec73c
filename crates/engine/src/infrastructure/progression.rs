//! Progression handoff.

use async_trait::async_trait;

use taberna_domain::{CombatRewards, PlayerId};

use crate::infrastructure::ports::{ProgressionError, ProgressionPort};

/// Logs finished duels instead of persisting them.
///
/// Stands in for the account backend until one exists; the combat core only
/// ever talks to [`ProgressionPort`], so swapping this out is a wiring
/// change in `main`.
pub struct LoggingProgression;

impl LoggingProgression {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingProgression {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressionPort for LoggingProgression {
    async fn record_combat_result(
        &self,
        winner: PlayerId,
        loser: PlayerId,
        rewards: CombatRewards,
        xp_loss: i32,
    ) -> Result<(), ProgressionError> {
        tracing::info!(
            winner = %winner,
            loser = %loser,
            gold = rewards.gold,
            experience = rewards.experience,
            item = rewards.item.as_ref().map(|i| i.name.as_str()),
            no_rewards = rewards.penalties.no_rewards,
            xp_loss,
            "Combat result recorded"
        );
        Ok(())
    }
}
