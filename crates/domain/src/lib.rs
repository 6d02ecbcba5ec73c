pub mod action;
pub mod challenge;
pub mod combat;
pub mod combatant;
pub mod ids;
pub mod resolve;
pub mod rewards;

// Re-export ID types
pub use ids::{ChallengeId, CombatId, ConnectionId, ItemId, PlayerId};

// Re-export combat vocabulary
pub use action::{AttackKind, BonusEffect, CombatAction, Stance, Turn, TurnAction};
pub use challenge::Challenge;
pub use combat::{CombatError, CombatState, CombatStats, CombatStatus};
pub use combatant::{Combatant, StatBlock};
pub use resolve::{resolve_attack, AttackOutcome};
pub use rewards::{
    calculate_rewards, xp_loss, CatalogItem, CombatRewards, ItemDrop, Rarity, RewardPenalties,
    ITEM_LEVEL_MARGIN, PENALTY_LEVEL_THRESHOLD,
};
