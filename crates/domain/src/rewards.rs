//! Reward math for a finished duel
//!
//! Gold, experience and the loot roll for the winner, plus the experience
//! penalty for the loser. Every formula is explicitly capped so extreme
//! stat combinations cannot produce runaway payouts.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::CombatStats;
use crate::combatant::Combatant;
use crate::ids::ItemId;
use crate::resolve::roll_percent;

// =============================================================================
// Tuning constants
// =============================================================================

/// Duels with a wider level gap than this pay out nothing to the winner.
pub const PENALTY_LEVEL_THRESHOLD: i32 = 5;

/// Loot eligibility reaches this many levels above the winner.
pub const ITEM_LEVEL_MARGIN: i32 = 2;

const GOLD_BASE: i32 = 50;
const GOLD_PER_LEVEL: i32 = 10;
const GOLD_DAMAGE_DIVISOR: i32 = 4;
const GOLD_PERFORMANCE_CAP: i32 = 50;
const GOLD_CAP: i32 = 500;

const XP_BASE: i32 = 25;
const XP_PER_LEVEL: i32 = 5;
const XP_DAMAGE_DIVISOR: i32 = 5;
const XP_PERFORMANCE_CAP: i32 = 40;
const SWIFT_VICTORY_SECS: i64 = 60;
const SWIFT_VICTORY_BONUS: i32 = 25;
const XP_CAP: i32 = 300;

const ITEM_DROP_CHANCE_PERCENT: f64 = 15.0;

const XP_LOSS_BASE: i32 = 10;
const XP_LOSS_PER_LEVEL: i32 = 2;
const XP_LOSS_MISMATCH_MULTIPLIER: i32 = 2;
const XP_LOSS_CAP: i32 = 100;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Drop weight; strictly decreasing from common to legendary.
    pub fn weight(&self) -> u32 {
        match self {
            Rarity::Common => 60,
            Rarity::Uncommon => 25,
            Rarity::Rare => 10,
            Rarity::Epic => 4,
            Rarity::Legendary => 1,
        }
    }
}

/// One loot candidate as the item catalog exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub rarity: Rarity,
    pub level_required: i32,
}

/// The item a winner walked away with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub id: ItemId,
    pub name: String,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPenalties {
    pub level_difference: i32,
    pub no_rewards: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatRewards {
    pub gold: i32,
    pub experience: i32,
    pub item: Option<ItemDrop>,
    pub penalties: RewardPenalties,
}

// =============================================================================
// Calculation
// =============================================================================

/// Compute the winner's payout for a finished duel.
///
/// A level gap beyond [`PENALTY_LEVEL_THRESHOLD`] zeroes gold, experience
/// and loot, leaving only the populated penalty reason. Otherwise gold and
/// experience scale with the winner's level and performance, each capped,
/// and the loot roll picks rarity-weighted among `eligible_items`.
pub fn calculate_rewards(
    winner: &Combatant,
    loser: &Combatant,
    stats: &CombatStats,
    eligible_items: &[CatalogItem],
    rng: &mut impl Rng,
) -> CombatRewards {
    let level_difference = winner.level - loser.level;

    if level_difference.abs() > PENALTY_LEVEL_THRESHOLD {
        return CombatRewards {
            gold: 0,
            experience: 0,
            item: None,
            penalties: RewardPenalties {
                level_difference,
                no_rewards: true,
                reason: Some(format!(
                    "Level gap of {} exceeds the fair duel limit of {}",
                    level_difference.abs(),
                    PENALTY_LEVEL_THRESHOLD
                )),
            },
        };
    }

    let performance_gold =
        (stats.damage_dealt / GOLD_DAMAGE_DIVISOR).clamp(0, GOLD_PERFORMANCE_CAP);
    let gold = (GOLD_BASE + winner.level * GOLD_PER_LEVEL + performance_gold).min(GOLD_CAP);

    let performance_xp = (stats.damage_dealt / XP_DAMAGE_DIVISOR).clamp(0, XP_PERFORMANCE_CAP);
    let swiftness = if stats.duration_secs < SWIFT_VICTORY_SECS {
        SWIFT_VICTORY_BONUS
    } else {
        0
    };
    let experience =
        (XP_BASE + winner.level * XP_PER_LEVEL + performance_xp + swiftness).min(XP_CAP);

    CombatRewards {
        gold,
        experience,
        item: roll_item(eligible_items, rng),
        penalties: RewardPenalties {
            level_difference,
            no_rewards: false,
            reason: None,
        },
    }
}

/// Experience the loser forfeits. Always computed, even when the winner's
/// rewards are voided; doubled when the level gap breaches the threshold.
pub fn xp_loss(loser: &Combatant, level_difference: i32) -> i32 {
    let mut loss = XP_LOSS_BASE + loser.level * XP_LOSS_PER_LEVEL;
    if level_difference.abs() > PENALTY_LEVEL_THRESHOLD {
        loss *= XP_LOSS_MISMATCH_MULTIPLIER;
    }
    loss.min(XP_LOSS_CAP)
}

fn roll_item(eligible_items: &[CatalogItem], rng: &mut impl Rng) -> Option<ItemDrop> {
    if eligible_items.is_empty() || !roll_percent(rng, ITEM_DROP_CHANCE_PERCENT) {
        return None;
    }

    let total_weight: u32 = eligible_items.iter().map(|item| item.rarity.weight()).sum();
    let mut pick = rng.gen_range(0..total_weight);
    for item in eligible_items {
        let weight = item.rarity.weight();
        if pick < weight {
            return Some(ItemDrop {
                id: item.id,
                name: item.name.clone(),
                rarity: item.rarity,
            });
        }
        pick -= weight;
    }
    None
}
