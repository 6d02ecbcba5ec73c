//! Damage resolution - pure math for a single attack
//!
//! `resolve_attack` owns every roll for one swing: critical, dodge, block,
//! defense reduction and the level-difference adjustment. The caller applies
//! the resulting damage; nothing here mutates a combatant.

use rand::Rng;

use crate::action::{AttackKind, BonusEffect, Stance};
use crate::combatant::Combatant;

// =============================================================================
// Tuning constants
// =============================================================================

const BASE_DAMAGE_MULTIPLIER: f64 = 1.0;

/// Critical chance: base + per-speed + per-level, capped.
const CRIT_BASE_PERCENT: f64 = 5.0;
const CRIT_PER_SPEED: f64 = 0.5;
const CRIT_PER_LEVEL: f64 = 0.3;
const CRIT_CAP_PERCENT: f64 = 40.0;
const CRIT_DAMAGE_MULTIPLIER: f64 = 2.0;
const CRIT_EFFECT_CHANCE_PERCENT: f64 = 30.0;

/// Dodge chance: base + per-defender-speed, adjusted by the attack kind,
/// capped before and after the prepared-stance bonus.
const DODGE_BASE_PERCENT: f64 = 5.0;
const DODGE_PER_SPEED: f64 = 0.6;
const DODGE_CAP_PERCENT: f64 = 35.0;
const DODGE_STANCE_BONUS_PERCENT: f64 = 25.0;
const DODGE_TOTAL_CAP_PERCENT: f64 = 60.0;

/// Block chance: base + per-defender-defense, same two-stage cap as dodge.
const BLOCK_BASE_PERCENT: f64 = 5.0;
const BLOCK_PER_DEFENSE: f64 = 0.5;
const BLOCK_CAP_PERCENT: f64 = 35.0;
const BLOCK_STANCE_BONUS_PERCENT: f64 = 30.0;
const BLOCK_TOTAL_CAP_PERCENT: f64 = 65.0;
const BLOCK_DAMAGE_MULTIPLIER: f64 = 0.5;

/// Unblocked hits lose one percent per defense point, never more than the cap.
const DEFENSE_REDUCTION_PER_POINT: f64 = 1.0;
const DEFENSE_REDUCTION_CAP_PERCENT: f64 = 75.0;

/// Each level of attacker advantage adds this percent, clamped both ways.
const LEVEL_DIFF_PERCENT_PER_LEVEL: f64 = 4.0;
const LEVEL_DIFF_CAP_PERCENT: f64 = 20.0;

/// A connecting hit always deals at least this much.
const MIN_DAMAGE: i32 = 1;

// =============================================================================
// Outcome
// =============================================================================

/// Everything one resolved swing did. Dodge and block are mutually
/// exclusive; a dodged swing carries zero damage and no effects.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub damage: i32,
    pub is_critical: bool,
    pub is_blocked: bool,
    pub is_dodged: bool,
    pub effects: Vec<BonusEffect>,
}

/// Roll a percentage check: true with `chance_percent` probability.
pub(crate) fn roll_percent(rng: &mut impl Rng, chance_percent: f64) -> bool {
    rng.gen_range(0.0..100.0) < chance_percent
}

fn crit_chance(attacker: &Combatant) -> f64 {
    (CRIT_BASE_PERCENT
        + attacker.speed as f64 * CRIT_PER_SPEED
        + attacker.level as f64 * CRIT_PER_LEVEL)
        .min(CRIT_CAP_PERCENT)
}

fn dodge_chance(defender: &Combatant, kind: AttackKind, stance: Option<Stance>) -> f64 {
    let base = (DODGE_BASE_PERCENT + defender.speed as f64 * DODGE_PER_SPEED
        + kind.dodge_adjustment())
    .clamp(0.0, DODGE_CAP_PERCENT);
    match stance {
        Some(Stance::Dodge) => (base + DODGE_STANCE_BONUS_PERCENT).min(DODGE_TOTAL_CAP_PERCENT),
        _ => base,
    }
}

fn block_chance(defender: &Combatant, stance: Option<Stance>) -> f64 {
    let base = (BLOCK_BASE_PERCENT + defender.defense as f64 * BLOCK_PER_DEFENSE)
        .clamp(0.0, BLOCK_CAP_PERCENT);
    match stance {
        Some(Stance::Block) => (base + BLOCK_STANCE_BONUS_PERCENT).min(BLOCK_TOTAL_CAP_PERCENT),
        _ => base,
    }
}

fn roll_bonus_effect(rng: &mut impl Rng) -> Option<BonusEffect> {
    if !roll_percent(rng, CRIT_EFFECT_CHANCE_PERCENT) {
        return None;
    }
    Some(match rng.gen_range(0..3) {
        0 => BonusEffect::Stun,
        1 => BonusEffect::Bleed,
        _ => BonusEffect::ArmorBreak,
    })
}

/// Resolve one attack against a defender who may hold a prepared stance.
///
/// Roll order: critical, dodge, block. A successful dodge short-circuits
/// everything after it. A block halves damage in place of the defense
/// reduction. The level-difference adjustment and the minimum-damage floor
/// apply to every swing that connects.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &Combatant,
    kind: AttackKind,
    defender_stance: Option<Stance>,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let mut damage =
        attacker.attack as f64 * BASE_DAMAGE_MULTIPLIER * kind.damage_multiplier();

    let is_critical = roll_percent(rng, crit_chance(attacker));
    if is_critical {
        damage *= CRIT_DAMAGE_MULTIPLIER;
    }

    if roll_percent(rng, dodge_chance(defender, kind, defender_stance)) {
        return AttackOutcome {
            damage: 0,
            is_critical,
            is_blocked: false,
            is_dodged: true,
            effects: Vec::new(),
        };
    }

    let is_blocked = roll_percent(rng, block_chance(defender, defender_stance));
    if is_blocked {
        damage *= BLOCK_DAMAGE_MULTIPLIER;
    } else {
        let reduction = (defender.defense as f64 * DEFENSE_REDUCTION_PER_POINT)
            .min(DEFENSE_REDUCTION_CAP_PERCENT);
        damage *= 1.0 - reduction / 100.0;
    }

    let level_bonus = ((attacker.level - defender.level) as f64 * LEVEL_DIFF_PERCENT_PER_LEVEL)
        .clamp(-LEVEL_DIFF_CAP_PERCENT, LEVEL_DIFF_CAP_PERCENT);
    damage *= 1.0 + level_bonus / 100.0;

    let mut effects = Vec::new();
    if is_critical {
        if let Some(effect) = roll_bonus_effect(rng) {
            effects.push(effect);
        }
    }

    AttackOutcome {
        damage: (damage.round() as i32).max(MIN_DAMAGE),
        is_critical,
        is_blocked,
        is_dodged: false,
        effects,
    }
}
