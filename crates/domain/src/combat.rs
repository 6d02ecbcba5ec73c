//! The combat state machine for one duel
//!
//! A `CombatState` owns the authoritative view of a duel: both combatant
//! snapshots, whose turn it is, the append-only turn history, and the
//! terminal result. Status only ever moves Active -> Finished.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{CombatAction, Stance, Turn, TurnAction};
use crate::combatant::Combatant;
use crate::ids::{CombatId, PlayerId};
use crate::resolve::resolve_attack;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    Active,
    Finished,
}

/// Rejections for an action submission. Both leave the combat untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("combat is not active")]
    CombatNotActive,
}

/// Aggregates one side's performance for the reward math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    pub damage_dealt: i32,
    pub turns_taken: usize,
    pub duration_secs: i64,
}

/// One active or finished duel.
///
/// The challenger always takes the first turn. Stance slots hold a prepared
/// Block/Dodge until the opponent's next attack consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub id: CombatId,
    pub challenger: Combatant,
    pub challenged: Combatant,
    pub current_turn: PlayerId,
    pub turns: Vec<Turn>,
    pub status: CombatStatus,
    pub winner: Option<PlayerId>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// When the current turn was handed over; drives the idle-turn timeout.
    pub turn_started_at: DateTime<Utc>,
    pub challenger_stance: Option<Stance>,
    pub challenged_stance: Option<Stance>,
}

impl CombatState {
    pub fn new(challenger: Combatant, challenged: Combatant, now: DateTime<Utc>) -> Self {
        let first_turn = challenger.id;
        Self {
            id: CombatId::new(),
            challenger,
            challenged,
            current_turn: first_turn,
            turns: Vec::new(),
            status: CombatStatus::Active,
            winner: None,
            started_at: now,
            ended_at: None,
            turn_started_at: now,
            challenger_stance: None,
            challenged_stance: None,
        }
    }

    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.challenger.id == player_id || self.challenged.id == player_id
    }

    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        if player_id == self.challenger.id {
            Some(self.challenged.id)
        } else if player_id == self.challenged.id {
            Some(self.challenger.id)
        } else {
            None
        }
    }

    pub fn combatant(&self, player_id: PlayerId) -> Option<&Combatant> {
        if player_id == self.challenger.id {
            Some(&self.challenger)
        } else if player_id == self.challenged.id {
            Some(&self.challenged)
        } else {
            None
        }
    }

    /// True when the current turn has sat idle longer than `timeout`.
    pub fn turn_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.status == CombatStatus::Active && now - self.turn_started_at > timeout
    }

    /// Submit an action for the player holding the turn.
    ///
    /// Attacks resolve against the defender, consuming any stance the
    /// defender prepared on their previous turn. Block/Dodge store a stance
    /// for the opponent's next attack without touching health. Every
    /// accepted action appends exactly one turn and hands the turn to the
    /// opponent; a killing blow additionally finishes the combat.
    ///
    /// A submission by anyone other than the turn holder (including a
    /// non-participant) is rejected with `NotYourTurn` and changes nothing.
    pub fn submit(
        &mut self,
        player_id: PlayerId,
        action: CombatAction,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Turn, CombatError> {
        if self.status != CombatStatus::Active {
            return Err(CombatError::CombatNotActive);
        }
        if player_id != self.current_turn || !self.is_participant(player_id) {
            return Err(CombatError::NotYourTurn);
        }

        let acting_as_challenger = player_id == self.challenger.id;
        let turn_action = match action {
            CombatAction::Attack(kind) => {
                let (attacker, defender, defender_stance) = if acting_as_challenger {
                    (&self.challenger, &self.challenged, self.challenged_stance)
                } else {
                    (&self.challenged, &self.challenger, self.challenger_stance)
                };
                let outcome = resolve_attack(attacker, defender, kind, defender_stance, rng);

                if acting_as_challenger {
                    self.challenged_stance = None;
                    self.challenged.apply_damage(outcome.damage);
                } else {
                    self.challenger_stance = None;
                    self.challenger.apply_damage(outcome.damage);
                }

                TurnAction {
                    action,
                    damage: outcome.damage,
                    is_critical: outcome.is_critical,
                    is_blocked: outcome.is_blocked,
                    is_dodged: outcome.is_dodged,
                    effects: outcome.effects,
                }
            }
            CombatAction::Block | CombatAction::Dodge => {
                let stance = action.stance();
                if acting_as_challenger {
                    self.challenger_stance = stance;
                } else {
                    self.challenged_stance = stance;
                }
                TurnAction::stance_only(action)
            }
        };

        let turn = Turn {
            player_id,
            action: turn_action,
            timestamp: now,
        };
        self.turns.push(turn.clone());

        let defender = if acting_as_challenger {
            &self.challenged
        } else {
            &self.challenger
        };
        if !defender.is_alive {
            self.status = CombatStatus::Finished;
            self.winner = Some(player_id);
            self.ended_at = Some(now);
        }

        self.current_turn = if acting_as_challenger {
            self.challenged.id
        } else {
            self.challenger.id
        };
        self.turn_started_at = now;

        Ok(turn)
    }

    /// Finish the combat in the opponent's favor, without an attack.
    /// Used when a participant disconnects mid-duel.
    pub fn forfeit(&mut self, leaver: PlayerId, now: DateTime<Utc>) -> Result<(), CombatError> {
        if self.status != CombatStatus::Active {
            return Err(CombatError::CombatNotActive);
        }
        let Some(opponent) = self.opponent_of(leaver) else {
            return Err(CombatError::NotYourTurn);
        };
        self.status = CombatStatus::Finished;
        self.winner = Some(opponent);
        self.ended_at = Some(now);
        Ok(())
    }

    /// Performance summary for one side, used by the rewards math.
    pub fn stats_for(&self, player_id: PlayerId) -> CombatStats {
        let mut damage_dealt = 0;
        let mut turns_taken = 0;
        for turn in self.turns.iter().filter(|turn| turn.player_id == player_id) {
            damage_dealt += turn.action.damage;
            turns_taken += 1;
        }
        let ended = self.ended_at.unwrap_or(self.started_at);
        CombatStats {
            damage_dealt,
            turns_taken,
            duration_secs: (ended - self.started_at).num_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::action::AttackKind;
    use crate::combatant::StatBlock;

    /// Every percent roll lands at ~50, so no crit/dodge/block ever procs.
    fn no_proc_rng() -> StepRng {
        StepRng::new(u64::MAX / 2, 0)
    }

    fn duel() -> (CombatState, PlayerId, PlayerId) {
        let a = Combatant::from_stats(PlayerId::new(), "Aldric", StatBlock::default());
        let b = Combatant::from_stats(PlayerId::new(), "Berta", StatBlock::default());
        let (a_id, b_id) = (a.id, b.id);
        (CombatState::new(a, b, Utc::now()), a_id, b_id)
    }

    #[test]
    fn challenger_takes_the_first_turn() {
        let (combat, a, _) = duel();
        assert_eq!(combat.status, CombatStatus::Active);
        assert_eq!(combat.current_turn, a);
        assert!(combat.turns.is_empty());
    }

    #[test]
    fn accepted_actions_append_one_turn_and_alternate() {
        let (mut combat, a, b) = duel();
        let mut rng = no_proc_rng();
        let now = Utc::now();

        combat
            .submit(a, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
            .expect("challenger acts first");
        assert_eq!(combat.turns.len(), 1);
        assert_eq!(combat.current_turn, b);

        combat
            .submit(b, CombatAction::Block, now, &mut rng)
            .expect("turn passed to challenged");
        assert_eq!(combat.turns.len(), 2);
        assert_eq!(combat.current_turn, a);
    }

    #[test]
    fn out_of_turn_submission_changes_nothing() {
        let (mut combat, a, b) = duel();
        let before = combat.clone();

        let err = combat
            .submit(
                b,
                CombatAction::Attack(AttackKind::Normal),
                Utc::now(),
                &mut no_proc_rng(),
            )
            .expect_err("challenged must wait");

        assert_eq!(err, CombatError::NotYourTurn);
        assert_eq!(combat, before);
        assert_eq!(combat.current_turn, a);
    }

    #[test]
    fn non_participant_is_rejected() {
        let (mut combat, _, _) = duel();
        let err = combat
            .submit(
                PlayerId::new(),
                CombatAction::Attack(AttackKind::Normal),
                Utc::now(),
                &mut no_proc_rng(),
            )
            .expect_err("stranger cannot act");
        assert_eq!(err, CombatError::NotYourTurn);
    }

    #[test]
    fn stance_is_stored_then_consumed_by_the_next_attack() {
        let (mut combat, a, b) = duel();
        let mut rng = no_proc_rng();
        let now = Utc::now();

        combat
            .submit(a, CombatAction::Block, now, &mut rng)
            .expect("stance turn");
        assert_eq!(combat.challenger_stance, Some(Stance::Block));

        combat
            .submit(b, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
            .expect("attack into the stance");
        assert_eq!(combat.challenger_stance, None);
    }

    #[test]
    fn stance_turn_never_touches_health() {
        let (mut combat, a, _) = duel();
        combat
            .submit(a, CombatAction::Dodge, Utc::now(), &mut no_proc_rng())
            .expect("stance turn");
        assert_eq!(combat.challenger.health, 100);
        assert_eq!(combat.challenged.health, 100);
        assert_eq!(combat.turns[0].action.damage, 0);
    }

    #[test]
    fn killing_blow_finishes_the_combat() {
        let a = Combatant::from_stats(
            PlayerId::new(),
            "Aldric",
            StatBlock {
                attack: 60,
                defense: 0,
                speed: 5,
                max_health: 100,
                level: 1,
            },
        );
        let b = Combatant::from_stats(
            PlayerId::new(),
            "Berta",
            StatBlock {
                attack: 10,
                defense: 0,
                speed: 5,
                max_health: 100,
                level: 1,
            },
        );
        let (a_id, b_id) = (a.id, b.id);
        let mut combat = CombatState::new(a, b, Utc::now());
        let mut rng = no_proc_rng();
        let now = Utc::now();

        combat
            .submit(a_id, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
            .expect("first blow");
        combat
            .submit(b_id, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
            .expect("answer");
        combat
            .submit(a_id, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
            .expect("killing blow");

        assert_eq!(combat.status, CombatStatus::Finished);
        assert_eq!(combat.winner, Some(a_id));
        assert!(combat.ended_at.is_some());
        assert_eq!(combat.challenged.health, 0);
        assert!(!combat.challenged.is_alive);

        let err = combat
            .submit(
                b_id,
                CombatAction::Attack(AttackKind::Normal),
                now,
                &mut rng,
            )
            .expect_err("no actions after the end");
        assert_eq!(err, CombatError::CombatNotActive);
    }

    #[test]
    fn evenly_matched_duel_runs_to_the_end() {
        let (mut combat, a, b) = duel();
        let mut rng = no_proc_rng();
        let now = Utc::now();
        let mut challenged_healths = vec![combat.challenged.health];

        loop {
            combat
                .submit(a, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
                .expect("challenger attack");
            challenged_healths.push(combat.challenged.health);
            if combat.status == CombatStatus::Finished {
                break;
            }
            combat
                .submit(b, CombatAction::Attack(AttackKind::Normal), now, &mut rng)
                .expect("challenged attack");
            assert_eq!(combat.status, CombatStatus::Active, "challenger dies first");
        }

        // Challenger swings first, so with identical stats the challenged falls.
        assert_eq!(combat.winner, Some(a));
        assert!(challenged_healths.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(combat.challenged.health, 0);
    }

    #[test]
    fn forfeit_awards_the_remaining_player() {
        let (mut combat, a, b) = duel();
        let now = Utc::now();

        combat.forfeit(b, now).expect("leaver forfeits");
        assert_eq!(combat.status, CombatStatus::Finished);
        assert_eq!(combat.winner, Some(a));
        assert_eq!(combat.ended_at, Some(now));

        let err = combat.forfeit(a, now).expect_err("already over");
        assert_eq!(err, CombatError::CombatNotActive);
    }

    #[test]
    fn idle_turn_expires_after_the_timeout() {
        let (mut combat, a, _) = duel();
        let timeout = Duration::seconds(30);

        assert!(!combat.turn_expired(combat.started_at + Duration::seconds(29), timeout));
        assert!(combat.turn_expired(combat.started_at + Duration::seconds(31), timeout));

        let acted_at = combat.started_at + Duration::seconds(10);
        combat
            .submit(
                a,
                CombatAction::Attack(AttackKind::Normal),
                acted_at,
                &mut no_proc_rng(),
            )
            .expect("attack resets the turn clock");
        assert!(!combat.turn_expired(acted_at + Duration::seconds(29), timeout));
    }

    #[test]
    fn stats_track_damage_per_side() {
        let (mut combat, a, b) = duel();
        let mut rng = no_proc_rng();
        let start = combat.started_at;

        combat
            .submit(
                a,
                CombatAction::Attack(AttackKind::Normal),
                start + Duration::seconds(5),
                &mut rng,
            )
            .expect("attack");
        combat
            .submit(b, CombatAction::Block, start + Duration::seconds(10), &mut rng)
            .expect("block");

        let stats = combat.stats_for(a);
        assert_eq!(stats.damage_dealt, 10);
        assert_eq!(stats.turns_taken, 1);

        let stats_b = combat.stats_for(b);
        assert_eq!(stats_b.damage_dealt, 0);
        assert_eq!(stats_b.turns_taken, 1, "the block is the challenged side's only turn");
    }
}
