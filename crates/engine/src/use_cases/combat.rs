//! Turn resolution, settlement and reward payout for running combats.

use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::sync::Mutex;

use taberna_domain::{
    calculate_rewards, xp_loss, AttackKind, Challenge, CombatAction, CombatError, CombatId,
    CombatState, CombatStatus, PlayerId, ITEM_LEVEL_MARGIN,
};
use taberna_protocol::ServerMessage;

use crate::api::connections::ConnectionManager;
use crate::infrastructure::ports::{ClockPort, ItemCatalogPort, ProgressionPort};
use crate::stores::{CombatStore, PlayerRegistry};
use crate::use_cases::broadcast_roster;

#[derive(Debug, Error)]
pub enum CombatServiceError {
    #[error("combat not found")]
    UnknownCombat,
    #[error(transparent)]
    Combat(#[from] CombatError),
}

/// Runs duels from the opening turn through reward payout.
///
/// All dice share one seeded generator; locking order is rng first, then the
/// combat store, everywhere.
pub struct CombatService {
    players: Arc<PlayerRegistry>,
    combats: Arc<CombatStore>,
    connections: Arc<ConnectionManager>,
    catalog: Arc<dyn ItemCatalogPort>,
    progression: Arc<dyn ProgressionPort>,
    clock: Arc<dyn ClockPort>,
    turn_timeout: Duration,
    rng: Mutex<StdRng>,
}

impl CombatService {
    pub fn new(
        players: Arc<PlayerRegistry>,
        combats: Arc<CombatStore>,
        connections: Arc<ConnectionManager>,
        catalog: Arc<dyn ItemCatalogPort>,
        progression: Arc<dyn ProgressionPort>,
        clock: Arc<dyn ClockPort>,
        turn_timeout: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            players,
            combats,
            connections,
            catalog,
            progression,
            clock,
            turn_timeout,
            rng: Mutex::new(rng),
        }
    }

    /// Open a combat from an accepted challenge and show both fighters the
    /// starting state.
    pub async fn start(&self, challenge: Challenge) {
        let state = CombatState::new(challenge.challenger, challenge.challenged, self.clock.now());
        self.players.set_in_combat(state.challenger.id, true).await;
        self.players.set_in_combat(state.challenged.id, true).await;
        self.combats.insert(state.clone()).await;
        tracing::info!(
            combat_id = %state.id,
            challenger = %state.challenger.id,
            challenged = %state.challenged.id,
            "Combat started"
        );
        self.broadcast_state(&state).await;
        broadcast_roster(&self.players, &self.connections).await;
    }

    /// Resolve one action for the player whose turn it is.
    pub async fn submit_action(
        &self,
        player: PlayerId,
        combat_id: CombatId,
        action: CombatAction,
    ) -> Result<(), CombatServiceError> {
        let now = self.clock.now();
        // A submitted action is proof of life, whatever the turn says.
        self.players.touch(player, now).await;
        let outcome = {
            let mut rng = self.rng.lock().await;
            self.combats
                .update(combat_id, |state| {
                    state
                        .submit(player, action, now, &mut *rng)
                        .map(|turn| (turn, state.clone()))
                })
                .await
        };
        let (turn, state) = outcome.ok_or(CombatServiceError::UnknownCombat)??;
        tracing::debug!(
            combat_id = %combat_id,
            player = %player,
            damage = turn.action.damage,
            "Turn resolved"
        );
        self.broadcast_state(&state).await;
        if state.status == CombatStatus::Finished {
            self.settle(state).await;
        }
        Ok(())
    }

    /// Auto-attack on behalf of players who sat on their turn too long.
    /// Runs on the background sweep cadence.
    pub async fn sweep_turn_timeouts(&self) {
        let now = self.clock.now();
        for combat_id in self.combats.active_ids().await {
            let timed_out = {
                let mut rng = self.rng.lock().await;
                self.combats
                    .update(combat_id, |state| {
                        if !state.turn_expired(now, self.turn_timeout) {
                            return None;
                        }
                        let idler = state.current_turn;
                        state
                            .submit(idler, CombatAction::Attack(AttackKind::Normal), now, &mut *rng)
                            .ok()
                            .map(|_| (idler, state.clone()))
                    })
                    .await
                    .flatten()
            };
            let Some((idler, state)) = timed_out else {
                continue;
            };
            tracing::info!(combat_id = %combat_id, player = %idler, "Turn timed out, auto-attacking");
            self.broadcast_state(&state).await;
            if state.status == CombatStatus::Finished {
                self.settle(state).await;
            }
        }
    }

    /// Concede the fight for a departing player. The opponent wins on the
    /// spot; a combat already over is left untouched.
    pub async fn forfeit(&self, player: PlayerId) {
        let Some(combat_id) = self.combats.combat_for(player).await else {
            return;
        };
        let now = self.clock.now();
        let finished = self
            .combats
            .update(combat_id, |state| {
                state.forfeit(player, now).is_ok().then(|| state.clone())
            })
            .await
            .flatten();
        let Some(state) = finished else {
            return;
        };
        tracing::info!(combat_id = %combat_id, leaver = %player, "Combat forfeited");
        self.broadcast_state(&state).await;
        self.settle(state).await;
    }

    pub async fn is_fighting(&self, player: PlayerId) -> bool {
        self.combats.is_fighting(player).await
    }

    async fn broadcast_state(&self, state: &CombatState) {
        for combatant in [&state.challenger, &state.challenged] {
            let message = ServerMessage::CombatStateUpdate {
                combat_state: state.into(),
                is_your_turn: state.status == CombatStatus::Active
                    && state.current_turn == combatant.id,
            };
            self.connections.send_to_player(combatant.id, message).await;
        }
    }

    /// Pay out rewards, hand the result to progression and release both
    /// fighters.
    async fn settle(&self, state: CombatState) {
        let Some(winner_id) = state.winner else {
            return;
        };
        let (winner, loser) = if state.challenger.id == winner_id {
            (&state.challenger, &state.challenged)
        } else {
            (&state.challenged, &state.challenger)
        };

        let stats = state.stats_for(winner_id);
        // Loot may sit a little above the winner's level.
        let eligible = self
            .catalog
            .eligible_items(winner.level + ITEM_LEVEL_MARGIN)
            .await;
        let rewards = {
            let mut rng = self.rng.lock().await;
            calculate_rewards(winner, loser, &stats, &eligible, &mut *rng)
        };
        let loss = xp_loss(loser, rewards.penalties.level_difference);

        let message = ServerMessage::CombatRewards {
            combat_id: state.id.to_uuid(),
            winner_id: winner_id.to_uuid(),
            rewards: (&rewards).into(),
            xp_loss: loss,
        };
        for combatant in [&state.challenger, &state.challenged] {
            self.connections
                .send_to_player(combatant.id, message.clone())
                .await;
        }

        if let Err(e) = self
            .progression
            .record_combat_result(winner_id, loser.id, rewards, loss)
            .await
        {
            tracing::warn!(combat_id = %state.id, error = %e, "Failed to record combat result");
        }

        self.players.set_in_combat(state.challenger.id, false).await;
        self.players.set_in_combat(state.challenged.id, false).await;
        self.combats.remove(state.id).await;
        broadcast_roster(&self.players, &self.connections).await;
        tracing::info!(combat_id = %state.id, winner = %winner_id, "Combat settled");
    }
}
