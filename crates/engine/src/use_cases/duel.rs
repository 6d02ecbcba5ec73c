//! Challenge lifecycle: issuing, answering and expiring duel requests.

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use taberna_domain::{Challenge, ChallengeId, PlayerId};
use taberna_protocol::ServerMessage;

use crate::api::connections::ConnectionManager;
use crate::infrastructure::ports::ClockPort;
use crate::stores::{ChallengeStore, PlayerRegistry};
use crate::use_cases::combat::CombatService;

#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("target player is not in the tavern")]
    UnknownTarget,
    #[error("players cannot challenge themselves")]
    SelfChallenge,
    #[error("a challenge between these players is already pending")]
    ChallengePending,
    #[error("player is already fighting")]
    PlayerBusy,
    #[error("challenge not found, expired, or already resolved")]
    UnknownChallenge,
}

/// Brokers duel requests between players.
///
/// Combatant stats are snapshotted when the challenge is issued, so the fight
/// that follows uses the numbers both players agreed to.
pub struct DuelService {
    players: Arc<PlayerRegistry>,
    challenges: Arc<ChallengeStore>,
    combats: Arc<CombatService>,
    connections: Arc<ConnectionManager>,
    clock: Arc<dyn ClockPort>,
    challenge_ttl: Duration,
}

impl DuelService {
    pub fn new(
        players: Arc<PlayerRegistry>,
        challenges: Arc<ChallengeStore>,
        combats: Arc<CombatService>,
        connections: Arc<ConnectionManager>,
        clock: Arc<dyn ClockPort>,
        challenge_ttl: Duration,
    ) -> Self {
        Self {
            players,
            challenges,
            combats,
            connections,
            clock,
            challenge_ttl,
        }
    }

    /// Issue a challenge from `challenger` to `target` and notify the target.
    pub async fn challenge(
        &self,
        challenger: PlayerId,
        target: PlayerId,
    ) -> Result<ChallengeId, ChallengeError> {
        if challenger == target {
            return Err(ChallengeError::SelfChallenge);
        }
        // A duel request is proof of life from its sender.
        self.players.touch(challenger, self.clock.now()).await;
        let Some(target_record) = self.players.get(target).await else {
            return Err(ChallengeError::UnknownTarget);
        };
        let Some(challenger_record) = self.players.get(challenger).await else {
            return Err(ChallengeError::UnknownTarget);
        };
        if self.combats.is_fighting(challenger).await || self.combats.is_fighting(target).await {
            return Err(ChallengeError::PlayerBusy);
        }

        let challenge = Challenge::new(
            challenger_record.snapshot(),
            target_record.snapshot(),
            self.clock.now(),
        );
        let challenge_id = challenge.id;
        let notification = ServerMessage::CombatChallenge {
            challenge: (&challenge).into(),
        };
        if !self.challenges.try_insert(challenge) {
            return Err(ChallengeError::ChallengePending);
        }

        self.connections.send_to_player(target, notification).await;
        tracing::info!(
            challenge_id = %challenge_id,
            challenger = %challenger,
            target = %target,
            "Challenge issued"
        );
        Ok(challenge_id)
    }

    /// Resolve a pending challenge. Only the challenged player may answer;
    /// acceptance starts the combat, refusal notifies the challenger.
    pub async fn respond(
        &self,
        responder: PlayerId,
        challenge_id: ChallengeId,
        accepted: bool,
    ) -> Result<(), ChallengeError> {
        self.players.touch(responder, self.clock.now()).await;
        let Some(challenge) = self.challenges.take(challenge_id) else {
            return Err(ChallengeError::UnknownChallenge);
        };
        if challenge.challenged.id != responder {
            // Not theirs to answer; leave it pending for the right player.
            self.challenges.try_insert(challenge);
            return Err(ChallengeError::UnknownChallenge);
        }

        let challenger = challenge.challenger.id;
        if challenge.is_expired(self.clock.now(), self.challenge_ttl) {
            self.connections
                .send_to_player(
                    challenger,
                    ServerMessage::ChallengeExpired {
                        challenge_id: challenge_id.to_uuid(),
                    },
                )
                .await;
            return Err(ChallengeError::UnknownChallenge);
        }

        if !accepted {
            self.connections
                .send_to_player(
                    challenger,
                    ServerMessage::ChallengeDeclined {
                        challenge_id: challenge_id.to_uuid(),
                    },
                )
                .await;
            tracing::info!(challenge_id = %challenge_id, responder = %responder, "Challenge declined");
            return Ok(());
        }

        // Either side may have started another fight while this sat pending.
        // The invitation is void now, so the challenger hears the same
        // notice the TTL sweep would have sent.
        if self.combats.is_fighting(challenger).await || self.combats.is_fighting(responder).await {
            self.connections
                .send_to_player(
                    challenger,
                    ServerMessage::ChallengeExpired {
                        challenge_id: challenge_id.to_uuid(),
                    },
                )
                .await;
            return Err(ChallengeError::PlayerBusy);
        }
        self.combats.start(challenge).await;
        Ok(())
    }

    /// Drop challenges older than the TTL and tell their challengers.
    /// Runs on the background sweep cadence.
    pub async fn sweep_expired(&self) {
        let expired = self
            .challenges
            .remove_expired(self.clock.now(), self.challenge_ttl);
        for challenge in expired {
            tracing::debug!(
                challenge_id = %challenge.id,
                challenger = %challenge.challenger.id,
                "Challenge expired"
            );
            self.connections
                .send_to_player(
                    challenge.challenger.id,
                    ServerMessage::ChallengeExpired {
                        challenge_id: challenge.id.to_uuid(),
                    },
                )
                .await;
        }
    }

    /// Void every challenge involving a departing player and notify the
    /// other party.
    pub async fn discard_for(&self, player: PlayerId) {
        for challenge in self.challenges.take_involving(player) {
            let other = if challenge.challenger.id == player {
                challenge.challenged.id
            } else {
                challenge.challenger.id
            };
            self.connections
                .send_to_player(
                    other,
                    ServerMessage::ChallengeExpired {
                        challenge_id: challenge.id.to_uuid(),
                    },
                )
                .await;
        }
    }
}
