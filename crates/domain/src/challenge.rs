//! Duel invitations
//!
//! A challenge freezes both players' stats at the moment it is issued, so
//! the duel that follows uses the stats the challenger saw. Challenges are
//! short-lived; an expired one can no longer be accepted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::ids::ChallengeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub challenger: Combatant,
    pub challenged: Combatant,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(challenger: Combatant, challenged: Combatant, now: DateTime<Utc>) -> Self {
        Self {
            id: ChallengeId::new(),
            challenger,
            challenged,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}
