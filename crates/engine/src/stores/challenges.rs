//! Pending duel invitations.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use taberna_domain::{Challenge, ChallengeId, PlayerId};

/// Unordered player pair, so A->B and B->A collide on the same key.
fn pair_key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a.as_uuid() <= b.as_uuid() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Challenges waiting for an answer, with a same-pair uniqueness index.
pub struct ChallengeStore {
    challenges: DashMap<ChallengeId, Challenge>,
    by_pair: DashMap<(PlayerId, PlayerId), ChallengeId>,
}

impl ChallengeStore {
    pub fn new() -> Self {
        Self {
            challenges: DashMap::new(),
            by_pair: DashMap::new(),
        }
    }

    /// Store a challenge unless one is already pending between the same two
    /// players, in either direction. Returns false on the duplicate.
    pub fn try_insert(&self, challenge: Challenge) -> bool {
        let key = pair_key(challenge.challenger.id, challenge.challenged.id);
        match self.by_pair.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(challenge.id);
                self.challenges.insert(challenge.id, challenge);
                true
            }
        }
    }

    pub fn get(&self, id: ChallengeId) -> Option<Challenge> {
        self.challenges.get(&id).map(|entry| entry.value().clone())
    }

    /// Remove and return a challenge, freeing the pair for a new one.
    pub fn take(&self, id: ChallengeId) -> Option<Challenge> {
        let (_, challenge) = self.challenges.remove(&id)?;
        let key = pair_key(challenge.challenger.id, challenge.challenged.id);
        self.by_pair.remove_if(&key, |_, pending| *pending == id);
        Some(challenge)
    }

    pub fn has_pending_between(&self, a: PlayerId, b: PlayerId) -> bool {
        self.by_pair.contains_key(&pair_key(a, b))
    }

    /// Remove and return every challenge older than `ttl`.
    pub fn remove_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<Challenge> {
        let expired: Vec<ChallengeId> = self
            .challenges
            .iter()
            .filter(|entry| entry.value().is_expired(now, ttl))
            .map(|entry| *entry.key())
            .collect();
        expired.into_iter().filter_map(|id| self.take(id)).collect()
    }

    /// Remove and return every challenge the player is a side of.
    /// Used when a player leaves the tavern.
    pub fn take_involving(&self, player: PlayerId) -> Vec<Challenge> {
        let involved: Vec<ChallengeId> = self
            .challenges
            .iter()
            .filter(|entry| {
                let c = entry.value();
                c.challenger.id == player || c.challenged.id == player
            })
            .map(|entry| *entry.key())
            .collect();
        involved.into_iter().filter_map(|id| self.take(id)).collect()
    }

    pub fn count(&self) -> usize {
        self.challenges.len()
    }
}

impl Default for ChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}
