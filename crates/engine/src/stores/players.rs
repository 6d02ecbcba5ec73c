//! Roster of joined players.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use taberna_domain::{Combatant, ConnectionId, PlayerId, StatBlock};

/// A joined player as the lobby sees them.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub connection_id: ConnectionId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub direction: String,
    pub stats: StatBlock,
    pub in_combat: bool,
    pub joined_at: DateTime<Utc>,
    /// Refreshed by every message from the player; drives the idle sweep.
    pub last_seen: DateTime<Utc>,
}

impl PlayerRecord {
    /// Stat snapshot handed to the combat core at challenge time.
    pub fn snapshot(&self) -> Combatant {
        Combatant::from_stats(self.id, self.name.clone(), self.stats)
    }
}

#[derive(Default)]
struct Roster {
    players: HashMap<PlayerId, PlayerRecord>,
    by_connection: HashMap<ConnectionId, PlayerId>,
}

/// Everyone currently in the tavern, indexed by player and by connection.
pub struct PlayerRegistry {
    inner: RwLock<Roster>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Roster::default()),
        }
    }

    pub async fn insert(&self, record: PlayerRecord) {
        let mut inner = self.inner.write().await;
        inner.by_connection.insert(record.connection_id, record.id);
        inner.players.insert(record.id, record);
    }

    pub async fn get(&self, id: PlayerId) -> Option<PlayerRecord> {
        let inner = self.inner.read().await;
        inner.players.get(&id).cloned()
    }

    pub async fn by_connection(&self, connection_id: ConnectionId) -> Option<PlayerRecord> {
        let inner = self.inner.read().await;
        let id = inner.by_connection.get(&connection_id)?;
        inner.players.get(id).cloned()
    }

    pub async fn remove(&self, id: PlayerId) -> Option<PlayerRecord> {
        let mut inner = self.inner.write().await;
        let record = inner.players.remove(&id)?;
        inner.by_connection.remove(&record.connection_id);
        Some(record)
    }

    pub async fn remove_by_connection(&self, connection_id: ConnectionId) -> Option<PlayerRecord> {
        let mut inner = self.inner.write().await;
        let id = inner.by_connection.remove(&connection_id)?;
        inner.players.remove(&id)
    }

    /// Update position and facing; `direction` is kept when `None`.
    /// Returns false for players no longer in the roster.
    pub async fn update_position(
        &self,
        id: PlayerId,
        x: f64,
        y: f64,
        direction: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.players.get_mut(&id) else {
            return false;
        };
        record.x = x;
        record.y = y;
        if let Some(direction) = direction {
            record.direction = direction;
        }
        record.last_seen = now;
        true
    }

    /// Refresh the liveness timestamp.
    pub async fn touch(&self, id: PlayerId, now: DateTime<Utc>) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.players.get_mut(&id) {
            record.last_seen = now;
        }
    }

    pub async fn set_in_combat(&self, id: PlayerId, in_combat: bool) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.players.get_mut(&id) {
            record.in_combat = in_combat;
        }
    }

    /// Current roster in join order.
    pub async fn roster(&self) -> Vec<PlayerRecord> {
        let inner = self.inner.read().await;
        let mut records: Vec<PlayerRecord> = inner.players.values().cloned().collect();
        records.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        records
    }

    /// Players whose last activity is older than `timeout`.
    pub async fn idle_players(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<PlayerId> {
        let inner = self.inner.read().await;
        inner
            .players
            .values()
            .filter(|record| now - record.last_seen > timeout)
            .map(|record| record.id)
            .collect()
    }

    pub async fn count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.players.len()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
