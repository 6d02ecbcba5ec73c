//! Live combat sessions.

use std::collections::HashMap;

use tokio::sync::RwLock;

use taberna_domain::{CombatId, CombatState, CombatStatus, PlayerId};

#[derive(Default)]
struct Sessions {
    combats: HashMap<CombatId, CombatState>,
    by_player: HashMap<PlayerId, CombatId>,
}

/// All combats that have started and not yet been settled.
pub struct CombatStore {
    inner: RwLock<Sessions>,
}

impl CombatStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Sessions::default()),
        }
    }

    pub async fn insert(&self, state: CombatState) {
        let mut inner = self.inner.write().await;
        inner.by_player.insert(state.challenger.id, state.id);
        inner.by_player.insert(state.challenged.id, state.id);
        inner.combats.insert(state.id, state);
    }

    pub async fn get(&self, id: CombatId) -> Option<CombatState> {
        let inner = self.inner.read().await;
        inner.combats.get(&id).cloned()
    }

    pub async fn combat_for(&self, player: PlayerId) -> Option<CombatId> {
        let inner = self.inner.read().await;
        inner.by_player.get(&player).copied()
    }

    pub async fn is_fighting(&self, player: PlayerId) -> bool {
        let inner = self.inner.read().await;
        inner.by_player.contains_key(&player)
    }

    pub async fn active_ids(&self) -> Vec<CombatId> {
        let inner = self.inner.read().await;
        inner
            .combats
            .values()
            .filter(|state| state.status == CombatStatus::Active)
            .map(|state| state.id)
            .collect()
    }

    /// Run `f` against the stored state under the write lock, so validating
    /// and applying a turn is one atomic step.
    pub async fn update<T>(
        &self,
        id: CombatId,
        f: impl FnOnce(&mut CombatState) -> T,
    ) -> Option<T> {
        let mut inner = self.inner.write().await;
        inner.combats.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: CombatId) -> Option<CombatState> {
        let mut inner = self.inner.write().await;
        let state = inner.combats.remove(&id)?;
        for player in [state.challenger.id, state.challenged.id] {
            if inner.by_player.get(&player) == Some(&id) {
                inner.by_player.remove(&player);
            }
        }
        Some(state)
    }
}

impl Default for CombatStore {
    fn default() -> Self {
        Self::new()
    }
}
