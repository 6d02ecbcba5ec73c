//! Application state and composition.

use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;

use crate::api::connections::ConnectionManager;
use crate::infrastructure::ports::{ClockPort, ItemCatalogPort, ProgressionPort};
use crate::stores::{ChallengeStore, CombatStore, PlayerRegistry};
use crate::use_cases::{CombatService, DuelService, LobbyService};

/// Timing knobs for the tavern, all in wall-clock terms.
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    /// How long a challenge waits for an answer.
    pub challenge_ttl: Duration,
    /// How long a fighter may sit on their turn before the auto-attack.
    pub turn_timeout: Duration,
    /// How long a silent player stays in the roster.
    pub idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            challenge_ttl: env_secs("CHALLENGE_TTL_SECS", 30),
            turn_timeout: env_secs("TURN_TIMEOUT_SECS", 30),
            idle_timeout: env_secs("IDLE_TIMEOUT_SECS", 60),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            challenge_ttl: Duration::seconds(30),
            turn_timeout: Duration::seconds(30),
            idle_timeout: Duration::seconds(60),
        }
    }
}

fn env_secs(key: &str, default: i64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default);
    Duration::seconds(secs)
}

/// Main application state.
///
/// Holds the shared stores and use cases. Passed to HTTP/WebSocket handlers
/// via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub players: Arc<PlayerRegistry>,
    pub challenges: Arc<ChallengeStore>,
    pub combats: Arc<CombatStore>,
    pub connections: Arc<ConnectionManager>,
}

/// Container for all use cases.
pub struct UseCases {
    pub lobby: Arc<LobbyService>,
    pub duel: Arc<DuelService>,
    pub combat: Arc<CombatService>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        config: AppConfig,
        connections: Arc<ConnectionManager>,
        clock: Arc<dyn ClockPort>,
        catalog: Arc<dyn ItemCatalogPort>,
        progression: Arc<dyn ProgressionPort>,
        rng: StdRng,
    ) -> Self {
        let players = Arc::new(PlayerRegistry::new());
        let challenges = Arc::new(ChallengeStore::new());
        let combats = Arc::new(CombatStore::new());

        let combat = Arc::new(CombatService::new(
            players.clone(),
            combats.clone(),
            connections.clone(),
            catalog,
            progression,
            clock.clone(),
            config.turn_timeout,
            rng,
        ));
        let duel = Arc::new(DuelService::new(
            players.clone(),
            challenges.clone(),
            combat.clone(),
            connections.clone(),
            clock.clone(),
            config.challenge_ttl,
        ));
        let lobby = Arc::new(LobbyService::new(
            players.clone(),
            connections.clone(),
            duel.clone(),
            combat.clone(),
            clock,
            config.idle_timeout,
        ));

        Self {
            use_cases: UseCases {
                lobby,
                duel,
                combat,
            },
            players,
            challenges,
            combats,
            connections,
        }
    }
}
