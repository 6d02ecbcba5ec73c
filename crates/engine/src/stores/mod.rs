//! In-memory game state, one store per concern.
//!
//! - `PlayerRegistry` - everyone currently in the tavern
//! - `ChallengeStore` - pending duel invitations
//! - `CombatStore` - live combat sessions
//!
//! Each store owns its maps outright; nothing else in the engine holds
//! shared mutable game state. Callers get clones out, never references in.

pub mod challenges;
pub mod combats;
pub mod players;

// Re-export store types
pub use challenges::ChallengeStore;
pub use combats::CombatStore;
pub use players::{PlayerRecord, PlayerRegistry};
