//! Taberna Engine library.
//!
//! This crate contains all server-side code for the Taberna tavern server.
//!
//! ## Structure
//!
//! - `stores/` - In-memory player, challenge and combat session state
//! - `use_cases/` - Lobby, duel and combat orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
