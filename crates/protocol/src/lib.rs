//! Taberna Protocol - Wire types for client and engine communication
//!
//! Everything that crosses the WebSocket lives here:
//! - The `{"type": ..., "data": ...}` message envelopes (ClientMessage, ServerMessage)
//! - Wire-format DTOs mirroring domain state for transmission
//! - Error codes sent to clients
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types and serialization
//! 2. **Raw `uuid::Uuid` on the wire** - domain ID types stay server-side
//! 3. **camelCase envelopes** - matching what the browser client speaks

pub mod dto;
pub mod messages;

pub use dto::{
    ChallengeDto, CombatActionDto, CombatStateDto, CombatStatusDto, CombatantDto, ItemDropDto,
    PenaltiesDto, PlayerDto, RewardsDto, TurnActionDto, TurnDto,
};
pub use messages::{ClientMessage, ErrorCode, ServerMessage};
