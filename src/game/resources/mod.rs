//! Game session resources - the state the turn coordinator owns
//!
//! Each resource is a plain struct held by exactly one owner. Nothing here
//! talks to the engine or knows about turns; the coordinator composes these
//! into the session's state machine.
//!
//! # Resource Categories
//!
//! ## Game Record
//! - [`PositionStore`] - Authoritative position, history and repetition keys
//! - [`MoveHistory`] - Ordered move record with SAN and move descriptions
//!
//! ## Turn Management
//! - [`TurnStateContext`] - Turn flow state machine
//! - [`TurnPhase`] - Idle, AwaitingEngine, Terminal
//!
//! ## Player Interaction
//! - [`Selection`] - Selected square, highlighted destinations, square styles
//!
//! ## Game Timing
//! - [`GameClock`] - Fischer increment clock reported to the engine
//!
//! ## Game Status
//! - [`TerminalStatus`] - Checkmate or draw reason
//! - [`GameOverBanner`] - Frozen result announced once per game
//!
//! # Ownership
//!
//! ```text
//! TurnCoordinator ── PositionStore ── MoveHistory
//!                 ├─ GameClock
//!                 ├─ TurnStateContext
//!                 └─ GameOverBanner
//! GameSession ───── Selection
//! ```

pub mod game_over;
pub mod history;
pub mod position;
pub mod selection;
pub mod timer;
pub mod turn_state;

#[cfg(test)]
mod tests;

// Re-export all resources for convenience
pub use game_over::*;
pub use history::*;
pub use position::*;
pub use selection::*;
pub use timer::*;
pub use turn_state::*;
