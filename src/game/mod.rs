//! Game session module - human vs engine play against one rules authority
//!
//! Everything that decides what happens on the board lives here. Presentation
//! talks to [`session::GameSession`]; the session delegates to the turn
//! coordinator, which is the only writer of game state.
//!
//! # Module Organization
//!
//! - `rules` - Rules oracle over `shakmaty` (legality, results, FEN)
//! - `resources` - Position store, history, clock, selection, turn phase, banner
//! - `engine` - UCI protocol, channel transport and the engine bridge
//! - `coordinator` - Turn state machine tying store, clock and engine together
//! - `session` - Facade exposing render state and action entry points
//! - `error` - [`SessionError`] and the [`SessionResult`] alias
//!
//! # Data Flow
//!
//! ```text
//! click/drop ─▶ GameSession ─▶ Selection (read-only queries)
//!                          └─▶ TurnCoordinator ─▶ PositionStore (oracle-validated)
//!                                             └─▶ EngineBridge ─▶ engine process
//! engine line ─▶ EngineBridge ─▶ TurnCoordinator ─▶ PositionStore
//! ```

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod resources;
pub mod rules;
pub mod session;

pub use coordinator::{EngineReaction, TurnCoordinator};
pub use error::{SessionError, SessionResult};
pub use session::{BoardProps, GameSession, RenderState, SessionEvent, TurnIndicator};
