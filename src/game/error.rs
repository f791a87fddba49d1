//! Error types for game module
//!
//! Covers move validation, turn ordering and the engine conversation. Only
//! the first three variants ever reach presentation callers; the engine-side
//! variants are logged and swallowed by the turn coordinator.

use shakmaty::Square;

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The rules oracle refused the move; nothing changed
    #[error("Illegal move: {from}{to}")]
    IllegalMoveRejected { from: Square, to: Square },

    /// A human move was attempted while the engine owns the turn
    #[error("Not the human player's turn")]
    NotHumanTurn,

    /// The game reached a terminal state; only reset is accepted
    #[error("Game is over")]
    GameOver,

    /// Engine emitted a line that could not be understood
    #[error("Engine protocol anomaly: {line}")]
    EngineProtocolAnomaly { line: String },

    /// Engine proposed a move that is malformed or illegal in the current position
    #[error("Engine proposed an invalid move: {token}")]
    EngineMoveInvalid { token: String },

    /// Engine output belonging to a previous game
    #[error("Stale engine reply from generation {generation} (current {current})")]
    StaleReply { generation: u64, current: u64 },

    /// Engine process could not be launched or its pipes opened
    #[error("Failed to start engine: {0}")]
    EngineSpawn(#[from] std::io::Error),

    /// Start position could not be parsed
    #[error("Invalid position: {message}")]
    InvalidPosition { message: String },

    /// Session configuration failed validation
    #[error("Invalid session configuration: {0}")]
    Config(#[from] crate::core::error::ConfigError),
}

/// Result type alias for game operations
pub type SessionResult<T> = Result<T, SessionError>;
