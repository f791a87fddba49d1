//! XFChess game session
//!
//! A human-vs-engine game coordinator: one authoritative game record, a UCI
//! engine driven over two asynchronous channels, a Fischer clock, and
//! render-ready state for whatever draws the board.
//!
//! # Module Organization
//!
//! - `core` - Configuration, infrastructure errors, tracing setup
//! - `game` - Rules, resources, engine bridge, turn coordinator, session facade
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use xfchess_session::{init_tracing, GameSession, SessionConfig};
//!
//! init_tracing();
//! let mut session = GameSession::with_process_engine(SessionConfig::load_or_default())?;
//! session.next_event().await; // engine handshake and first move arrive here
//! ```

pub mod core;
pub mod game;

pub use crate::core::{init_tracing, SessionConfig};
pub use game::{GameSession, SessionError, SessionEvent, SessionResult};
