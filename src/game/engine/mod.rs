//! External engine integration
//!
//! Talks UCI to an external engine over two independent channels: one that
//! searches for moves and one that evaluates positions. Engine output is
//! untrusted input; nothing in this module touches game state.
//!
//! # Module Structure
//!
//! - `protocol` - Command rendering and reply-line parsing
//! - `status` - Handshake flags and search telemetry for display
//! - `transport` - Reader/writer tasks, handshake backlog, connectors
//! - `bridge` - The two channels plus generation filtering

pub mod bridge;
pub mod protocol;
pub mod status;
pub mod transport;

pub use bridge::{BridgeOutcome, EngineBridge};
pub use protocol::{parse_line, EngineLine, GoParams, SearchInfo, UciCommand};
pub use status::{EngineStatus, Score, ScoreBound, ScoreKind, SearchSummary};
pub use transport::{
    ChannelKind, EngineConnector, EngineEvent, EngineIo, EngineReader, EngineWriter,
    ProcessConnector,
};
