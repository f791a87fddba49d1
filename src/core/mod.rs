//! Core module - Session infrastructure shared by every game component
//!
//! Holds the pieces of the application that are not chess logic themselves:
//! configuration loading, error types for the infrastructure layer and the
//! tracing subscriber setup.
//!
//! # Module Organization
//!
//! - `config` - [`SessionConfig`] with engine, time control and search settings
//! - `error` - [`ConfigError`] and the [`ConfigResult`] alias
//! - `logging` - [`init_tracing`] for binaries and tests
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use xfchess_session::core::{init_tracing, SessionConfig};
//!
//! init_tracing();
//! let config = SessionConfig::load_or_default();
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use config::{EngineCommand, SearchLimit, SessionConfig, TimeControl};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_tracing;
