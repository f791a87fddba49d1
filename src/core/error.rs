//! Error types for core module
//!
//! Provides custom error types for session infrastructure: reading and
//! validating the session configuration file.

use thiserror::Error;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file I/O error
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config serialization/deserialization error
    #[error("Config serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but describes an unusable session
    #[error("Invalid session config: {message}")]
    Invalid { message: String },
}

/// Result type alias for core operations
pub type ConfigResult<T> = Result<T, ConfigError>;
