//! Session configuration
//!
//! Describes which side the engine plays, how to launch it, the clock budgets
//! handed to it and an optional fixed search limit. Loaded from `session.json`
//! in the user's configuration directory, falling back to defaults.
//!
//! # Defaults
//!
//! The engine plays White and the human plays Black. Both sides start with
//! 3 seconds and a 1.5 second increment, which keeps engine replies snappy.
//!
//! # File Location
//!
//! E.g. `~/.config/XFChess/session.json` on Linux. The file is only ever read;
//! games themselves are never written to disk.

use crate::core::error::{ConfigError, ConfigResult};
use crate::game::rules::{self, Side};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config filename
const CONFIG_FILENAME: &str = "session.json";

/// Complete configuration for one game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side controlled by the engine; the human plays the other one
    pub engine_side: Side,
    /// How to launch the external engine process
    pub engine: EngineCommand,
    /// Clock budgets reported to the engine
    pub time_control: TimeControl,
    /// Fixed depth/node budget. When set, the clock is bypassed entirely.
    pub search: SearchLimit,
    /// Optional FEN to start from instead of the standard initial position
    pub start_position: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine_side: Side::White,
            engine: EngineCommand::default(),
            time_control: TimeControl::default(),
            search: SearchLimit::default(),
            start_position: None,
        }
    }
}

/// Engine executable and its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for EngineCommand {
    fn default() -> Self {
        Self {
            program: "stockfish".to_string(),
            args: Vec::new(),
        }
    }
}

/// Fischer time control, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeControl {
    pub white_ms: u64,
    pub black_ms: u64,
    pub white_increment_ms: u64,
    pub black_increment_ms: u64,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            white_ms: 3000,
            black_ms: 3000,
            white_increment_ms: 1500,
            black_increment_ms: 1500,
        }
    }
}

impl TimeControl {
    pub fn budget(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_ms,
            Side::Black => self.black_ms,
        }
    }

    pub fn increment(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_increment_ms,
            Side::Black => self.black_increment_ms,
        }
    }
}

/// Fixed search budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimit {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
}

impl SearchLimit {
    /// Depth- or node-limited searches never engage the clock
    pub fn bypasses_clock(&self) -> bool {
        self.depth.is_some() || self.nodes.is_some()
    }
}

impl SessionConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: SessionConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load `session.json` from the platform config directory
    ///
    /// Missing files silently yield defaults; unreadable or invalid files are
    /// logged and also yield defaults so a bad config never blocks a game.
    pub fn load_or_default() -> Self {
        let path = config_path();
        if !path.exists() {
            info!("[CONFIG] No session config at {:?}. Using defaults.", path);
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!("[CONFIG] Loaded session config from {:?}", path);
                config
            }
            Err(e) => {
                warn!(
                    "[CONFIG] Failed to load session config at {:?}: {}. Using defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    /// Reject configs that cannot drive a game
    pub fn validate(&self) -> ConfigResult<()> {
        if self.engine.program.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "engine program must not be empty".to_string(),
            });
        }
        if self.search.depth == Some(0) {
            return Err(ConfigError::Invalid {
                message: "search depth must be at least 1".to_string(),
            });
        }
        if self.search.nodes == Some(0) {
            return Err(ConfigError::Invalid {
                message: "search node budget must be at least 1".to_string(),
            });
        }
        if let Some(fen) = &self.start_position {
            rules::position_from_fen(fen).map_err(|e| ConfigError::Invalid {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// The side the human plays
    pub fn human_side(&self) -> Side {
        self.engine_side.opposite()
    }
}

/// Resolve the config file path
///
/// Falls back to a local `session.json` if the system config dir cannot be found.
fn config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "XFChess") {
        proj_dirs.config_dir().join(CONFIG_FILENAME)
    } else {
        PathBuf::from(CONFIG_FILENAME)
    }
}
