//! Engine configuration.

use super::search::DEFAULT_CACHE_CAPACITY;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Tunables for the move selector and its callers.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Entries the transposition cache holds before a bulk clear.
    #[serde(default = "default_cache_capacity")]
    cache_capacity: usize,

    /// Play the center / corner shortcuts instead of searching the first moves.
    #[serde(default = "default_opening_book")]
    opening_book: bool,

    /// Seed for tie-breaking; `None` draws from the thread RNG.
    #[serde(default)]
    seed: Option<u64>,

    /// Pause a front end should insert before showing a computer move.
    ///
    /// The engine itself never sleeps.
    #[serde(default = "default_move_delay_ms")]
    move_delay_ms: u64,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_opening_book() -> bool {
    true
}

fn default_move_delay_ms() -> u64 {
    500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            opening_book: default_opening_book(),
            seed: None,
            move_delay_ms: default_move_delay_ms(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            cache_capacity = config.cache_capacity,
            opening_book = config.opening_book,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.cache_capacity == 0 {
            return Err(ConfigError::new("cache_capacity must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Returns a copy with the tie-break seed replaced.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Returns a copy with the opening shortcuts switched on or off.
    pub fn with_opening_book(mut self, enabled: bool) -> Self {
        self.opening_book = enabled;
        self
    }

    /// Returns a copy with a different cache cap.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
