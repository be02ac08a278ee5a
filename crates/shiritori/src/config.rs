//! Game configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::SessionConfig;

/// Settings for a game, usually read from `shiritori.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seconds each participant has to answer.
    #[serde(default = "default_turn_timeout_secs")]
    turn_timeout_secs: u64,

    /// Fixed seed for the turn-order shuffle.
    #[serde(default)]
    shuffle_seed: Option<u64>,

    /// Path of the word list.
    #[serde(default)]
    dictionary: Option<PathBuf>,
}

#[instrument]
fn default_turn_timeout_secs() -> u64 {
    30
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_timeout_secs: default_turn_timeout_secs(),
            shuffle_seed: None,
            dictionary: None,
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A relative `dictionary` path is resolved against the directory that
    /// holds the config file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if let Some(dictionary) = &config.dictionary
            && dictionary.is_relative()
            && let Some(base) = path.as_ref().parent()
        {
            config.dictionary = Some(base.join(dictionary));
        }

        config.validate()?;
        info!(
            turn_timeout_secs = config.turn_timeout_secs,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Overrides the turn timeout.
    pub fn with_turn_timeout_secs(mut self, secs: u64) -> Self {
        self.turn_timeout_secs = secs;
        self
    }

    /// Overrides the shuffle seed.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Overrides the dictionary path.
    pub fn with_dictionary(mut self, path: PathBuf) -> Self {
        self.dictionary = Some(path);
        self
    }

    /// Checks values that parse but cannot be played with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_timeout_secs == 0 {
            return Err(ConfigError::new(
                "turn_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(
            Duration::from_secs(self.turn_timeout_secs),
            self.shuffle_seed,
        )
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
