//! Configuration loading
//!
//! Reads `tripmode.toml`. Every table and key is optional and falls back to
//! the controller defaults.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tripmode_core::sequencer::MAX_PRESSES;
use tripmode_core::ControllerConfig;

/// Accepted speed thresholds
pub const SPEED_THRESHOLD_RANGE: RangeInclusive<i32> = 1..=200;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "tripmode.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("speed_threshold {0} is outside 1..=200")]
    ThresholdOutOfRange(i32),

    #[error("press_cooldown_ms must be greater than zero")]
    ZeroPressCooldown,

    #[error("{presses} presses of {press_ms} ms do not fit in mode_switch_cooldown_ms {switch_ms}")]
    PressesOutlastCooldown {
        presses: usize,
        press_ms: u32,
        switch_ms: u32,
    },
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when RUST_LOG is not set
    pub level: String,
    /// Also append log output to this file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Controller settings
    pub controller: ControllerConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`
    ///
    /// When `required` is false a missing file yields the defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(input) => Self::from_toml_str(&input),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Check values the controller cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.controller.speed_threshold;
        if !SPEED_THRESHOLD_RANGE.contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        let controller = &self.controller;
        if controller.press_cooldown_ms == 0 {
            return Err(ConfigError::ZeroPressCooldown);
        }
        if !controller.drains_within_cooldown() {
            return Err(ConfigError::PressesOutlastCooldown {
                presses: MAX_PRESSES,
                press_ms: controller.press_cooldown_ms,
                switch_ms: controller.mode_switch_cooldown_ms,
            });
        }
        Ok(())
    }
}
