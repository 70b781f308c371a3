//! Configuration for the alignment pipeline.

use crate::core::timeline::Frequency;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main configuration for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spacing of the aligned timeline
    pub frequency: Frequency,

    /// Append a trailing timeline point so the last bucket is aggregated
    pub close_final_bucket: bool,

    /// Window sizes (in rows) for rolling and spectral features
    pub rolling_windows: Vec<usize>,

    /// Worker threads used by batch runs
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequency: Frequency::default(),
            close_final_bucket: false,
            rolling_windows: vec![10, 15],
            jobs: 4,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults when absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensor-align")
            .join("config.json")
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::Invalid("jobs must be at least 1".to_string()));
        }
        if self.rolling_windows.iter().any(|&w| w < 2) {
            return Err(ConfigError::Invalid(
                "rolling windows must span at least 2 rows".to_string(),
            ));
        }
        Ok(())
    }

    /// Pretty JSON rendering for display.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
