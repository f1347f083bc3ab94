// src/config.rs
//! Decoder configuration stored as JSON in the user's config directory

use crate::error::{GpsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest legal NMEA-0183 sentence, `$` through CR LF
pub const MAX_SENTENCE_LEN: usize = 82;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Bytes kept while waiting for a terminator; `None` is unbounded
    pub max_pending_bytes: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_pending_bytes: Some(4096),
        }
    }
}

impl DecoderConfig {
    /// Configuration with no pending-byte bound
    pub fn unbounded() -> Self {
        Self {
            max_pending_bytes: None,
        }
    }

    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GpsError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| GpsError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match self.max_pending_bytes {
            Some(max) if max < MAX_SENTENCE_LEN => Err(GpsError::Config(format!(
                "max_pending_bytes must be at least {} (got {})",
                MAX_SENTENCE_LEN, max
            ))),
            _ => Ok(()),
        }
    }

    /// Get config file path
    fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| GpsError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gps-decoder")
            .join("config.json"))
    }
}
