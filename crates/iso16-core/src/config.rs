//! Runner configuration.
//!
//! The configuration file is TOML and only supplies seal metadata defaults.
//! Values a vector declares take precedence.
//!
//! ```toml
//! [seal]
//! implementation_id = "iso16-ref"
//! timestamp = 0
//! nonce = "00000000000000000000000000000000"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::seal::{DEFAULT_IMPLEMENTATION_ID, NONCE_LEN, SealMetadata, parse_nonce};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "iso16.toml";

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Seal metadata defaults.
    #[serde(default)]
    pub seal: SealConfig,
}

/// `[seal]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SealConfig {
    /// Implementation identifier bound into every seal.
    #[serde(default = "default_implementation_id")]
    pub implementation_id: String,

    /// Timestamp bound into every seal.
    #[serde(default)]
    pub timestamp: u64,

    /// Nonce as 32 hex characters.
    #[serde(default = "default_nonce")]
    pub nonce: String,
}

fn default_implementation_id() -> String {
    DEFAULT_IMPLEMENTATION_ID.to_string()
}

fn default_nonce() -> String {
    "0".repeat(NONCE_LEN * 2)
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            implementation_id: default_implementation_id(),
            timestamp: 0,
            nonce: default_nonce(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, contains unknown keys, or
    /// the nonce is not 32 hex characters.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.metadata()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Seal metadata defaults described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the nonce is malformed.
    pub fn metadata(&self) -> Result<SealMetadata, ConfigError> {
        let nonce = parse_nonce(&self.seal.nonce).map_err(ConfigError::Validation)?;
        Ok(SealMetadata {
            implementation_id: self.seal.implementation_id.clone(),
            timestamp: self.seal.timestamp,
            nonce,
        })
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
