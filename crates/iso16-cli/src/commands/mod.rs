//! CLI command implementations.
//!
//! # Exit Codes
//!
//! - 0: every compared field matched
//! - 1: any mismatch, load failure or encoding failure

pub mod run;
pub mod seal;
pub mod suite;

use std::path::Path;

use anyhow::{Context, Result};
use iso16_core::config::{DEFAULT_CONFIG_FILE, RunnerConfig};
use iso16_core::seal::SealMetadata;
use serde::Serialize;

/// Exit codes shared by all commands.
pub mod exit_codes {
    /// Success exit code.
    pub const SUCCESS: u8 = 0;
    /// Mismatch or error exit code.
    pub const FAILURE: u8 = 1;
}

/// Resolves seal metadata defaults.
///
/// An explicit path must exist. Without one, `iso16.toml` in the working
/// directory is used if present.
pub fn load_metadata(config: Option<&Path>) -> Result<SealMetadata> {
    let config = match config {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            RunnerConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("failed to load config {DEFAULT_CONFIG_FILE}"))?
        },
        None => RunnerConfig::default(),
    };
    let metadata = config.metadata()?;
    tracing::debug!(
        implementation_id = %metadata.implementation_id,
        timestamp = metadata.timestamp,
        "seal defaults"
    );
    Ok(metadata)
}

/// Error response body for `--json` output.
#[derive(Debug, Serialize)]
#[serde(deny_unknown_fields)]
struct ErrorResponse {
    code: String,
    message: String,
}

/// Prints an error in the requested format and returns `exit_code`.
fn output_error(json_output: bool, code: &str, message: &str, exit_code: u8) -> u8 {
    if json_output {
        let error = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&error).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("Error: {message}");
    }
    exit_code
}

/// Prints `value` as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_metadata(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[seal]\nimplementation_id = \"custom\"\n").unwrap();
        let metadata = load_metadata(Some(&path)).unwrap();
        assert_eq!(metadata.implementation_id, "custom");
    }
}
