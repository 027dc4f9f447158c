//! Configuration file parsing
//!
//! Reads sql-migrate-parse.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::output::OutputFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub migrations: MigrationsConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrationsConfig {
    /// Paths to migration directories or individual script files
    #[serde(default = "default_paths")]
    pub paths: Vec<PathBuf>,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParserConfig {
    /// A line that also ends a statement when it is the only thing on the
    /// line, e.g. `GO`. Empty means unused.
    #[serde(default)]
    pub line_separator: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("db/migrations")]
}

fn default_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::Validation(format!(
                "invalid output format '{}'. Valid values: text, json",
                self.output.format
            )));
        }

        validate_line_separator(&self.parser.line_separator)
    }
}

/// A separator must fit on one line and must not look like a comment,
/// since comment lines are dropped before separators are checked.
pub fn validate_line_separator(separator: &str) -> Result<(), ConfigError> {
    if separator.contains(['\n', '\r']) {
        return Err(ConfigError::Validation(
            "line_separator must not contain a line break".to_string(),
        ));
    }
    if separator.trim() != separator {
        return Err(ConfigError::Validation(format!(
            "line_separator '{}' must not have leading or trailing whitespace",
            separator
        )));
    }
    if separator.starts_with("--") {
        return Err(ConfigError::Validation(format!(
            "line_separator '{}' would be read as a comment",
            separator
        )));
    }
    Ok(())
}
