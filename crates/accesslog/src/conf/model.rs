//! Model: IngestConfig and its errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::MAX_LINE_SIZE;
use crate::stream::{NoMatchPolicy, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Access log to read; `-` reads standard input
    pub path: Option<String>,
    pub output: OutputFormat,
    pub on_no_match: NoMatchPolicy,
    /// Longest line kept in memory; longer lines are rejected
    pub max_line_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            path: None,
            output: OutputFormat::default(),
            on_no_match: NoMatchPolicy::default(),
            max_line_bytes: MAX_LINE_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
