//! Configuration errors.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {path}: {message}")]
    #[diagnostic(code(repertoire::config::io))]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("invalid JSON in {path}: {message}")]
    #[diagnostic(
        code(repertoire::config::json),
        help("the config file must be a JSON object")
    )]
    Json {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A setting has an unusable value.
    #[error("invalid value for {key}: {message}")]
    #[diagnostic(code(repertoire::config::invalid_value))]
    InvalidValue {
        /// Setting name (file key or environment variable).
        key: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Create an IO error with context.
    #[must_use]
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Create a JSON error with context.
    #[must_use]
    pub fn json(path: &Path, err: &sonic_rs::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Create an invalid-value error.
    #[must_use]
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for repertoire_core::Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
