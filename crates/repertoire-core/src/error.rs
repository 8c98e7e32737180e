//! Error types for Repertoire operations.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Repertoire.
#[derive(Error, Debug)]
pub enum Error {
    /// A value had the wrong shape at an API boundary.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected kind of value.
        expected: &'static str,
        /// Kind of value actually supplied.
        found: &'static str,
    },

    /// Invalid package name.
    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),

    /// Audit record type outside the known taxonomy.
    #[error("unknown audit record type '{0}'")]
    UnknownAuditRecordType(String),

    /// Abandonment reason outside the known taxonomy.
    #[error("unknown abandonment reason '{0}'")]
    UnknownAbandonmentReason(String),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// IO error.
    #[error("io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failure reported by a persistence collaborator.
    #[error("data access error: {0}")]
    DataAccess(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Audit error.
    #[error("audit error: {0}")]
    Audit(String),
}

impl Error {
    /// Create an IO error with context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for Repertoire operations.
pub type Result<T> = std::result::Result<T, Error>;
