//! Audit log errors.

use thiserror::Error;

/// Audit log error.
#[derive(Debug, Error)]
pub enum AuditError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored line could not be decoded.
    #[error("corrupt audit log line {line}: {message}")]
    Corrupt {
        /// 1-based line number.
        line: usize,
        /// Decoder message.
        message: String,
    },

    /// A record with this sequence id was already appended.
    #[error("audit record {0} already exists")]
    DuplicateId(u64),

    /// Backing store failure.
    #[error("audit store error: {0}")]
    Store(String),

    /// Configuration could not be applied.
    #[error(transparent)]
    Config(#[from] repertoire_config::ConfigError),
}

impl From<AuditError> for repertoire_core::Error {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Io(_) | AuditError::Store(_) => Self::DataAccess(err.to_string()),
            AuditError::Config(inner) => inner.into(),
            other => Self::Audit(other.to_string()),
        }
    }
}

/// Result type for audit log operations.
pub type Result<T> = std::result::Result<T, AuditError>;
