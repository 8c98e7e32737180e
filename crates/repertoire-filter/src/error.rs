//! Filter aggregation errors.

use thiserror::Error;

/// Filter aggregation error.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The flag repository failed to return rows.
    #[error("flag repository error: {0}")]
    Repository(String),

    /// A filter list identifier cannot be turned into a URL.
    #[error("invalid filter list name '{0}'")]
    InvalidListName(String),

    /// URL construction failed.
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    /// Dump serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] repertoire_core::Error),
}

impl From<FilterError> for repertoire_core::Error {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Serialization(inner) => inner,
            FilterError::Repository(message) => Self::DataAccess(message),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
