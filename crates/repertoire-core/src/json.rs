//! JSON encoding and decoding using sonic-rs.

use crate::metadata::{MetadataValue, VersionMetadata};
use crate::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Deserialize JSON string.
///
/// # Errors
/// Returns error if JSON is invalid.
pub fn from_json<T: DeserializeOwned>(s: &str) -> Result<T> {
    sonic_rs::from_str(s).map_err(Error::from)
}

/// Serialize to compact JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    sonic_rs::to_string(value).map_err(Error::from)
}

/// Parse a version descriptor document.
///
/// The document must be a JSON object; arrays, strings and other scalars
/// are rejected with [`Error::TypeMismatch`].
///
/// # Errors
/// Returns error if JSON is invalid or not an object.
pub fn metadata_from_json(s: &str) -> Result<VersionMetadata> {
    let value: MetadataValue = from_json(s)?;
    VersionMetadata::try_from(value)
}
