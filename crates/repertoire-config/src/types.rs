//! Resolved configuration types.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Default public base URL of the registry.
pub const DEFAULT_BASE_URL: &str = "https://packagist.org/";

/// Order of versions inside a merged filter-list constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintOrder {
    /// Keep the order rows were returned by the flag repository.
    #[default]
    #[serde(rename = "fetch")]
    FetchOrder,
    /// Sort versions lexicographically.
    Lexicographic,
}

impl ConstraintOrder {
    /// Config value for this order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchOrder => "fetch",
            Self::Lexicographic => "lexicographic",
        }
    }
}

impl fmt::Display for ConstraintOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fetch" => Ok(Self::FetchOrder),
            "lexicographic" => Ok(Self::Lexicographic),
            other => Err(ConfigError::invalid(
                "constraint-order",
                format!("expected 'fetch' or 'lexicographic', got '{other}'"),
            )),
        }
    }
}

/// Settings as they appear in a config file; every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConfigFile {
    /// Public base URL of the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Path of the JSON-lines audit log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
    /// Order of versions inside merged filter-list constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_order: Option<ConstraintOrder>,
}

/// Fully resolved registry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Public base URL; filter-list links are built under it.
    pub base_url: Url,
    /// JSON-lines audit log location. `None` keeps records in memory.
    pub audit_log: Option<PathBuf>,
    /// Order of versions inside merged filter-list constraints.
    pub constraint_order: ConstraintOrder,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            audit_log: None,
            constraint_order: ConstraintOrder::default(),
        }
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

/// Parse and check a registry base URL.
///
/// The URL must be absolute http(s). A trailing slash is added so relative
/// paths join beneath it rather than replacing its last segment.
///
/// # Errors
/// Returns error if the URL is malformed or not http(s).
pub fn parse_base_url(key: &str, raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            key,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
