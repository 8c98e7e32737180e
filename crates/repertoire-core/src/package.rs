//! Package and version identifiers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Package name (vendor/name), stored lowercase as the registry does.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName {
    vendor: String,
    name: String,
}

impl PackageName {
    /// Create new package name.
    #[must_use]
    pub fn new(vendor: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into().to_lowercase(),
            name: name.into().to_lowercase(),
        }
    }

    /// Parse from "vendor/name" string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (vendor, name) = s.trim().split_once('/')?;
        if vendor.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        if vendor.chars().any(char::is_whitespace) || name.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self::new(vendor, name))
    }

    /// Get vendor.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Get name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.vendor, self.name)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vendor, self.name)
    }
}

impl FromStr for PackageName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidPackageName(s.to_string()))
    }
}

impl TryFrom<String> for PackageName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.full_name()
    }
}

/// A single published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId {
    /// Registry row id, when the version has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Owning package.
    pub package: PackageName,
    /// Normalized version string (e.g. `1.0.0.0`, `dev-main`).
    pub version: String,
}

impl VersionId {
    /// Create a version identifier without a registry id.
    #[must_use]
    pub fn new(package: PackageName, version: impl Into<String>) -> Self {
        Self {
            id: None,
            package,
            version: version.into(),
        }
    }

    /// Attach the registry row id.
    #[must_use]
    pub const fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.version)
    }
}
