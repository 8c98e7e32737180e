//! Published filter-list flags.

use serde::{Deserialize, Serialize};
use url::Url;

/// Separator between alternatives of a merged constraint.
pub const CONSTRAINT_SEPARATOR: &str = " || ";

/// Raw row returned by the flag repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlaggedVersionRow {
    /// Flagged package.
    pub package_name: String,
    /// Version (or version constraint) as it appears on the list.
    pub version: String,
    /// Category assigned by the list, e.g. `malware`.
    pub category: String,
    /// Identifier of the originating list.
    pub list: String,
}

impl FlaggedVersionRow {
    /// Create a row.
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        version: impl Into<String>,
        category: impl Into<String>,
        list: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            version: version.into(),
            category: category.into(),
            list: list.into(),
        }
    }
}

/// Why a range of a package's versions is flagged by one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterListFlag {
    /// OR-combined version constraint.
    pub constraint: String,
    /// Absolute link to the list.
    pub url: Url,
    /// Category assigned by the list.
    pub category: String,
    /// Human-readable rationale, attached by a later enrichment step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FilterListFlag {
    /// Create a flag without a reason.
    #[must_use]
    pub fn new(constraint: impl Into<String>, url: Url, category: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            url,
            category: category.into(),
            reason: None,
        }
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The individual versions merged into the constraint.
    pub fn alternatives(&self) -> impl Iterator<Item = &str> {
        self.constraint
            .split(CONSTRAINT_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
