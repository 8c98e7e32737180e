//! Flag repository and list URL collaborators.

use crate::error::{FilterError, Result};
use crate::flag::FlaggedVersionRow;
use parking_lot::RwLock;
use repertoire_config::RegistryConfig;
use url::Url;

/// Source of flagged version rows.
pub trait FlaggedVersionRepository {
    /// Fetch every malware-flagged row for the given packages in one call.
    ///
    /// # Errors
    /// Returns [`FilterError::Repository`] when the backing store fails.
    fn package_versions_flagged_as_malware(
        &self,
        package_names: &[String],
    ) -> Result<Vec<FlaggedVersionRow>>;
}

impl<R: FlaggedVersionRepository + ?Sized> FlaggedVersionRepository for &R {
    fn package_versions_flagged_as_malware(
        &self,
        package_names: &[String],
    ) -> Result<Vec<FlaggedVersionRow>> {
        (**self).package_versions_flagged_as_malware(package_names)
    }
}

/// Resolves a list identifier to the absolute URL published with its flags.
pub trait ListUrlResolver {
    /// Absolute URL for `list`.
    ///
    /// # Errors
    /// Returns error if `list` cannot form a URL.
    fn list_url(&self, list: &str) -> Result<Url>;
}

impl<U: ListUrlResolver + ?Sized> ListUrlResolver for &U {
    fn list_url(&self, list: &str) -> Result<Url> {
        (**self).list_url(list)
    }
}

/// In-process flag repository; rows are returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryFlagRepository {
    rows: RwLock<Vec<FlaggedVersionRow>>,
}

impl MemoryFlagRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with rows.
    #[must_use]
    pub fn with_rows(rows: impl IntoIterator<Item = FlaggedVersionRow>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }

    /// Append a row.
    pub fn add(&self, row: FlaggedVersionRow) {
        self.rows.write().push(row);
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl FlaggedVersionRepository for MemoryFlagRepository {
    fn package_versions_flagged_as_malware(
        &self,
        package_names: &[String],
    ) -> Result<Vec<FlaggedVersionRow>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|row| package_names.contains(&row.package_name))
            .cloned()
            .collect())
    }
}

/// Builds `<base>/filter-lists/<list>` links.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base: Url,
}

impl BaseUrlResolver {
    /// Resolver rooted at `base`; a trailing slash is added if missing.
    #[must_use]
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    /// Resolver rooted at the configured public base URL.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    /// Base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }
}

fn is_valid_list_name(list: &str) -> bool {
    !list.is_empty()
        && list
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && list != "."
        && list != ".."
}

impl ListUrlResolver for BaseUrlResolver {
    fn list_url(&self, list: &str) -> Result<Url> {
        if !is_valid_list_name(list) {
            return Err(FilterError::InvalidListName(list.to_string()));
        }
        Ok(self.base.join(&format!("filter-lists/{list}"))?)
    }
}
