//! Configuration loading and merging.

use crate::env::EnvConfig;
use crate::error::{ConfigError, Result};
use crate::types::{ConfigFile, RegistryConfig, parse_base_url};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a resolved setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    /// Built-in default.
    Default,
    /// Config file.
    File,
    /// Environment variable.
    Environment,
}

/// Loads [`RegistryConfig`] from defaults, an optional file and the
/// environment, in increasing priority.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<EnvConfig>,
}

impl ConfigLoader {
    /// Loader with no file; reads the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from a JSON file. A missing file is ignored.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Use these overrides instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    /// Load the config file, if one is configured and exists.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Option<ConfigFile>> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let file = sonic_rs::from_str(&content).map_err(|e| ConfigError::json(path, &e))?;
        Ok(Some(file))
    }

    /// Merge all sources into a resolved configuration.
    ///
    /// # Errors
    /// Returns error if any source holds an invalid value.
    pub fn resolve(&self) -> Result<RegistryConfig> {
        let mut config = RegistryConfig::default();
        let mut base_url_source = ConfigSource::Default;

        if let Some(path) = &self.file
            && let Some(file) = Self::load_file(path)?
        {
            if let Some(raw) = file.base_url.as_deref() {
                config.base_url = parse_base_url("base-url", raw)?;
                base_url_source = ConfigSource::File;
            }
            if file.audit_log.is_some() {
                config.audit_log = file.audit_log;
            }
            if let Some(order) = file.constraint_order {
                config.constraint_order = order;
            }
        }

        let env = match &self.env {
            Some(env) => env.clone(),
            None => EnvConfig::from_env()?,
        };
        if let Some(url) = env.base_url {
            config.base_url = url;
            base_url_source = ConfigSource::Environment;
        }
        if env.audit_log.is_some() {
            config.audit_log = env.audit_log;
        }
        if let Some(order) = env.constraint_order {
            config.constraint_order = order;
        }

        debug!(
            base_url = %config.base_url,
            base_url_source = ?base_url_source,
            audit_log = ?config.audit_log,
            constraint_order = %config.constraint_order,
            "configuration resolved"
        );
        Ok(config)
    }
}
