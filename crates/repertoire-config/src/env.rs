//! Environment variable overrides.

use crate::error::Result;
use crate::types::{ConstraintOrder, parse_base_url};
use std::path::PathBuf;
use url::Url;

/// Environment variables read by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepertoireEnvVar {
    /// Public base URL.
    BaseUrl,
    /// Audit log path.
    AuditLog,
    /// Filter-list constraint order.
    ConstraintOrder,
}

impl RepertoireEnvVar {
    /// All variables.
    pub const ALL: [Self; 3] = [Self::BaseUrl, Self::AuditLog, Self::ConstraintOrder];

    /// Variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "REPERTOIRE_BASE_URL",
            Self::AuditLog => "REPERTOIRE_AUDIT_LOG",
            Self::ConstraintOrder => "REPERTOIRE_CONSTRAINT_ORDER",
        }
    }
}

/// Overrides collected from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `REPERTOIRE_BASE_URL`.
    pub base_url: Option<Url>,
    /// `REPERTOIRE_AUDIT_LOG`.
    pub audit_log: Option<PathBuf>,
    /// `REPERTOIRE_CONSTRAINT_ORDER`.
    pub constraint_order: Option<ConstraintOrder>,
}

impl EnvConfig {
    /// Read overrides from the process environment.
    ///
    /// # Errors
    /// Returns error if a set variable has an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// Returns error if a set variable has an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |var: RepertoireEnvVar| lookup(var.as_str()).filter(|v| !v.trim().is_empty());

        let base_url = get(RepertoireEnvVar::BaseUrl)
            .map(|raw| parse_base_url(RepertoireEnvVar::BaseUrl.as_str(), &raw))
            .transpose()?;
        let audit_log = get(RepertoireEnvVar::AuditLog).map(PathBuf::from);
        let constraint_order = get(RepertoireEnvVar::ConstraintOrder)
            .map(|raw| raw.parse::<ConstraintOrder>())
            .transpose()?;

        Ok(Self {
            base_url,
            audit_log,
            constraint_order,
        })
    }

    /// Whether no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.audit_log.is_none() && self.constraint_order.is_none()
    }
}
