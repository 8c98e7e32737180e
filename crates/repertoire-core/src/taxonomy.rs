//! Closed taxonomies shared by the registry components.
//!
//! Consumers such as reporting or compliance exports match exhaustively on
//! these enums. A new kind of event means a new variant here.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad grouping of audit record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    /// Changes to who controls a package.
    Ownership,
    /// Package creation, deletion and status changes.
    PackageLifecycle,
    /// Version creation, deletion and reference changes.
    VersionLifecycle,
    /// Account creation, deletion and profile changes.
    UserLifecycle,
    /// Credentials, 2FA, linked accounts and filter lists.
    Security,
}

/// Type of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditRecordType {
    /// A maintainer was added to a package.
    MaintainerAdded,
    /// A maintainer was removed from a package.
    MaintainerRemoved,
    /// A package was transferred to new maintainers.
    PackageTransferred,

    /// A package was submitted.
    PackageCreated,
    /// A package was deleted.
    PackageDeleted,
    /// A package repository URL changed.
    CanonicalUrlChanged,
    /// A package was marked abandoned.
    PackageAbandoned,
    /// A package was no longer marked abandoned.
    PackageUnabandoned,

    /// A version was published.
    VersionCreated,
    /// A version was removed.
    VersionDeleted,
    /// A version's source or dist reference changed.
    VersionReferenceChanged,

    /// A user account was created.
    UserCreated,
    /// A user account was deleted.
    UserDeleted,
    /// A username changed.
    UsernameChanged,
    /// An email address changed.
    EmailChanged,

    /// A password reset was requested.
    PasswordResetRequested,
    /// A password was reset through the reset flow.
    PasswordReset,
    /// A password was changed by its owner.
    PasswordChanged,
    /// Two-factor authentication was enabled.
    TwoFactorAuthenticationActivated,
    /// Two-factor authentication was disabled.
    TwoFactorAuthenticationDeactivated,
    /// A GitHub account was linked.
    GitHubLinkedWithUser,
    /// A GitHub account was unlinked.
    GitHubDisconnectedFromUser,
    /// A filter list entry was added.
    FilterListEntryAdded,
    /// A filter list entry was removed.
    FilterListEntryDeleted,
}

impl AuditRecordType {
    /// Every record type, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::MaintainerAdded,
        Self::MaintainerRemoved,
        Self::PackageTransferred,
        Self::PackageCreated,
        Self::PackageDeleted,
        Self::CanonicalUrlChanged,
        Self::PackageAbandoned,
        Self::PackageUnabandoned,
        Self::VersionCreated,
        Self::VersionDeleted,
        Self::VersionReferenceChanged,
        Self::UserCreated,
        Self::UserDeleted,
        Self::UsernameChanged,
        Self::EmailChanged,
        Self::PasswordResetRequested,
        Self::PasswordReset,
        Self::PasswordChanged,
        Self::TwoFactorAuthenticationActivated,
        Self::TwoFactorAuthenticationDeactivated,
        Self::GitHubLinkedWithUser,
        Self::GitHubDisconnectedFromUser,
        Self::FilterListEntryAdded,
        Self::FilterListEntryDeleted,
    ];

    /// Category this record type belongs to.
    #[must_use]
    pub const fn category(self) -> AuditCategory {
        match self {
            Self::MaintainerAdded | Self::MaintainerRemoved | Self::PackageTransferred => {
                AuditCategory::Ownership
            }
            Self::PackageCreated
            | Self::PackageDeleted
            | Self::CanonicalUrlChanged
            | Self::PackageAbandoned
            | Self::PackageUnabandoned => AuditCategory::PackageLifecycle,
            Self::VersionCreated | Self::VersionDeleted | Self::VersionReferenceChanged => {
                AuditCategory::VersionLifecycle
            }
            Self::UserCreated | Self::UserDeleted | Self::UsernameChanged | Self::EmailChanged => {
                AuditCategory::UserLifecycle
            }
            Self::PasswordResetRequested
            | Self::PasswordReset
            | Self::PasswordChanged
            | Self::TwoFactorAuthenticationActivated
            | Self::TwoFactorAuthenticationDeactivated
            | Self::GitHubLinkedWithUser
            | Self::GitHubDisconnectedFromUser
            | Self::FilterListEntryAdded
            | Self::FilterListEntryDeleted => AuditCategory::Security,
        }
    }

    /// Stable identifier used in storage and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaintainerAdded => "maintainer_added",
            Self::MaintainerRemoved => "maintainer_removed",
            Self::PackageTransferred => "package_transferred",
            Self::PackageCreated => "package_created",
            Self::PackageDeleted => "package_deleted",
            Self::CanonicalUrlChanged => "canonical_url_changed",
            Self::PackageAbandoned => "package_abandoned",
            Self::PackageUnabandoned => "package_unabandoned",
            Self::VersionCreated => "version_created",
            Self::VersionDeleted => "version_deleted",
            Self::VersionReferenceChanged => "version_reference_changed",
            Self::UserCreated => "user_created",
            Self::UserDeleted => "user_deleted",
            Self::UsernameChanged => "username_changed",
            Self::EmailChanged => "email_changed",
            Self::PasswordResetRequested => "password_reset_requested",
            Self::PasswordReset => "password_reset",
            Self::PasswordChanged => "password_changed",
            Self::TwoFactorAuthenticationActivated => "two_factor_authentication_activated",
            Self::TwoFactorAuthenticationDeactivated => "two_factor_authentication_deactivated",
            Self::GitHubLinkedWithUser => "git_hub_linked_with_user",
            Self::GitHubDisconnectedFromUser => "git_hub_disconnected_from_user",
            Self::FilterListEntryAdded => "filter_list_entry_added",
            Self::FilterListEntryDeleted => "filter_list_entry_deleted",
        }
    }
}

impl fmt::Display for AuditRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditRecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownAuditRecordType(s.to_string()))
    }
}

/// Why a package was (or stopped being) marked abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AbandonmentReason {
    /// A maintainer toggled the flag by hand.
    Manual,
    /// The upstream repository was archived.
    RepositoryArchived,
    /// The package's composer.json declares `abandoned`.
    ComposerJsonFlag,
    /// Both the archive state and composer.json flag applied.
    Both,
    /// Provenance was not recorded.
    #[default]
    Unknown,
}

impl AbandonmentReason {
    /// Merge two provenance values observed for the same package.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unknown, x) | (x, Self::Unknown) => x,
            (Self::RepositoryArchived, Self::ComposerJsonFlag)
            | (Self::ComposerJsonFlag, Self::RepositoryArchived)
            | (Self::Both, _)
            | (_, Self::Both) => Self::Both,
            (Self::Manual, _) | (_, Self::Manual) => Self::Manual,
            (x, _) => x,
        }
    }

    /// Whether the flag was set by automated tooling rather than a person.
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(
            self,
            Self::RepositoryArchived | Self::ComposerJsonFlag | Self::Both
        )
    }

    /// Stable identifier used in storage and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::RepositoryArchived => "repository-archived",
            Self::ComposerJsonFlag => "composer-json-flag",
            Self::Both => "both",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AbandonmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbandonmentReason {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manual" => Ok(Self::Manual),
            "repository-archived" => Ok(Self::RepositoryArchived),
            "composer-json-flag" => Ok(Self::ComposerJsonFlag),
            "both" => Ok(Self::Both),
            "unknown" => Ok(Self::Unknown),
            other => Err(Error::UnknownAbandonmentReason(other.to_string())),
        }
    }
}
