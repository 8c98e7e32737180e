//! Immutable audit records.

use chrono::{DateTime, Utc};
use repertoire_core::{AuditRecordType, Map, PackageName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-form details stored with a record.
pub type Payload = Map;

/// Who performed an audited operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Actor {
    /// A registry user.
    User {
        /// User id.
        id: u64,
        /// Username at the time of the operation.
        username: String,
    },
    /// Automated registry processes (updater, crawlers).
    System,
}

impl Actor {
    /// A registry user.
    #[must_use]
    pub fn user(id: u64, username: impl Into<String>) -> Self {
        Self::User {
            id,
            username: username.into(),
        }
    }

    /// Whether two actors denote the same principal.
    ///
    /// Users are matched by id, since usernames can change.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::User { id: a, .. }, Self::User { id: b, .. }) => a == b,
            (Self::System, Self::System) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { id, username } => write!(f, "{username} (#{id})"),
            Self::System => write!(f, "system"),
        }
    }
}

/// One entry of the audit log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    id: u64,
    kind: AuditRecordType,
    datetime: DateTime<Utc>,
    actor: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package: Option<PackageName>,
    #[serde(default)]
    payload: Payload,
}

impl AuditRecord {
    pub(crate) const fn new(
        id: u64,
        kind: AuditRecordType,
        datetime: DateTime<Utc>,
        actor: Actor,
        package: Option<PackageName>,
        payload: Payload,
    ) -> Self {
        Self {
            id,
            kind,
            datetime,
            actor,
            package,
            payload,
        }
    }

    /// Sequence id, strictly increasing in creation order.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Record type.
    #[must_use]
    pub const fn kind(&self) -> AuditRecordType {
        self.kind
    }

    /// When the operation happened (UTC).
    #[must_use]
    pub const fn datetime(&self) -> DateTime<Utc> {
        self.datetime
    }

    /// Who performed the operation.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Package concerned, if any.
    #[must_use]
    pub const fn package(&self) -> Option<&PackageName> {
        self.package.as_ref()
    }

    /// Operation details.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Sort key giving creation order: timestamp, then sequence id.
    #[must_use]
    pub const fn order_key(&self) -> (DateTime<Utc>, u64) {
        (self.datetime, self.id)
    }

    /// Format as JSON line.
    pub(crate) fn to_json_line(&self) -> crate::Result<String> {
        let json = sonic_rs::to_string(self)
            .map_err(|e| crate::AuditError::Serialization(e.to_string()))?;
        Ok(format!("{json}\n"))
    }
}

/// Sort records into creation order.
pub fn sort_records(records: &mut [AuditRecord]) {
    records.sort_by_key(AuditRecord::order_key);
}
