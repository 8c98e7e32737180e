//! Reference-change event emitted during an update pass.

use crate::differ;
use repertoire_core::{MetadataValue, VersionId, VersionMetadata};

/// A version whose source or dist reference moved between two snapshots.
///
/// Built once by [`RevisionDiffer::compare`](crate::RevisionDiffer::compare),
/// handed to listeners, then dropped. It is never persisted itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceChangeRecord {
    version: VersionId,
    source_from: Option<MetadataValue>,
    source_to: Option<MetadataValue>,
    dist_from: Option<MetadataValue>,
    dist_to: Option<MetadataValue>,
    old_metadata: VersionMetadata,
    new_metadata: VersionMetadata,
}

impl ReferenceChangeRecord {
    /// Capture both snapshots of a version.
    #[must_use]
    pub fn new(
        version: VersionId,
        old_metadata: VersionMetadata,
        new_metadata: VersionMetadata,
    ) -> Self {
        Self {
            version,
            source_from: old_metadata.source_reference().cloned(),
            source_to: new_metadata.source_reference().cloned(),
            dist_from: old_metadata.dist_reference().cloned(),
            dist_to: new_metadata.dist_reference().cloned(),
            old_metadata,
            new_metadata,
        }
    }

    /// Version the snapshots belong to.
    #[must_use]
    pub const fn version(&self) -> &VersionId {
        &self.version
    }

    /// Source reference before the update.
    #[must_use]
    pub const fn source_from(&self) -> Option<&MetadataValue> {
        self.source_from.as_ref()
    }

    /// Source reference after the update.
    #[must_use]
    pub const fn source_to(&self) -> Option<&MetadataValue> {
        self.source_to.as_ref()
    }

    /// Dist reference before the update.
    #[must_use]
    pub const fn dist_from(&self) -> Option<&MetadataValue> {
        self.dist_from.as_ref()
    }

    /// Dist reference after the update.
    #[must_use]
    pub const fn dist_to(&self) -> Option<&MetadataValue> {
        self.dist_to.as_ref()
    }

    /// Snapshot before the update.
    #[must_use]
    pub const fn old_metadata(&self) -> &VersionMetadata {
        &self.old_metadata
    }

    /// Snapshot after the update.
    #[must_use]
    pub const fn new_metadata(&self) -> &VersionMetadata {
        &self.new_metadata
    }

    /// Whether the source or dist reference differs.
    #[must_use]
    pub fn has_reference_changed(&self) -> bool {
        differ::has_reference_changed(&self.old_metadata, &self.new_metadata)
    }

    /// Whether anything besides `source`, `dist` and `time` differs.
    #[must_use]
    pub fn has_metadata_changed(&self) -> bool {
        differ::has_metadata_changed(&self.old_metadata, &self.new_metadata)
    }

    /// Payload stored with a `version_reference_changed` audit record.
    #[must_use]
    pub fn audit_payload(&self) -> VersionMetadata {
        VersionMetadata::new()
            .with("name", self.version.package.full_name())
            .with("version", self.version.version.as_str())
            .with("source_from", self.source_from.clone())
            .with("source_to", self.source_to.clone())
            .with("dist_from", self.dist_from.clone())
            .with("dist_to", self.dist_to.clone())
            .with(
                "metadata_changed",
                MetadataValue::Bool(self.has_metadata_changed()),
            )
    }
}
