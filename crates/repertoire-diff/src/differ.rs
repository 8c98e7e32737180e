//! Reference and metadata change detection.

use crate::compare::maps_equal;
use crate::event::ReferenceChangeRecord;
use crate::listener::ReferenceChangeDispatcher;
use repertoire_core::{Result, VersionId, VersionMetadata};
use tracing::{debug, trace};

/// Top-level keys excluded from the metadata comparison.
///
/// `source` and `dist` are compared through their references instead, and
/// `time` changes on every re-tag.
pub const IGNORED_KEYS: [&str; 3] = ["dist", "source", "time"];

/// Whether the source or dist reference differs between two snapshots.
///
/// References are compared by exact value. A missing reference equals another
/// missing reference and differs from any string.
#[must_use]
pub fn has_reference_changed(old: &VersionMetadata, new: &VersionMetadata) -> bool {
    old.source_reference() != new.source_reference()
        || old.dist_reference() != new.dist_reference()
}

/// Whether anything other than [`IGNORED_KEYS`] differs between two snapshots.
#[must_use]
pub fn has_metadata_changed(old: &VersionMetadata, new: &VersionMetadata) -> bool {
    let old = old.without(&IGNORED_KEYS);
    let new = new.without(&IGNORED_KEYS);
    !maps_equal(old.as_map(), new.as_map())
}

/// Compares successive snapshots of a version during an update pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionDiffer;

impl RevisionDiffer {
    /// Create a differ.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Build a change event when the references of `version` moved.
    ///
    /// Returns `None` when both references are unchanged, whatever happened
    /// to the rest of the metadata.
    #[must_use]
    pub fn compare(
        &self,
        version: VersionId,
        old: VersionMetadata,
        new: VersionMetadata,
    ) -> Option<ReferenceChangeRecord> {
        if !has_reference_changed(&old, &new) {
            trace!(version = %version, "references unchanged");
            return None;
        }

        let record = ReferenceChangeRecord::new(version, old, new);
        debug!(
            version = %record.version(),
            source_from = ?record.source_from(),
            source_to = ?record.source_to(),
            dist_from = ?record.dist_from(),
            dist_to = ?record.dist_to(),
            "version reference changed"
        );
        Some(record)
    }

    /// Compare snapshots and hand any resulting event to `dispatcher`.
    ///
    /// Returns whether an event was emitted.
    ///
    /// # Errors
    /// Returns the first listener error.
    pub fn process(
        &self,
        version: VersionId,
        old: VersionMetadata,
        new: VersionMetadata,
        dispatcher: &ReferenceChangeDispatcher,
    ) -> Result<bool> {
        match self.compare(version, old, new) {
            Some(record) => {
                dispatcher.dispatch(&record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
