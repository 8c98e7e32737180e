//! Bridge from the revision differ to the audit log.

use crate::recorder::AuditRecorder;
use crate::store::AuditStore;
use repertoire_diff::{ReferenceChangeListener, ReferenceChangeRecord};
use std::sync::Arc;

/// Writes a `version_reference_changed` record for every dispatched change.
#[derive(Debug)]
pub struct ReferenceChangeAuditor<S> {
    recorder: Arc<AuditRecorder<S>>,
}

impl<S> ReferenceChangeAuditor<S> {
    /// Auditor sharing `recorder`.
    #[must_use]
    pub const fn new(recorder: Arc<AuditRecorder<S>>) -> Self {
        Self { recorder }
    }
}

impl<S: AuditStore> ReferenceChangeListener for ReferenceChangeAuditor<S> {
    fn name(&self) -> &str {
        "audit"
    }

    fn on_reference_changed(
        &self,
        record: &ReferenceChangeRecord,
    ) -> repertoire_core::Result<()> {
        self.recorder.version_reference_changed(record)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAuditStore;
    use repertoire_core::{AuditRecordType, PackageName, VersionId, metadata_from_json};
    use repertoire_diff::{ReferenceChangeDispatcher, RevisionDiffer};

    #[test]
    fn reference_change_lands_in_audit_log() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let recorder = Arc::new(AuditRecorder::new(MemoryAuditStore::new()).unwrap());
        let dispatcher = ReferenceChangeDispatcher::new()
            .with(ReferenceChangeAuditor::new(Arc::clone(&recorder)));
        let differ = RevisionDiffer::new();
        let package = PackageName::new("acme", "package");

        let old = metadata_from_json(
            r#"{"name":"acme/package","source":{"reference":"aaa"},"dist":{"reference":"aaa"}}"#,
        )
        .unwrap();
        let moved = metadata_from_json(
            r#"{"name":"acme/package","source":{"reference":"bbb"},"dist":{"reference":"bbb"}}"#,
        )
        .unwrap();

        let changed = differ
            .process(
                VersionId::new(package.clone(), "1.0.0.0"),
                old.clone(),
                moved,
                &dispatcher,
            )
            .unwrap();
        assert!(changed);

        let unchanged = differ
            .process(
                VersionId::new(package.clone(), "1.0.0.0"),
                old.clone(),
                old,
                &dispatcher,
            )
            .unwrap();
        assert!(!unchanged);

        let records = recorder
            .store()
            .records_of_kind(AuditRecordType::VersionReferenceChanged)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].package(), Some(&package));
    }
}
