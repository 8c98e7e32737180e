//! Audit recorder.

use crate::error::Result;
use crate::record::{Actor, AuditRecord, Payload};
use crate::store::{AuditStore, JsonLinesAuditStore, MemoryAuditStore};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use repertoire_config::RegistryConfig;
use repertoire_core::{AbandonmentReason, AuditRecordType, MetadataValue, PackageName};
use repertoire_diff::ReferenceChangeRecord;
use tracing::{debug, info, warn};

fn payload<const N: usize>(entries: [(&str, MetadataValue); N]) -> Payload {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn names(list: &[String]) -> MetadataValue {
    MetadataValue::Array(list.iter().map(|n| MetadataValue::from(n.as_str())).collect())
}

/// Appends typed, immutable records to an [`AuditStore`].
///
/// Ids are assigned and written under one lock, so a shared recorder hands
/// the store strictly increasing ids.
#[derive(Debug)]
pub struct AuditRecorder<S> {
    store: S,
    next_id: Mutex<u64>,
}

impl<S: AuditStore> AuditRecorder<S> {
    /// Recorder over `store`, continuing after its highest sequence id.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn new(store: S) -> Result<Self> {
        let next = store.last_sequence()?.map_or(1, |id| id + 1);
        debug!(next_id = next, "audit recorder opened");
        Ok(Self {
            store,
            next_id: Mutex::new(next),
        })
    }

    /// Underlying store, for queries.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Append a record that concerns no particular package.
    ///
    /// # Errors
    /// Returns error if the store rejects the write.
    pub fn record(
        &self,
        kind: AuditRecordType,
        actor: Actor,
        payload: Payload,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditRecord> {
        self.append(kind, actor, None, payload, timestamp)
    }

    /// Append a record about `package`.
    ///
    /// # Errors
    /// Returns error if the store rejects the write.
    pub fn record_for_package(
        &self,
        kind: AuditRecordType,
        actor: Actor,
        package: PackageName,
        payload: Payload,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditRecord> {
        self.append(kind, actor, Some(package), payload, timestamp)
    }

    fn append(
        &self,
        kind: AuditRecordType,
        actor: Actor,
        package: Option<PackageName>,
        payload: Payload,
        timestamp: DateTime<Utc>,
    ) -> Result<AuditRecord> {
        let mut next_id = self.next_id.lock();
        let id = *next_id;
        let record = AuditRecord::new(id, kind, timestamp, actor, package, payload);

        if let Err(e) = self.store.append(&record) {
            warn!(id, kind = %kind, error = %e, "failed to append audit record");
            return Err(e);
        }
        *next_id = id + 1;
        drop(next_id);

        info!(
            id,
            kind = %kind,
            actor = %record.actor(),
            package = record.package().map(ToString::to_string),
            "audit record appended"
        );
        Ok(record)
    }

    /// Log package creation.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn package_created(
        &self,
        actor: Actor,
        package: PackageName,
        repository: &str,
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("repository", repository.into()),
        ]);
        self.record_for_package(
            AuditRecordType::PackageCreated,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log package deletion.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn package_deleted(&self, actor: Actor, package: PackageName) -> Result<AuditRecord> {
        let details = payload([("name", package.full_name().into())]);
        self.record_for_package(
            AuditRecordType::PackageDeleted,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log a repository URL change.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn canonical_url_changed(
        &self,
        actor: Actor,
        package: PackageName,
        from: &str,
        to: &str,
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("repository_from", from.into()),
            ("repository_to", to.into()),
        ]);
        self.record_for_package(
            AuditRecordType::CanonicalUrlChanged,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log a package being marked abandoned.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn package_abandoned(
        &self,
        actor: Actor,
        package: PackageName,
        reason: AbandonmentReason,
        replacement: Option<&PackageName>,
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("reason", reason.as_str().into()),
            ("replacement", replacement.map(PackageName::full_name).into()),
        ]);
        self.record_for_package(
            AuditRecordType::PackageAbandoned,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log a package no longer being marked abandoned.
    ///
    /// `reason` is the provenance of the abandonment that was cleared.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn package_unabandoned(
        &self,
        actor: Actor,
        package: PackageName,
        reason: AbandonmentReason,
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("reason", reason.as_str().into()),
        ]);
        self.record_for_package(
            AuditRecordType::PackageUnabandoned,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log a change of a package's maintainers.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn package_transferred(
        &self,
        actor: Actor,
        package: PackageName,
        previous_maintainers: &[String],
        current_maintainers: &[String],
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("previous_maintainers", names(previous_maintainers)),
            ("current_maintainers", names(current_maintainers)),
        ]);
        self.record_for_package(
            AuditRecordType::PackageTransferred,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log a maintainer being added.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn maintainer_added(
        &self,
        actor: Actor,
        package: PackageName,
        maintainer: &str,
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("maintainer", maintainer.into()),
        ]);
        self.record_for_package(
            AuditRecordType::MaintainerAdded,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log a maintainer being removed.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn maintainer_removed(
        &self,
        actor: Actor,
        package: PackageName,
        maintainer: &str,
    ) -> Result<AuditRecord> {
        let details = payload([
            ("name", package.full_name().into()),
            ("maintainer", maintainer.into()),
        ]);
        self.record_for_package(
            AuditRecordType::MaintainerRemoved,
            actor,
            package,
            details,
            Utc::now(),
        )
    }

    /// Log account creation; the new user is the actor.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn user_created(&self, user: Actor) -> Result<AuditRecord> {
        let details = match &user {
            Actor::User { username, .. } => payload([("username", username.as_str().into())]),
            Actor::System => Payload::new(),
        };
        self.record(AuditRecordType::UserCreated, user, details, Utc::now())
    }

    /// Log a password reset request.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn password_reset_requested(&self, user: Actor) -> Result<AuditRecord> {
        self.record(
            AuditRecordType::PasswordResetRequested,
            user,
            Payload::new(),
            Utc::now(),
        )
    }

    /// Log a completed password reset.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn password_reset(&self, user: Actor) -> Result<AuditRecord> {
        self.record(
            AuditRecordType::PasswordReset,
            user,
            Payload::new(),
            Utc::now(),
        )
    }

    /// Log a version whose references moved during an update.
    ///
    /// # Errors
    /// Returns error if logging fails.
    pub fn version_reference_changed(&self, change: &ReferenceChangeRecord) -> Result<AuditRecord> {
        let details = change.audit_payload().as_map().clone();
        self.record_for_package(
            AuditRecordType::VersionReferenceChanged,
            Actor::System,
            change.version().package.clone(),
            details,
            Utc::now(),
        )
    }
}

/// Store chosen from configuration.
pub type ConfiguredStore = Box<dyn AuditStore>;

impl AuditRecorder<ConfiguredStore> {
    /// Recorder writing to the configured audit log, or to memory when no
    /// log path is set.
    ///
    /// # Errors
    /// Returns error if an existing log cannot be read.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let store: ConfiguredStore = match &config.audit_log {
            Some(path) => Box::new(JsonLinesAuditStore::new(path)),
            None => Box::new(MemoryAuditStore::new()),
        };
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use repertoire_core::{VersionId, VersionMetadata};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn pkg() -> PackageName {
        PackageName::new("acme", "package")
    }

    fn alice() -> Actor {
        Actor::user(1, "alice")
    }

    #[test]
    fn same_kind_and_actor_yields_two_records() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        let now = Utc::now();

        let first = recorder
            .record(
                AuditRecordType::EmailChanged,
                alice(),
                payload([("email_to", "a@example.org".into())]),
                now,
            )
            .unwrap();
        let second = recorder
            .record(
                AuditRecordType::EmailChanged,
                alice(),
                payload([("email_to", "b@example.org".into())]),
                now,
            )
            .unwrap();

        assert_ne!(first.id(), second.id());
        let stored = recorder.store().records_for_actor(&alice()).unwrap();
        assert_eq!(stored, vec![first, second]);
    }

    #[test]
    fn ids_break_timestamp_ties() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        let now = Utc::now();
        for _ in 0..5 {
            recorder
                .record(AuditRecordType::PasswordChanged, alice(), Payload::new(), now)
                .unwrap();
        }
        let ids: Vec<_> = recorder
            .store()
            .records_for_actor(&alice())
            .unwrap()
            .iter()
            .map(AuditRecord::id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn corrections_are_new_records() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        recorder.password_reset_requested(alice()).unwrap();
        recorder.password_reset(alice()).unwrap();

        let kinds: Vec<_> = recorder
            .store()
            .records_for_actor(&alice())
            .unwrap()
            .iter()
            .map(AuditRecord::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AuditRecordType::PasswordResetRequested,
                AuditRecordType::PasswordReset
            ]
        );
    }

    #[test]
    fn unabandon_records_reason() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        let record = recorder
            .package_unabandoned(Actor::System, pkg(), AbandonmentReason::RepositoryArchived)
            .unwrap();
        assert_eq!(record.kind(), AuditRecordType::PackageUnabandoned);
        assert_eq!(
            record.payload().get("reason").and_then(MetadataValue::as_str),
            Some("repository-archived")
        );
        assert_eq!(record.package(), Some(&pkg()));
    }

    #[test]
    fn abandon_records_replacement() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        let replacement = PackageName::new("acme", "successor");
        let record = recorder
            .package_abandoned(alice(), pkg(), AbandonmentReason::Manual, Some(&replacement))
            .unwrap();
        assert_eq!(
            record.payload().get("replacement").and_then(MetadataValue::as_str),
            Some("acme/successor")
        );

        let record = recorder
            .package_abandoned(alice(), pkg(), AbandonmentReason::ComposerJsonFlag, None)
            .unwrap();
        assert_eq!(record.payload().get("replacement"), Some(&MetadataValue::Null));
    }

    #[test]
    fn package_helpers_are_queryable_by_package() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        recorder
            .package_created(alice(), pkg(), "https://github.com/acme/package")
            .unwrap();
        recorder.maintainer_added(alice(), pkg(), "bob").unwrap();
        recorder
            .package_transferred(alice(), pkg(), &["alice".into()], &["bob".into()])
            .unwrap();
        recorder.maintainer_removed(alice(), pkg(), "alice").unwrap();
        recorder
            .canonical_url_changed(
                alice(),
                pkg(),
                "https://github.com/acme/package",
                "https://gitlab.com/acme/package",
            )
            .unwrap();
        recorder.package_deleted(alice(), pkg()).unwrap();
        recorder.user_created(Actor::user(2, "bob")).unwrap();

        let records = recorder.store().records_for_package(&pkg()).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].kind(), AuditRecordType::PackageCreated);
        assert_eq!(records[5].kind(), AuditRecordType::PackageDeleted);

        let transfer = &records[2];
        assert_eq!(
            transfer
                .payload()
                .get("current_maintainers")
                .and_then(MetadataValue::as_array)
                .map(<[_]>::len),
            Some(1)
        );
    }

    #[test]
    fn reference_change_is_recorded_as_system() {
        let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
        let change = ReferenceChangeRecord::new(
            VersionId::new(pkg(), "1.0.0.0"),
            VersionMetadata::new().with("source", VersionMetadata::new().with("reference", "a")),
            VersionMetadata::new().with("source", VersionMetadata::new().with("reference", "b")),
        );
        let record = recorder.version_reference_changed(&change).unwrap();
        assert_eq!(record.actor(), &Actor::System);
        assert_eq!(
            record.payload().get("source_to").and_then(MetadataValue::as_str),
            Some("b")
        );
    }

    #[test]
    fn recorder_resumes_sequence_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let recorder = AuditRecorder::new(JsonLinesAuditStore::new(&path)).unwrap();
        recorder.user_created(alice()).unwrap();
        recorder.password_reset_requested(alice()).unwrap();
        drop(recorder);

        let recorder = AuditRecorder::new(JsonLinesAuditStore::new(&path)).unwrap();
        let record = recorder.password_reset(alice()).unwrap();
        assert_eq!(record.id(), 3);
        assert_eq!(recorder.store().records().unwrap().len(), 3);
    }

    #[test]
    fn store_errors_surface() {
        struct ReadOnly;
        impl AuditStore for ReadOnly {
            fn append(&self, _: &AuditRecord) -> Result<()> {
                Err(AuditError::Store("read-only replica".into()))
            }
            fn records(&self) -> Result<Vec<AuditRecord>> {
                Ok(Vec::new())
            }
        }

        let recorder = AuditRecorder::new(ReadOnly).unwrap();
        assert!(matches!(
            recorder.user_created(alice()),
            Err(AuditError::Store(_))
        ));
    }

    #[test]
    fn from_config_selects_store() {
        let recorder = AuditRecorder::from_config(&RegistryConfig::default()).unwrap();
        recorder.user_created(alice()).unwrap();
        assert_eq!(recorder.store().records().unwrap().len(), 1);

        let dir = tempdir().unwrap();
        let config = RegistryConfig {
            audit_log: Some(dir.path().join("audit.jsonl")),
            ..RegistryConfig::default()
        };
        let recorder = AuditRecorder::from_config(&config).unwrap();
        recorder.user_created(alice()).unwrap();
        assert!(dir.path().join("audit.jsonl").exists());
    }

    #[test]
    fn shared_recorder_across_threads() {
        let recorder = Arc::new(AuditRecorder::new(MemoryAuditStore::new()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        recorder.user_created(Actor::user(i, format!("user{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut ids: Vec<_> = recorder
            .store()
            .records()
            .unwrap()
            .iter()
            .map(AuditRecord::id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn shared_recorder_over_json_lines_never_rejects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let recorder = Arc::new(AuditRecorder::new(JsonLinesAuditStore::new(&path)).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| {
                            recorder
                                .user_created(Actor::user(i, format!("user{i}")))
                                .is_err()
                        })
                        .count()
                })
            })
            .collect();
        let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(failures, 0);

        let content = std::fs::read_to_string(&path).unwrap();
        let written: Vec<u64> = content
            .lines()
            .map(|line| sonic_rs::from_str::<AuditRecord>(line).unwrap().id())
            .collect();
        assert_eq!(written, (1..=400).collect::<Vec<_>>());
    }

    #[test]
    fn failed_append_does_not_consume_id() {
        struct FlakyStore {
            inner: MemoryAuditStore,
            fail_next: parking_lot::Mutex<bool>,
        }
        impl AuditStore for FlakyStore {
            fn append(&self, record: &AuditRecord) -> Result<()> {
                let mut fail = self.fail_next.lock();
                if *fail {
                    *fail = false;
                    return Err(AuditError::Store("connection reset".into()));
                }
                self.inner.append(record)
            }
            fn records(&self) -> Result<Vec<AuditRecord>> {
                self.inner.records()
            }
        }

        let recorder = AuditRecorder::new(FlakyStore {
            inner: MemoryAuditStore::new(),
            fail_next: parking_lot::Mutex::new(true),
        })
        .unwrap();
        assert!(recorder.user_created(alice()).is_err());
        assert_eq!(recorder.user_created(alice()).unwrap().id(), 1);
    }
}
