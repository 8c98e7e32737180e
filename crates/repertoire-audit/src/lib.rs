//! Append-only audit log for registry mutations.
//!
//! Every security-relevant operation (package lifecycle, maintainer changes,
//! account changes, version reference moves) produces one immutable
//! [`AuditRecord`]. Records are never updated; a correction is a new record.
//!
//! ## Example
//!
//! ```
//! use repertoire_audit::{Actor, AuditRecorder, AuditStore, MemoryAuditStore};
//! use repertoire_core::PackageName;
//!
//! let recorder = AuditRecorder::new(MemoryAuditStore::new()).unwrap();
//! let package = PackageName::new("acme", "package");
//! recorder
//!     .package_created(
//!         Actor::user(1, "alice"),
//!         package.clone(),
//!         "https://github.com/acme/package",
//!     )
//!     .unwrap();
//!
//! assert_eq!(recorder.store().records_for_package(&package).unwrap().len(), 1);
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod listener;
pub mod record;
pub mod recorder;
pub mod store;

pub use error::{AuditError, Result};
pub use listener::ReferenceChangeAuditor;
pub use record::{Actor, AuditRecord, Payload, sort_records};
pub use recorder::{AuditRecorder, ConfiguredStore};
pub use store::{AuditStore, JsonLinesAuditStore, MemoryAuditStore};
pub use repertoire_core::{AbandonmentReason, AuditCategory, AuditRecordType};
