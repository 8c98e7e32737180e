//! Revision differ for published package metadata.
//!
//! During an update pass every version is re-read from its repository and
//! compared with the snapshot already published. Two independent questions
//! are answered:
//!
//! - did the **references** move? The `source.reference` or
//!   `dist.reference` now points at a different commit, tag or branch.
//! - did the **descriptive metadata** change? Everything except `source`,
//!   `dist` and `time`, compared key by key.
//!
//! A reference move produces a [`ReferenceChangeRecord`] that is handed to
//! the registered [`ReferenceChangeListener`]s.
//!
//! ## Example
//!
//! ```
//! use repertoire_core::{PackageName, VersionId, metadata_from_json};
//! use repertoire_diff::{RevisionDiffer, has_metadata_changed};
//!
//! let old = metadata_from_json(
//!     r#"{"name":"acme/package","source":{"reference":"aaa"},"time":"2024-01-01"}"#,
//! )
//! .unwrap();
//! let new = metadata_from_json(
//!     r#"{"name":"acme/package","source":{"reference":"bbb"},"time":"2024-02-01"}"#,
//! )
//! .unwrap();
//!
//! assert!(!has_metadata_changed(&old, &new));
//!
//! let version = VersionId::new(PackageName::new("acme", "package"), "dev-main");
//! let record = RevisionDiffer::new().compare(version, old, new).unwrap();
//! assert_eq!(record.source_to().and_then(|r| r.as_str()), Some("bbb"));
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod compare;
pub mod differ;
pub mod event;
pub mod listener;

pub use compare::{deep_equals, maps_equal};
pub use differ::{IGNORED_KEYS, RevisionDiffer, has_metadata_changed, has_reference_changed};
pub use event::ReferenceChangeRecord;
pub use listener::{ReferenceChangeDispatcher, ReferenceChangeListener};
