//! Core types shared by the Repertoire registry components.
//!
//! - [`metadata`]: typed JSON values and the per-version metadata descriptor
//! - [`package`]: package and version identifiers
//! - [`taxonomy`]: audit record types and abandonment reasons
//! - [`json`]: sonic-rs backed encoding helpers

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod json;
pub mod metadata;
pub mod package;
pub mod taxonomy;

pub use error::{Error, Result};
pub use json::{from_json, metadata_from_json, to_json};
pub use metadata::{Map, MetadataValue, Number, VersionMetadata};
pub use package::{PackageName, VersionId};
pub use taxonomy::{AbandonmentReason, AuditCategory, AuditRecordType};
