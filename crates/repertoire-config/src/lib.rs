//! Layered configuration for the Repertoire registry engine.
//!
//! Sources are merged in priority order:
//!   1. Built-in defaults
//!   2. Config file (JSON, kebab-case keys)
//!   3. Environment variables (`REPERTOIRE_*`)
//!
//! # Config file
//!
//! ```json
//! {
//!     "base-url": "https://packagist.org/",
//!     "audit-log": "/var/lib/repertoire/audit.jsonl",
//!     "constraint-order": "fetch"
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `REPERTOIRE_BASE_URL` - Public base URL, used to build filter-list links
//! - `REPERTOIRE_AUDIT_LOG` - Path of the JSON-lines audit log
//! - `REPERTOIRE_CONSTRAINT_ORDER` - `fetch` or `lexicographic`

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod env;
pub mod error;
pub mod loader;
pub mod types;

pub use env::{EnvConfig, RepertoireEnvVar};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, ConfigSource};
pub use types::{ConfigFile, ConstraintOrder, DEFAULT_BASE_URL, RegistryConfig, parse_base_url};
