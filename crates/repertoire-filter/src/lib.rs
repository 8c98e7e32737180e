//! Filter-list and malware flag aggregation.
//!
//! Curated filter lists flag version ranges of packages (malware, spam, ...).
//! The flag repository returns one row per flagged version; this crate folds
//! those rows into the compact per-package, per-list view published in
//! metadata dumps:
//!
//! ```json
//! {
//!     "acme/package": {
//!         "test": [
//!             {"constraint": "1.0.0 || 2.0.0", "url": "https://packagist.org/filter-lists/test", "category": "malware"}
//!         ]
//!     }
//! }
//! ```
//!
//! ## Example
//!
//! ```
//! use repertoire_config::RegistryConfig;
//! use repertoire_filter::{FilterListAggregator, FlaggedVersionRow, MemoryFlagRepository};
//!
//! let repo = MemoryFlagRepository::with_rows([
//!     FlaggedVersionRow::new("acme/package", "1.0.0", "malware", "test"),
//!     FlaggedVersionRow::new("acme/package", "2.0.0", "malware", "test"),
//! ]);
//! let aggregator = FilterListAggregator::from_config(&repo, &RegistryConfig::default());
//!
//! let data = aggregator.flagged_data(["acme/package"]).unwrap();
//! assert_eq!(data["acme/package"]["test"][0].constraint, "1.0.0 || 2.0.0");
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod error;
pub mod flag;
pub mod repository;

pub use aggregator::{FilterListAggregator, FlaggedData, PackageFlags, aggregate, to_dump_json};
pub use error::{FilterError, Result};
pub use flag::{CONSTRAINT_SEPARATOR, FilterListFlag, FlaggedVersionRow};
pub use repository::{
    BaseUrlResolver, FlaggedVersionRepository, ListUrlResolver, MemoryFlagRepository,
};
pub use repertoire_config::ConstraintOrder;
