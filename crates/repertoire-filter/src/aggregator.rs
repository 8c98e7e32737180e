//! Grouping of flagged rows into per-package, per-list flags.

use crate::error::Result;
use crate::flag::{CONSTRAINT_SEPARATOR, FilterListFlag, FlaggedVersionRow};
use crate::repository::{BaseUrlResolver, FlaggedVersionRepository, ListUrlResolver};
use ahash::AHashMap;
use repertoire_config::{ConstraintOrder, RegistryConfig};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use url::Url;

/// Flags per list, for one package.
pub type PackageFlags = BTreeMap<String, Vec<FilterListFlag>>;

/// Flags per package, per list.
pub type FlaggedData = BTreeMap<String, PackageFlags>;

/// One `(package, list, category)` group and the versions collected for it.
#[derive(Debug)]
struct Group<'a> {
    package: &'a str,
    list: &'a str,
    category: &'a str,
    versions: Vec<&'a str>,
}

/// Group rows and merge each group's versions into one constraint.
///
/// Groups appear in first-encounter order within a list, and versions keep
/// the order rows were supplied in unless `order` asks for sorting. Every row
/// contributes its version, repeats included. List URLs are resolved once per
/// list.
///
/// # Errors
/// Returns error if a list URL cannot be resolved.
pub fn aggregate(
    rows: &[FlaggedVersionRow],
    urls: &impl ListUrlResolver,
    order: ConstraintOrder,
) -> Result<FlaggedData> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut index: AHashMap<(&str, &str, &str), usize> = AHashMap::new();

    for row in rows {
        let key = (
            row.package_name.as_str(),
            row.list.as_str(),
            row.category.as_str(),
        );
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                package: key.0,
                list: key.1,
                category: key.2,
                versions: Vec::new(),
            });
            groups.len() - 1
        });

        groups[slot].versions.push(&row.version);
    }

    let mut list_urls: AHashMap<&str, Url> = AHashMap::new();
    let mut data = FlaggedData::new();

    for mut group in groups {
        if order == ConstraintOrder::Lexicographic {
            group.versions.sort_unstable();
        }

        let url = match list_urls.get(group.list) {
            Some(url) => url.clone(),
            None => {
                let url = urls.list_url(group.list)?;
                list_urls.insert(group.list, url.clone());
                url
            }
        };

        let flag = FilterListFlag::new(
            group.versions.join(CONSTRAINT_SEPARATOR),
            url,
            group.category,
        );
        data.entry(group.package.to_string())
            .or_default()
            .entry(group.list.to_string())
            .or_default()
            .push(flag);
    }

    Ok(data)
}

/// Builds the filter-list section of a metadata dump.
#[derive(Debug)]
pub struct FilterListAggregator<R, U = BaseUrlResolver> {
    repository: R,
    urls: U,
    order: ConstraintOrder,
}

impl<R: FlaggedVersionRepository, U: ListUrlResolver> FilterListAggregator<R, U> {
    /// Aggregator over the given collaborators, keeping fetch order.
    #[must_use]
    pub fn new(repository: R, urls: U) -> Self {
        Self {
            repository,
            urls,
            order: ConstraintOrder::FetchOrder,
        }
    }

    /// Set the version order used inside merged constraints.
    #[must_use]
    pub const fn with_order(mut self, order: ConstraintOrder) -> Self {
        self.order = order;
        self
    }

    /// Version order used inside merged constraints.
    #[must_use]
    pub const fn order(&self) -> ConstraintOrder {
        self.order
    }

    /// Flags for the requested packages, grouped by package then list.
    ///
    /// Packages without any flag are absent from the result; no flags at all
    /// gives an empty map.
    ///
    /// # Errors
    /// Returns error if the repository fetch or URL resolution fails.
    pub fn flagged_data<I, S>(&self, package_names: I) -> Result<FlaggedData>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: BTreeSet<String> = package_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        if requested.is_empty() {
            return Ok(FlaggedData::new());
        }

        let names: Vec<String> = requested.iter().cloned().collect();
        let rows = self.repository.package_versions_flagged_as_malware(&names)?;

        let (rows, unexpected): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|row| requested.contains(&row.package_name));
        if !unexpected.is_empty() {
            warn!(
                count = unexpected.len(),
                "flag repository returned rows for packages that were not requested"
            );
        }

        let data = aggregate(&rows, &self.urls, self.order)?;
        debug!(
            requested = requested.len(),
            rows = rows.len(),
            flagged = data.len(),
            "filter list flags aggregated"
        );
        Ok(data)
    }
}

impl<R: FlaggedVersionRepository> FilterListAggregator<R, BaseUrlResolver> {
    /// Aggregator using the configured base URL and constraint order.
    #[must_use]
    pub fn from_config(repository: R, config: &RegistryConfig) -> Self {
        Self::new(repository, BaseUrlResolver::from_config(config))
            .with_order(config.constraint_order)
    }
}

/// Serialize flagged data in the shape published in metadata dumps.
///
/// # Errors
/// Returns error if serialization fails.
pub fn to_dump_json(data: &FlaggedData) -> Result<String> {
    Ok(repertoire_core::to_json(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::repository::MemoryFlagRepository;
    use std::cell::Cell;

    fn row(package: &str, version: &str, category: &str, list: &str) -> FlaggedVersionRow {
        FlaggedVersionRow::new(package, version, category, list)
    }

    fn resolver() -> BaseUrlResolver {
        BaseUrlResolver::from_config(&RegistryConfig::default())
    }

    fn test_url() -> Url {
        Url::parse("https://packagist.org/filter-lists/test").unwrap()
    }

    #[test]
    fn merges_versions_of_one_group() {
        let repo = MemoryFlagRepository::with_rows([
            row("acme/package", "1.0.0", "malware", "test"),
            row("acme/package", "2.0.0", "malware", "test"),
        ]);
        let aggregator = FilterListAggregator::new(&repo, resolver());

        let data = aggregator.flagged_data(["acme/package"]).unwrap();

        let mut expected = FlaggedData::new();
        expected.entry("acme/package".to_string()).or_default().insert(
            "test".to_string(),
            vec![FilterListFlag::new("1.0.0 || 2.0.0", test_url(), "malware")],
        );
        assert_eq!(data, expected);
        assert!(data["acme/package"]["test"][0].reason.is_none());
    }

    #[test]
    fn no_rows_gives_empty_map() {
        let repo =
            MemoryFlagRepository::with_rows([row("other/package", "1.0.0", "malware", "test")]);
        let aggregator = FilterListAggregator::new(&repo, resolver());

        let data = aggregator
            .flagged_data(["acme/package", "acme/other"])
            .unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn no_names_skips_fetch() {
        struct Failing;
        impl FlaggedVersionRepository for Failing {
            fn package_versions_flagged_as_malware(
                &self,
                _: &[String],
            ) -> Result<Vec<FlaggedVersionRow>> {
                Err(FilterError::Repository("unreachable".into()))
            }
        }

        let aggregator = FilterListAggregator::new(Failing, resolver());
        assert!(aggregator.flagged_data(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn repository_errors_propagate() {
        struct Down;
        impl FlaggedVersionRepository for Down {
            fn package_versions_flagged_as_malware(
                &self,
                _: &[String],
            ) -> Result<Vec<FlaggedVersionRow>> {
                Err(FilterError::Repository("connection refused".into()))
            }
        }

        let aggregator = FilterListAggregator::new(Down, resolver());
        assert!(matches!(
            aggregator.flagged_data(["acme/package"]),
            Err(FilterError::Repository(_))
        ));
    }

    #[test]
    fn groups_by_list_and_category() {
        let rows = vec![
            row("acme/package", "1.0.0", "malware", "test"),
            row("acme/package", "1.1.0", "spam", "test"),
            row("acme/package", "3.0.0", "malware", "other"),
            row("acme/package", "1.2.0", "malware", "test"),
            row("beta/lib", "0.1.0", "malware", "test"),
        ];
        let data = aggregate(&rows, &resolver(), ConstraintOrder::FetchOrder).unwrap();

        assert_eq!(data.len(), 2);
        let acme = &data["acme/package"];
        assert_eq!(acme.len(), 2);

        let test = &acme["test"];
        assert_eq!(test.len(), 2);
        assert_eq!(test[0].constraint, "1.0.0 || 1.2.0");
        assert_eq!(test[0].category, "malware");
        assert_eq!(test[1].constraint, "1.1.0");
        assert_eq!(test[1].category, "spam");

        assert_eq!(acme["other"][0].constraint, "3.0.0");
        assert_eq!(
            acme["other"][0].url.as_str(),
            "https://packagist.org/filter-lists/other"
        );
        assert_eq!(data["beta/lib"]["test"][0].constraint, "0.1.0");
    }

    #[test]
    fn fetch_order_is_preserved() {
        let rows = vec![
            row("acme/package", "2.0.0", "malware", "test"),
            row("acme/package", "1.0.0", "malware", "test"),
        ];
        let data = aggregate(&rows, &resolver(), ConstraintOrder::FetchOrder).unwrap();
        assert_eq!(data["acme/package"]["test"][0].constraint, "2.0.0 || 1.0.0");

        let data = aggregate(&rows, &resolver(), ConstraintOrder::Lexicographic).unwrap();
        assert_eq!(data["acme/package"]["test"][0].constraint, "1.0.0 || 2.0.0");
    }

    #[test]
    fn repeated_versions_are_all_joined() {
        let rows = vec![
            row("acme/package", "1.0.0", "malware", "test"),
            row("acme/package", "1.0.0", "malware", "test"),
            row("acme/package", "2.0.0", "malware", "test"),
        ];
        let data = aggregate(&rows, &resolver(), ConstraintOrder::FetchOrder).unwrap();
        assert_eq!(
            data["acme/package"]["test"][0].constraint,
            "1.0.0 || 1.0.0 || 2.0.0"
        );
    }

    #[test]
    fn list_url_resolved_once_per_list() {
        struct Counting(Cell<usize>);
        impl ListUrlResolver for Counting {
            fn list_url(&self, list: &str) -> Result<Url> {
                self.0.set(self.0.get() + 1);
                Ok(Url::parse(&format!("https://lists.example.org/{list}"))?)
            }
        }

        let rows = vec![
            row("a/a", "1", "malware", "test"),
            row("b/b", "1", "malware", "test"),
            row("c/c", "1", "spam", "test"),
        ];
        let resolver = Counting(Cell::new(0));
        aggregate(&rows, &resolver, ConstraintOrder::FetchOrder).unwrap();
        assert_eq!(resolver.0.get(), 1);
    }

    #[test]
    fn unrequested_rows_are_dropped() {
        struct Leaky;
        impl FlaggedVersionRepository for Leaky {
            fn package_versions_flagged_as_malware(
                &self,
                _: &[String],
            ) -> Result<Vec<FlaggedVersionRow>> {
                Ok(vec![
                    FlaggedVersionRow::new("acme/package", "1.0.0", "malware", "test"),
                    FlaggedVersionRow::new("stray/package", "1.0.0", "malware", "test"),
                ])
            }
        }

        let data = FilterListAggregator::new(Leaky, resolver())
            .flagged_data(["acme/package"])
            .unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["acme/package"]);
    }

    #[test]
    fn from_config_uses_order_and_base_url() {
        let config = RegistryConfig {
            base_url: Url::parse("https://mirror.example.org/").unwrap(),
            constraint_order: ConstraintOrder::Lexicographic,
            ..RegistryConfig::default()
        };
        let repo = MemoryFlagRepository::with_rows([
            row("acme/package", "2.0.0", "malware", "test"),
            row("acme/package", "1.0.0", "malware", "test"),
        ]);
        let aggregator = FilterListAggregator::from_config(&repo, &config);
        assert_eq!(aggregator.order(), ConstraintOrder::Lexicographic);

        let data = aggregator.flagged_data(["acme/package"]).unwrap();
        let flag = &data["acme/package"]["test"][0];
        assert_eq!(flag.constraint, "1.0.0 || 2.0.0");
        assert_eq!(flag.url.as_str(), "https://mirror.example.org/filter-lists/test");
    }

    #[test]
    fn dump_shape() {
        let rows = vec![row("acme/package", "1.0.0", "malware", "test")];
        let data = aggregate(&rows, &resolver(), ConstraintOrder::FetchOrder).unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_dump_json(&data).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "acme/package": {
                    "test": [{
                        "constraint": "1.0.0",
                        "url": "https://packagist.org/filter-lists/test",
                        "category": "malware"
                    }]
                }
            })
        );
    }
}
