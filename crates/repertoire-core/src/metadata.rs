//! Typed representation of published version metadata.
//!
//! Registry metadata is free-form JSON. [`MetadataValue`] gives it a closed
//! set of variants so comparisons can be written once over the variants, and
//! [`VersionMetadata`] is the top-level mapping that describes one version
//! (`name`, `description`, `source`, `dist`, `time`, `require`, ...).

use crate::{Error, Result};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Key-ordered JSON object.
pub type Map = BTreeMap<String, MetadataValue>;

/// JSON number.
///
/// Integers compare exactly; a float equals an integer when they denote the
/// same numeric value.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Non-negative integer.
    PosInt(u64),
    /// Negative integer.
    NegInt(i64),
    /// Floating point.
    Float(f64),
}

impl Number {
    fn as_i128(self) -> Option<i128> {
        match self {
            Self::PosInt(n) => Some(i128::from(n)),
            Self::NegInt(n) => Some(i128::from(n)),
            Self::Float(_) => None,
        }
    }

    /// Numeric value as `f64`.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::PosInt(n) => n as f64,
            Self::NegInt(n) => n as f64,
            Self::Float(f) => f,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PosInt(n) => write!(f, "{n}"),
            Self::NegInt(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

/// A JSON value appearing in version metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetadataValue {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// Ordered JSON array.
    Array(Vec<MetadataValue>),
    /// JSON object.
    Object(Map),
}

impl MetadataValue {
    /// Name of the variant, used in type-mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Borrow as string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Check for `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Look up a key when this value is an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<u64> for MetadataValue {
    fn from(n: u64) -> Self {
        Self::Number(Number::PosInt(n))
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        if n < 0 {
            Self::Number(Number::NegInt(n))
        } else {
            Self::Number(Number::PosInt(n as u64))
        }
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        Self::Number(Number::Float(n))
    }
}

impl<T: Into<Self>> From<Option<T>> for MetadataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Self>> for MetadataValue {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

impl From<Map> for MetadataValue {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

impl From<VersionMetadata> for MetadataValue {
    fn from(meta: VersionMetadata) -> Self {
        Self::Object(meta.0)
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(Number::PosInt(n)) => serializer.serialize_u64(*n),
            Self::Number(Number::NegInt(n)) => serializer.serialize_i64(*n),
            Self::Number(Number::Float(n)) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for MetadataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = MetadataValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("any JSON value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::from(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::String(v))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(MetadataValue::Null)
            }

            fn visit_some<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> std::result::Result<Self::Value, D::Error> {
                MetadataValue::deserialize(deserializer)
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(MetadataValue::Array(items))
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = Map::new();
                while let Some((key, value)) = access.next_entry::<String, MetadataValue>()? {
                    map.insert(key, value);
                }
                Ok(MetadataValue::Object(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Publishable descriptor of one package version.
///
/// `source` and `dist` are sub-objects carrying a `reference` (commit, tag or
/// branch pointer). `time` is the release timestamp and is treated as
/// volatile by the differ.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersionMetadata(Map);

impl VersionMetadata {
    /// Empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a top-level key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a top-level key.
    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.0.remove(key)
    }

    /// Look up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Check for a top-level key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over top-level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map {
        &self.0
    }

    /// Copy of this descriptor without the given top-level keys.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// `reference` of the `source` or `dist` section, `None` when absent or
    /// `null`. Non-string references are returned as stored.
    #[must_use]
    pub fn reference(&self, section: &str) -> Option<&MetadataValue> {
        self.0
            .get(section)?
            .get("reference")
            .filter(|v| !v.is_null())
    }

    /// Source reference.
    #[must_use]
    pub fn source_reference(&self) -> Option<&MetadataValue> {
        self.reference("source")
    }

    /// Dist reference.
    #[must_use]
    pub fn dist_reference(&self) -> Option<&MetadataValue> {
        self.reference("dist")
    }
}

impl TryFrom<MetadataValue> for VersionMetadata {
    type Error = Error;

    fn try_from(value: MetadataValue) -> Result<Self> {
        match value {
            MetadataValue::Object(map) => Ok(Self(map)),
            other => Err(Error::TypeMismatch {
                expected: "object",
                found: other.kind(),
            }),
        }
    }
}

impl From<Map> for VersionMetadata {
    fn from(map: Map) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, MetadataValue)> for VersionMetadata {
    fn from_iter<I: IntoIterator<Item = (K, MetadataValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Serialize for VersionMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VersionMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = MetadataValue::deserialize(deserializer)?;
        Self::try_from(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{from_json, to_json};

    fn reference(r: &str) -> MetadataValue {
        VersionMetadata::new().with("reference", r).into()
    }

    #[test]
    fn references_are_read_from_sections() {
        let meta = VersionMetadata::new()
            .with("source", reference("abc123"))
            .with("dist", reference("def456"));
        assert_eq!(
            meta.source_reference().and_then(MetadataValue::as_str),
            Some("abc123")
        );
        assert_eq!(
            meta.dist_reference().and_then(MetadataValue::as_str),
            Some("def456")
        );
    }

    #[test]
    fn missing_and_null_references_are_none() {
        let meta = VersionMetadata::new().with(
            "dist",
            VersionMetadata::new().with("reference", MetadataValue::Null),
        );
        assert_eq!(meta.source_reference(), None);
        assert_eq!(meta.dist_reference(), None);
    }

    #[test]
    fn non_string_references_are_kept() {
        let meta = VersionMetadata::new()
            .with("source", VersionMetadata::new().with("reference", 123_u64));
        assert_eq!(meta.source_reference(), Some(&MetadataValue::from(123_u64)));
    }

    #[test]
    fn without_drops_keys() {
        let meta = VersionMetadata::new()
            .with("name", "acme/package")
            .with("time", "2024-01-01T00:00:00+00:00");
        let stripped = meta.without(&["time", "dist"]);
        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains_key("name"));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(MetadataValue::from(1u64), MetadataValue::from(1i64));
        assert_eq!(MetadataValue::from(2u64), MetadataValue::from(2.0));
        assert_ne!(MetadataValue::from(-1i64), MetadataValue::from(1u64));
    }

    #[test]
    fn parses_nested_document() {
        let meta: VersionMetadata = from_json(
            r#"{"name":"acme/package","require":{"php":">=8.1"},"keywords":["a","b"],"extra":null,"n":-3,"f":1.5}"#,
        )
        .unwrap();
        assert_eq!(
            meta.get("require")
                .and_then(|r| r.get("php"))
                .and_then(MetadataValue::as_str),
            Some(">=8.1")
        );
        assert_eq!(
            meta.get("keywords")
                .and_then(MetadataValue::as_array)
                .map(<[_]>::len),
            Some(2)
        );
        assert!(meta.get("extra").is_some_and(MetadataValue::is_null));
        assert_eq!(meta.get("n"), Some(&MetadataValue::from(-3i64)));

        let back: VersionMetadata = from_json(&to_json(&meta).unwrap()).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn scalar_is_not_metadata() {
        let err = VersionMetadata::try_from(MetadataValue::from("nope")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { found: "string", .. }));
        assert!(from_json::<VersionMetadata>("42").is_err());
    }
}
