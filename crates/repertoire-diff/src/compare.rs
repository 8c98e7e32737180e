//! Deep equality over metadata values.

use repertoire_core::{Map, MetadataValue};

/// Compare two metadata values.
///
/// Objects are compared by key: same number of keys, and every key on one
/// side present on the other with a deep-equal value. Key order never
/// matters. Every other value, arrays included, is compared by exact value
/// equality, so the order of array elements is significant.
#[must_use]
pub fn deep_equals(a: &MetadataValue, b: &MetadataValue) -> bool {
    match (a, b) {
        (MetadataValue::Object(left), MetadataValue::Object(right)) => maps_equal(left, right),
        _ => a == b,
    }
}

/// Compare two objects key by key.
#[must_use]
pub fn maps_equal(left: &Map, right: &Map) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter().all(|(key, value)| {
        right
            .get(key)
            .is_some_and(|other| deep_equals(value, other))
    })
}
