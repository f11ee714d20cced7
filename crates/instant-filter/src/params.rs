//! Raw filter entries as decoded from a query string.

use indexmap::IndexMap;

use crate::value::RawValue;

/// Prefix of keys owned by pagination, never compiled as filters.
pub const RESERVED_PREFIX: &str = "__";

/// Ordered `key → value` entries of one request.
///
/// Repeated keys collapse into a single [`RawValue::List`] at the position
/// the key was first seen.
///
/// # Example
///
/// ```
/// use instant_filter::{RawFilters, RawValue};
///
/// let filters = RawFilters::from_query_string("tag=a&age__gt=3&tag=b&__limit=10");
/// assert_eq!(filters.get("tag"), Some(&RawValue::from(vec!["a", "b"])));
/// assert_eq!(filters.get("age__gt"), Some(&RawValue::from("3")));
/// assert_eq!(filters.filter_entries().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilters {
    entries: IndexMap<String, RawValue>,
}

impl RawFilters {
    /// Creates an empty set.
    pub fn new() -> Self {
        RawFilters::default()
    }

    /// Collects key/value pairs, grouping repeated keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut filters = RawFilters::new();
        for (key, value) in pairs {
            filters.append(key, value);
        }
        filters
    }

    /// Decodes an `application/x-www-form-urlencoded` query string. A leading
    /// `?` is ignored.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        RawFilters::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Adds one occurrence of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.entries.entry(key.into()) {
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(RawValue::Single(value));
            }
            indexmap::map::Entry::Occupied(mut slot) => {
                let grouped = match slot.get_mut() {
                    RawValue::List(items) => {
                        items.push(value);
                        return;
                    }
                    RawValue::Single(first) => RawValue::List(vec![std::mem::take(first), value]),
                };
                slot.insert(grouped);
            }
        }
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Looks a key up.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    /// All entries, reserved ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries that are filters, i.e. not prefixed with [`RESERVED_PREFIX`].
    pub fn filter_entries(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.iter().filter(|(k, _)| !k.starts_with(RESERVED_PREFIX))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there is no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = RawFilters::new();
        for (key, value) in iter {
            filters.insert(key, value);
        }
        filters
    }
}

impl<'a> IntoIterator for &'a RawFilters {
    type Item = (&'a str, &'a RawValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a RawValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
