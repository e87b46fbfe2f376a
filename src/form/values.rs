use std::borrow::{Borrow, Cow};
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(Cow<'static, str>);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(value: &FieldKey) -> Self {
        value.clone()
    }
}

/// Insertion-ordered map from field key to `V`.
///
/// Forms enumerate fields in declaration order. Equality ignores that order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMap<V> {
    entries: IndexMap<FieldKey, V>,
}

/// Current (or initial) string value of every field.
pub type FormValues = FieldMap<String>;

/// Output of one full validation pass. `None` is the only "no error" value; an empty
/// message still counts as an error.
pub type FieldErrors = FieldMap<Option<String>>;

/// Aggregate of the fields that currently have an error.
pub type FormErrors = FieldMap<String>;

impl<V> FieldMap<V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Replaces the value of an existing key in place, keeping its position, or appends.
    pub fn insert(&mut self, key: impl Into<FieldKey>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    pub fn with(mut self, key: impl Into<FieldKey>, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FieldMap<String> {
    /// Value of `key`, borrowed as `&str`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl FieldMap<Option<String>> {
    /// Error of `key` after a validation pass. Keys the validator left out have no error.
    pub fn error(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Option::as_deref)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.values().any(Option::is_some)
    }
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, W, V> FromIterator<(K, W)> for FieldMap<V>
where
    K: Into<FieldKey>,
    W: Into<V>,
{
    fn from_iter<I: IntoIterator<Item = (K, W)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K, W, V, const N: usize> From<[(K, W); N]> for FieldMap<V>
where
    K: Into<FieldKey>,
    W: Into<V>,
{
    fn from(entries: [(K, W); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<V> IntoIterator for FieldMap<V> {
    type Item = (FieldKey, V);
    type IntoIter = indexmap::map::IntoIter<FieldKey, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position_of_a_key() {
        let mut values = FormValues::from([("a", "1"), ("b", "2")]);
        assert_eq!(values.insert("a", "3".to_string()), Some("1".to_string()));
        let keys = values.keys().map(FieldKey::as_str).collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(values.value("a"), Some("3"));
        assert!(values.contains_key("b"));
        assert!(!values.contains_key("c"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let forward = FormValues::from([("a", "1"), ("b", "2")]);
        let backward = FormValues::from([("b", "2"), ("a", "1")]);
        assert_eq!(forward, backward);
        assert_ne!(forward, FormValues::from([("a", "1"), ("b", "3")]));
    }

    #[test]
    fn empty_error_message_still_counts_as_error() {
        let errors = FieldErrors::new()
            .with("a", None)
            .with("b", Some(String::new()));
        assert!(errors.has_errors());
        assert_eq!(errors.error("a"), None);
        assert_eq!(errors.error("b"), Some(""));
        assert_eq!(errors.error("missing"), None);
    }
}
