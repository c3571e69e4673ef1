//! Ordered metadata attached to a record group.
//!
//! This module provides [`Metadata`], a wrapper around [`IndexMap`] holding the key/value pairs
//! read from the comment lines that precede a group's records. A key may have no value (a
//! singleton comment such as `# newdoc`).
//!
//! Insertion order is the order the comments were read, and it is the order they are written
//! back. Re-inserting an existing key replaces its value but keeps its position.
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::Metadata;
//!
//! let mut meta = Metadata::new();
//! meta.insert("sent_id", Some("s1"));
//! meta.insert("newdoc", None::<&str>);
//!
//! assert_eq!(meta.len(), 2);
//! assert_eq!(meta.value("sent_id"), Some("s1"));
//! assert!(meta.contains_key("newdoc"));
//! assert_eq!(meta.value("newdoc"), None);
//! ```

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// An ordered map of comment keys to optional values.
///
/// # Examples
///
/// ```rust
/// use conll_schema::Metadata;
///
/// let mut meta = Metadata::new();
/// meta.insert("text", Some("first"));
/// meta.insert("sent_id", Some("1"));
/// meta.insert("text", Some("second"));
///
/// // Overwriting keeps the original position
/// let keys: Vec<_> = meta.keys().map(String::as_str).collect();
/// assert_eq!(keys, vec!["text", "sent_id"]);
/// assert_eq!(meta.value("text"), Some("second"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(IndexMap<String, Option<String>>);

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Metadata(IndexMap::new())
    }

    /// Inserts a key with an optional value.
    ///
    /// If the key was present its previous value is returned and its position is kept.
    pub fn insert<K, V>(&mut self, key: K, value: Option<V>) -> Option<Option<String>>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), value.map(Into::into))
    }

    /// Returns the entry for `key`: `None` when the key is missing, `Some(None)` for a singleton.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Option<String>> {
        self.0.get(key)
    }

    /// Returns the value for `key`, flattening missing keys and singletons to `None`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, shifting later entries up so the remaining order is preserved.
    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Option<String>> {
        self.0.keys()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Option<String>> {
        self.0.iter()
    }
}

impl Serialize for Metadata {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter())
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a Option<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Metadata {
    type Item = (String, Option<String>);
    type IntoIter = indexmap::map::IntoIter<String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Option<String>)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, Option<String>)>>(iter: T) -> Self {
        Metadata(IndexMap::from_iter(iter))
    }
}
