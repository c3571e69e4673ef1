//! Decoded records.
//!
//! A [`Record`] holds one [`Value`] per schema field, in column order. The field names live in a
//! [`Layout`] shared, through an `Arc`, by every record produced by the same
//! [`Format`](crate::Format), so a record costs one `Vec` of values.

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexSet;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Ordered field names of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    names: IndexSet<String>,
}

impl Layout {
    pub(crate) fn new(names: IndexSet<String>) -> Self {
        Layout { names }
    }

    /// Column position of a field.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One decoded line.
///
/// # Examples
///
/// ```rust
/// use conll_schema::{conllu, Value};
///
/// let format = conllu::format().unwrap();
/// let mut token = format
///     .parse_record("1\tThe\tthe\tDET\tDT\tDefinite=Def\t2\tdet\t_\t_")
///     .unwrap();
///
/// assert_eq!(token.str("form"), Some("The"));
/// token.set("upos", "PRON").unwrap();
/// assert_eq!(token.get("upos"), Some(&Value::from("PRON")));
/// assert!(token.set("nope", "x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    layout: Arc<Layout>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn from_parts(layout: Arc<Layout>, values: Vec<Value>) -> Self {
        debug_assert_eq!(layout.len(), values.len());
        Record { layout, values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.layout.index_of(name).map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self.layout.index_of(name) {
            Some(i) => Some(&mut self.values[i]),
            None => None,
        }
    }

    /// Text content of a field, if it holds [`Value::Text`].
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Replaces a field's value, returning the previous one.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value> {
        let slot = self
            .get_mut(name)
            .ok_or_else(|| Error::format(name, "no such field in this record"))?;
        Ok(std::mem::replace(slot, value.into()))
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    /// `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.layout.names().zip(self.values.iter())
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        let names: IndexSet<String> = ["id", "form"].iter().map(|s| s.to_string()).collect();
        Record::from_parts(
            Arc::new(Layout::new(names)),
            vec![Value::from(1), Value::from("dog")],
        )
    }

    #[test]
    fn test_lookup_by_name() {
        let r = record();
        assert_eq!(r.get("id"), Some(&Value::Int(1)));
        assert_eq!(r.str("form"), Some("dog"));
        assert_eq!(r.get("lemma"), None);
        assert_eq!(r.layout().index_of("form"), Some(1));
    }

    #[test]
    fn test_set_returns_previous() {
        let mut r = record();
        let old = r.set("form", "cat").unwrap();
        assert_eq!(old, Value::from("dog"));
        assert_eq!(r.str("form"), Some("cat"));
        assert!(r.set("lemma", "x").unwrap_err().is_format());
    }

    #[test]
    fn test_serialize_as_map() {
        let json = serde_json::to_string(&record()).unwrap();
        assert_eq!(json, r#"{"id":1,"form":"dog"}"#);
    }
}
