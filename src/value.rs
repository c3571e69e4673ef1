//! Dynamic value representation for decoded columns.
//!
//! This module provides [`Value`], the in-memory form of one decoded column, and [`Kind`], the
//! declared type a schema field or descriptor produces.
//!
//! ## Core Types
//!
//! - [`Value`]: absent, no-value sentinel, text, integer, real, list, set, tuple, map
//! - [`Kind`]: the matching type description, checked when a schema is compiled
//!
//! `Value` implements `Eq`, `Hash` and `Ord` so values can live in sets and act as map keys.
//! Reals are compared by bit pattern for equality and by [`f64::total_cmp`] for ordering. Set and
//! map equality ignores storage order.
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::Value;
//!
//! let feats = Value::set(["Plur", "Fem", "Plur"]);
//! assert_eq!(feats, Value::set(["Fem", "Plur"]));
//! assert_eq!(feats.as_set().map(|s| s.len()), Some(2));
//!
//! let missing = Value::Absent;
//! assert!(missing.is_absent());
//! ```

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The set type stored in [`Value::Set`].
pub type ValueSet = IndexSet<Value>;

/// The map type stored in [`Value::Map`].
pub type ValueMap = IndexMap<Value, Value>;

/// One decoded column, or a component of one.
///
/// # Examples
///
/// ```rust
/// use conll_schema::Value;
///
/// let id = Value::from("3");
/// let head = Value::from(0);
/// assert_eq!(id.as_str(), Some("3"));
/// assert_eq!(head.as_int(), Some(0));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// An optional value that is not present.
    #[default]
    Absent,
    /// A map key written without a value.
    NoValue,
    Text(String),
    Int(i64),
    Real(f64),
    List(Vec<Value>),
    Set(ValueSet),
    Tuple(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Builds a [`Value::Set`]; duplicates collapse.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::List`].
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Tuple`].
    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Map`]; later duplicate keys overwrite earlier ones.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    #[inline]
    #[must_use]
    pub const fn is_no_value(&self) -> bool {
        matches!(self, Value::NoValue)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut ValueSet> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::NoValue => "no-value",
            Value::Text(_) => "text",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Value::Absent => 0,
            Value::NoValue => 1,
            Value::Int(_) => 2,
            Value::Real(_) => 3,
            Value::Text(_) => 4,
            Value::Tuple(_) => 5,
            Value::List(_) => 6,
            Value::Set(_) => 7,
            Value::Map(_) => 8,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) | (Value::NoValue, Value::NoValue) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Absent | Value::NoValue => {}
            Value::Text(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Real(f) => f.to_bits().hash(state),
            Value::List(v) | Value::Tuple(v) => v.hash(state),
            // Storage order is not part of identity; only the size can be hashed cheaply.
            Value::Set(s) => s.len().hash(state),
            Value::Map(m) => m.len().hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Real(a), Value::Real(b)) => a.total_cmp(b),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => {
                let mut left: Vec<&Value> = a.iter().collect();
                let mut right: Vec<&Value> = b.iter().collect();
                left.sort();
                right.sort();
                left.cmp(&right)
            }
            (Value::Map(a), Value::Map(b)) => {
                let mut left: Vec<(&Value, &Value)> = a.iter().collect();
                let mut right: Vec<(&Value, &Value)> = b.iter().collect();
                left.sort();
                right.sort();
                left.cmp(&right)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Absent => serializer.serialize_none(),
            Value::NoValue => serializer.serialize_unit(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::List(items) | Value::Tuple(items) => serializer.collect_seq(items),
            Value::Set(items) => {
                let mut sorted: Vec<&Value> = items.iter().collect();
                sorted.sort();
                serializer.collect_seq(sorted)
            }
            Value::Map(pairs) => {
                let mut sorted: Vec<(&Value, &Value)> = pairs.iter().collect();
                sorted.sort();
                serializer.collect_map(sorted)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ValueSet> for Value {
    fn from(value: ValueSet) -> Self {
        Value::Set(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}

/// The declared type of a field or of the values a descriptor produces.
///
/// # Examples
///
/// ```rust
/// use conll_schema::Kind;
///
/// let feats = Kind::map(Kind::Text, Kind::set(Kind::Text));
/// assert_eq!(feats.to_string(), "map<text, set<text>>");
/// assert!(Kind::Int.is_primitive());
/// assert!(!feats.is_primitive());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Text,
    Int,
    Real,
    Optional(Box<Kind>),
    List(Box<Kind>),
    Set(Box<Kind>),
    Tuple(Box<Kind>),
    Map(Box<Kind>, Box<Kind>),
}

impl Kind {
    #[must_use]
    pub fn optional(inner: Kind) -> Self {
        Kind::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn list(inner: Kind) -> Self {
        Kind::List(Box::new(inner))
    }

    #[must_use]
    pub fn set(inner: Kind) -> Self {
        Kind::Set(Box::new(inner))
    }

    #[must_use]
    pub fn tuple(inner: Kind) -> Self {
        Kind::Tuple(Box::new(inner))
    }

    #[must_use]
    pub fn map(key: Kind, value: Kind) -> Self {
        Kind::Map(Box::new(key), Box::new(value))
    }

    /// Returns `true` for kinds that have a default descriptor.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Kind::Text | Kind::Int | Kind::Real)
    }

    /// The value a freshly created record holds for a field of this kind.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Kind::Text => Value::Text(String::new()),
            Kind::Int => Value::Int(0),
            Kind::Real => Value::Real(0.0),
            Kind::Optional(_) => Value::Absent,
            Kind::List(_) => Value::List(Vec::new()),
            Kind::Set(_) => Value::Set(ValueSet::new()),
            Kind::Tuple(_) => Value::Tuple(Vec::new()),
            Kind::Map(_, _) => Value::Map(ValueMap::new()),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Text => f.write_str("text"),
            Kind::Int => f.write_str("int"),
            Kind::Real => f.write_str("real"),
            Kind::Optional(k) => write!(f, "optional<{}>", k),
            Kind::List(k) => write!(f, "list<{}>", k),
            Kind::Set(k) => write!(f, "set<{}>", k),
            Kind::Tuple(k) => write!(f, "tuple<{}>", k),
            Kind::Map(k, v) => write!(f, "map<{}, {}>", k, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(v: &Value) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a = Value::set(["b", "a"]);
        let b = Value::set(["a", "b"]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = Value::map([("x", 1), ("y", 2)]);
        let b = Value::map([("y", 2), ("x", 1)]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_reals_are_totally_ordered() {
        let nan = Value::Real(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert!(Value::Real(-1.0) < Value::Real(2.5));
        assert_ne!(Value::Real(0.0), Value::Real(-0.0));
    }

    #[test]
    fn test_cross_variant_ordering_is_stable() {
        let mut values = vec![
            Value::from("a"),
            Value::Absent,
            Value::from(3),
            Value::NoValue,
        ];
        values.sort();
        assert_eq!(
            values,
            vec![Value::Absent, Value::NoValue, Value::from(3), Value::from("a")]
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<&str>), Value::Absent);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_kind_defaults() {
        assert_eq!(Kind::optional(Kind::Int).default_value(), Value::Absent);
        assert_eq!(Kind::Text.default_value(), Value::from(""));
        assert!(Kind::map(Kind::Text, Kind::Text)
            .default_value()
            .as_map()
            .is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn test_serialize_sorts_sets() {
        let v = Value::set(["b", "a"]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"["a","b"]"#);
        assert_eq!(serde_json::to_string(&Value::Absent).unwrap(), "null");
    }
}
