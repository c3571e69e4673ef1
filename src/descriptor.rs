//! Column encodings and their compiled codecs.
//!
//! A [`Descriptor`] is plain data describing how one column's text maps to a [`Value`] and back.
//! Descriptors compose: a mapping of text keys to sets of text is
//! `mapping(text(), unique_array(text(), ",", ..), "|", "=", ..)`. Calling
//! [`Descriptor::codec`] validates the description once and produces a [`Codec`], a pair of
//! closures that the parser and serializer invoke per line without re-inspecting the descriptor.
//!
//! ## Contracts
//!
//! - `nullable(inner, marker)`: the marker decodes to [`Value::Absent`]; `Absent` encodes to the
//!   marker.
//! - `array(inner, sep, empty)`: the empty marker decodes to an empty list; otherwise the text is
//!   split on `sep`.
//! - `unique_array(inner, sep, empty, order)`: like `array` but produces a set; encoding always
//!   sorts by `order`, so the column text does not depend on insertion order.
//! - `fixed_array(inner, sep, arity)`: exactly `arity` parts, produces a tuple.
//! - `mapping(key, value, pair_sep, kv_sep, empty, order)`: pairs split once on `kv_sep`, written
//!   sorted by `order` applied to keys.
//! - `mapping_ext(..)`: like `mapping`, but a pair without `kv_sep` is a bare key mapped to
//!   [`Value::NoValue`].
//! - `varcols(inner)`: a run of whole columns; only valid as a field's top-level descriptor.
//! - `via(kind, decode, encode)`: caller supplied closures.
//!
//! Encoding fails instead of producing text that would not decode back to the same value: a
//! missing required value, an empty collection without an empty marker, element or key text
//! containing a separator, two set elements or map keys that encode to the same text, and a
//! non-empty collection whose text equals its empty marker are all rejected.
//!
//! `nullable` is the one lossy case: a present value whose text equals the marker is written as
//! the marker and reads back as [`Value::Absent`].
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::descriptor::{self, OrderKey};
//! use conll_schema::Value;
//!
//! let tags = descriptor::unique_array(descriptor::text(), ",", Some("_"), OrderKey::natural())
//!     .codec()
//!     .unwrap();
//!
//! assert_eq!(tags.decode("_").unwrap(), Value::set(Vec::<Value>::new()));
//! assert_eq!(tags.decode("b,a,a").unwrap(), Value::set(["a", "b"]));
//! assert_eq!(tags.encode(&Value::set(["b", "a"])).unwrap(), "a,b");
//! ```

use crate::error::{Error, Result};
use crate::value::{Kind, Value, ValueMap, ValueSet};
use indexmap::IndexSet;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a single codec; the parser and serializer add field and column context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl CodecError {
    pub fn new(msg: impl fmt::Display) -> Self {
        CodecError(msg.to_string())
    }
}

impl From<String> for CodecError {
    fn from(msg: String) -> Self {
        CodecError(msg)
    }
}

impl From<&str> for CodecError {
    fn from(msg: &str) -> Self {
        CodecError(msg.to_string())
    }
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Shared decode closure.
pub type DecodeFn = Arc<dyn Fn(&str) -> CodecResult<Value> + Send + Sync>;

/// Shared encode closure.
pub type EncodeFn = Arc<dyn Fn(&Value) -> CodecResult<String> + Send + Sync>;

type KeyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Ordering applied to set elements and map keys when a collection is written.
///
/// Ties under the key fall back to the natural [`Value`] order, so the output is fully
/// determined by the collection's contents.
///
/// # Examples
///
/// ```rust
/// use conll_schema::descriptor::OrderKey;
/// use conll_schema::Value;
/// use std::cmp::Ordering;
///
/// let ci = OrderKey::case_insensitive();
/// assert_eq!(ci.compare(&Value::from("b"), &Value::from("C")), Ordering::Less);
/// assert_eq!(OrderKey::natural().compare(&Value::from("b"), &Value::from("C")), Ordering::Greater);
/// ```
#[derive(Clone, Default)]
pub struct OrderKey(Option<KeyFn>);

impl OrderKey {
    /// Natural [`Value`] order.
    #[must_use]
    pub fn natural() -> Self {
        OrderKey(None)
    }

    /// Orders text by its lower-cased form; other values keep their natural order.
    #[must_use]
    pub fn case_insensitive() -> Self {
        Self::by(|v| match v {
            Value::Text(s) => Value::Text(s.to_lowercase()),
            other => other.clone(),
        })
    }

    /// Orders by a derived sort key.
    pub fn by<F>(key: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        OrderKey(Some(Arc::new(key)))
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match &self.0 {
            None => a.cmp(b),
            Some(key) => key(a).cmp(&key(b)).then_with(|| a.cmp(b)),
        }
    }

    /// Sorts `(value, payload)` pairs by value, computing each sort key once.
    fn arrange<'a, T>(&self, mut items: Vec<(&'a Value, T)>) -> Vec<(&'a Value, T)> {
        match &self.0 {
            None => {
                items.sort_by(|a, b| a.0.cmp(b.0));
                items
            }
            Some(key) => {
                let mut keyed: Vec<(Value, (&'a Value, T))> =
                    items.into_iter().map(|item| (key(item.0), item)).collect();
                keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1 .0.cmp(b.1 .0)));
                keyed.into_iter().map(|(_, item)| item).collect()
            }
        }
    }
}

impl fmt::Debug for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("OrderKey::natural"),
            Some(_) => f.write_str("OrderKey::by(..)"),
        }
    }
}

/// Declarative description of one column encoding.
///
/// Build descriptors with the free functions in this module ([`text`], [`nullable`],
/// [`mapping`], ...) rather than the variants directly.
#[derive(Clone)]
pub enum Descriptor {
    Text,
    Int,
    Real,
    Nullable {
        inner: Box<Descriptor>,
        marker: String,
    },
    Array {
        inner: Box<Descriptor>,
        sep: String,
        empty: Option<String>,
    },
    UniqueArray {
        inner: Box<Descriptor>,
        sep: String,
        empty: Option<String>,
        order: OrderKey,
    },
    FixedArray {
        inner: Box<Descriptor>,
        sep: String,
        arity: usize,
    },
    Mapping {
        key: Box<Descriptor>,
        value: Box<Descriptor>,
        pair_sep: String,
        kv_sep: String,
        empty: Option<String>,
        order: OrderKey,
        bare_keys: bool,
    },
    VarCols {
        inner: Box<Descriptor>,
    },
    Via {
        kind: Kind,
        decode: DecodeFn,
        encode: EncodeFn,
    },
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Text => f.write_str("text"),
            Descriptor::Int => f.write_str("int"),
            Descriptor::Real => f.write_str("real"),
            Descriptor::Nullable { inner, marker } => {
                write!(f, "nullable({:?}, {:?})", inner, marker)
            }
            Descriptor::Array { inner, sep, empty } => {
                write!(f, "array({:?}, {:?}, {:?})", inner, sep, empty)
            }
            Descriptor::UniqueArray {
                inner, sep, empty, ..
            } => write!(f, "unique_array({:?}, {:?}, {:?})", inner, sep, empty),
            Descriptor::FixedArray { inner, sep, arity } => {
                write!(f, "fixed_array({:?}, {:?}, {})", inner, sep, arity)
            }
            Descriptor::Mapping {
                key,
                value,
                pair_sep,
                kv_sep,
                empty,
                bare_keys,
                ..
            } => write!(
                f,
                "{}({:?}, {:?}, {:?}, {:?}, {:?})",
                if *bare_keys { "mapping_ext" } else { "mapping" },
                key,
                value,
                pair_sep,
                kv_sep,
                empty
            ),
            Descriptor::VarCols { inner } => write!(f, "varcols({:?})", inner),
            Descriptor::Via { kind, .. } => write!(f, "via({})", kind),
        }
    }
}

#[must_use]
pub fn text() -> Descriptor {
    Descriptor::Text
}

#[must_use]
pub fn int() -> Descriptor {
    Descriptor::Int
}

#[must_use]
pub fn real() -> Descriptor {
    Descriptor::Real
}

/// `marker` decodes to [`Value::Absent`]; anything else goes to `inner`.
///
/// Encoding does not reject a present value whose text equals `marker`. It is written as the
/// marker and reads back as [`Value::Absent`], so `Text("_")` under marker `"_"` does not survive
/// a round trip. Columns that need the literal marker restore it after parsing, as the CoNLL-U
/// form and lemma do.
#[must_use]
pub fn nullable(inner: Descriptor, marker: &str) -> Descriptor {
    Descriptor::Nullable {
        inner: Box::new(inner),
        marker: marker.to_string(),
    }
}

/// A `sep`-separated list. With `empty` set to `None` an empty list cannot be written.
#[must_use]
pub fn array(inner: Descriptor, sep: &str, empty: Option<&str>) -> Descriptor {
    Descriptor::Array {
        inner: Box::new(inner),
        sep: sep.to_string(),
        empty: empty.map(str::to_string),
    }
}

/// A `sep`-separated set, written in `order`.
#[must_use]
pub fn unique_array(
    inner: Descriptor,
    sep: &str,
    empty: Option<&str>,
    order: OrderKey,
) -> Descriptor {
    Descriptor::UniqueArray {
        inner: Box::new(inner),
        sep: sep.to_string(),
        empty: empty.map(str::to_string),
        order,
    }
}

/// A tuple of exactly `arity` `sep`-separated parts.
#[must_use]
pub fn fixed_array(inner: Descriptor, sep: &str, arity: usize) -> Descriptor {
    Descriptor::FixedArray {
        inner: Box::new(inner),
        sep: sep.to_string(),
        arity,
    }
}

/// A map of `pair_sep`-separated `key{kv_sep}value` pairs, written with keys in `order`.
#[must_use]
pub fn mapping(
    key: Descriptor,
    value: Descriptor,
    pair_sep: &str,
    kv_sep: &str,
    empty: Option<&str>,
    order: OrderKey,
) -> Descriptor {
    Descriptor::Mapping {
        key: Box::new(key),
        value: Box::new(value),
        pair_sep: pair_sep.to_string(),
        kv_sep: kv_sep.to_string(),
        empty: empty.map(str::to_string),
        order,
        bare_keys: false,
    }
}

/// Like [`mapping`], but pairs may be bare keys, which map to [`Value::NoValue`].
#[must_use]
pub fn mapping_ext(
    key: Descriptor,
    value: Descriptor,
    pair_sep: &str,
    kv_sep: &str,
    empty: Option<&str>,
    order: OrderKey,
) -> Descriptor {
    Descriptor::Mapping {
        key: Box::new(key),
        value: Box::new(value),
        pair_sep: pair_sep.to_string(),
        kv_sep: kv_sep.to_string(),
        empty: empty.map(str::to_string),
        order,
        bare_keys: true,
    }
}

/// A variable-length run of columns, each decoded with `inner`.
#[must_use]
pub fn varcols(inner: Descriptor) -> Descriptor {
    Descriptor::VarCols {
        inner: Box::new(inner),
    }
}

/// Arbitrary closures producing values of `kind`.
///
/// The closures must round-trip every value they produce.
///
/// # Examples
///
/// ```rust
/// use conll_schema::descriptor::{self, CodecError};
/// use conll_schema::{Kind, Value};
///
/// let upper = descriptor::via(
///     Kind::Text,
///     |s| Ok(Value::from(s.to_uppercase())),
///     |v| v.as_str().map(str::to_lowercase).ok_or_else(|| CodecError::new("expected text")),
/// );
/// let codec = upper.codec().unwrap();
/// assert_eq!(codec.decode("noun").unwrap(), Value::from("NOUN"));
/// assert_eq!(codec.encode(&Value::from("NOUN")).unwrap(), "noun");
/// ```
pub fn via<D, E>(kind: Kind, decode: D, encode: E) -> Descriptor
where
    D: Fn(&str) -> CodecResult<Value> + Send + Sync + 'static,
    E: Fn(&Value) -> CodecResult<String> + Send + Sync + 'static,
{
    Descriptor::Via {
        kind,
        decode: Arc::new(decode),
        encode: Arc::new(encode),
    }
}

impl Descriptor {
    /// The default descriptor for a primitive kind.
    pub(crate) fn for_kind(kind: &Kind) -> Option<Descriptor> {
        match kind {
            Kind::Text => Some(Descriptor::Text),
            Kind::Int => Some(Descriptor::Int),
            Kind::Real => Some(Descriptor::Real),
            _ => None,
        }
    }

    /// The kind of value this descriptor decodes to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::descriptor::{self, OrderKey};
    /// use conll_schema::Kind;
    ///
    /// let d = descriptor::nullable(descriptor::int(), "_");
    /// assert_eq!(d.kind(), Kind::optional(Kind::Int));
    /// ```
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Descriptor::Text => Kind::Text,
            Descriptor::Int => Kind::Int,
            Descriptor::Real => Kind::Real,
            Descriptor::Nullable { inner, .. } => Kind::optional(inner.kind()),
            Descriptor::Array { inner, .. } | Descriptor::VarCols { inner } => {
                Kind::list(inner.kind())
            }
            Descriptor::UniqueArray { inner, .. } => Kind::set(inner.kind()),
            Descriptor::FixedArray { inner, .. } => Kind::tuple(inner.kind()),
            Descriptor::Mapping { key, value, .. } => Kind::map(key.kind(), value.kind()),
            Descriptor::Via { kind, .. } => kind.clone(),
        }
    }

    #[must_use]
    pub const fn is_varcols(&self) -> bool {
        matches!(self, Descriptor::VarCols { .. })
    }

    /// Validates the descriptor and compiles it into a [`Codec`].
    ///
    /// Fails with a schema error for an empty separator, a zero arity, or a nested `varcols`.
    /// A top-level `varcols` descriptor is handled by the schema compiler, not here.
    pub fn codec(&self) -> Result<Codec> {
        self.build().map_err(Error::schema)
    }

    pub(crate) fn build(&self) -> std::result::Result<Codec, String> {
        match self {
            Descriptor::Text => Ok(text_codec()),
            Descriptor::Int => Ok(int_codec()),
            Descriptor::Real => Ok(real_codec()),
            Descriptor::Nullable { inner, marker } => Ok(nullable_codec(inner.build()?, marker)),
            Descriptor::Array { inner, sep, empty } => {
                non_empty("array separator", sep)?;
                Ok(array_codec(inner.build()?, sep, empty.clone()))
            }
            Descriptor::UniqueArray {
                inner,
                sep,
                empty,
                order,
            } => {
                non_empty("unique_array separator", sep)?;
                Ok(unique_array_codec(
                    inner.build()?,
                    sep,
                    empty.clone(),
                    order.clone(),
                ))
            }
            Descriptor::FixedArray { inner, sep, arity } => {
                non_empty("fixed_array separator", sep)?;
                if *arity == 0 {
                    return Err("fixed_array arity must be at least 1".to_string());
                }
                Ok(fixed_array_codec(inner.build()?, sep, *arity))
            }
            Descriptor::Mapping {
                key,
                value,
                pair_sep,
                kv_sep,
                empty,
                order,
                bare_keys,
            } => {
                non_empty("mapping pair separator", pair_sep)?;
                non_empty("mapping key-value separator", kv_sep)?;
                Ok(mapping_codec(MappingParts {
                    key: key.build()?,
                    value: value.build()?,
                    pair_sep: pair_sep.clone(),
                    kv_sep: kv_sep.clone(),
                    empty: empty.clone(),
                    order: order.clone(),
                    bare_keys: *bare_keys,
                }))
            }
            Descriptor::VarCols { .. } => {
                Err("varcols may only be used as a field's top-level descriptor".to_string())
            }
            Descriptor::Via {
                decode, encode, ..
            } => Ok(Codec {
                decode: Arc::clone(decode),
                encode: Arc::clone(encode),
            }),
        }
    }
}

fn non_empty(what: &str, sep: &str) -> std::result::Result<(), String> {
    if sep.is_empty() {
        Err(format!("{} must not be empty", what))
    } else {
        Ok(())
    }
}

/// A compiled column codec.
#[derive(Clone)]
pub struct Codec {
    decode: DecodeFn,
    encode: EncodeFn,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Codec")
    }
}

impl Codec {
    fn new<D, E>(decode: D, encode: E) -> Self
    where
        D: Fn(&str) -> CodecResult<Value> + Send + Sync + 'static,
        E: Fn(&Value) -> CodecResult<String> + Send + Sync + 'static,
    {
        Codec {
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        }
    }

    #[inline]
    pub fn decode(&self, text: &str) -> CodecResult<Value> {
        (self.decode)(text)
    }

    #[inline]
    pub fn encode(&self, value: &Value) -> CodecResult<String> {
        (self.encode)(value)
    }
}

fn wrong_shape(expected: &str, found: &Value) -> CodecError {
    match found {
        Value::Absent => CodecError::new("missing required value"),
        other => CodecError(format!(
            "expected {} value, found {}",
            expected,
            other.type_name()
        )),
    }
}

fn contaminated(text: &str, sep: &str) -> CodecError {
    CodecError(format!("{:?} contains the separator {:?}", text, sep))
}

fn same_text(text: &str) -> CodecError {
    CodecError(format!("distinct elements encode to the same text {:?}", text))
}

fn no_empty_encoding() -> CodecError {
    CodecError::new("empty collection has no encoding in this column")
}

/// Checks that a non-empty collection does not collide with its empty marker.
fn finish_joined(joined: String, empty: &Option<String>) -> CodecResult<String> {
    if empty.as_deref() == Some(joined.as_str()) {
        return Err(CodecError(format!(
            "non-empty collection encodes to the empty marker {:?}",
            joined
        )));
    }
    Ok(joined)
}

fn text_codec() -> Codec {
    Codec::new(
        |s| Ok(Value::Text(s.to_string())),
        |v| match v {
            Value::Text(s) => Ok(s.clone()),
            other => Err(wrong_shape("text", other)),
        },
    )
}

fn int_codec() -> Codec {
    Codec::new(
        |s| {
            s.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| CodecError(format!("invalid integer: {}", e)))
        },
        |v| match v {
            Value::Int(i) => Ok(i.to_string()),
            other => Err(wrong_shape("int", other)),
        },
    )
}

fn real_codec() -> Codec {
    Codec::new(
        |s| {
            s.parse::<f64>()
                .map(Value::Real)
                .map_err(|e| CodecError(format!("invalid real number: {}", e)))
        },
        |v| match v {
            Value::Real(f) => Ok(f.to_string()),
            other => Err(wrong_shape("real", other)),
        },
    )
}

fn nullable_codec(inner: Codec, marker: &str) -> Codec {
    let decode_inner = inner.clone();
    let decode_marker = marker.to_string();
    let encode_marker = marker.to_string();
    Codec::new(
        move |s| {
            if s == decode_marker {
                Ok(Value::Absent)
            } else {
                decode_inner.decode(s)
            }
        },
        move |v| match v {
            Value::Absent => Ok(encode_marker.clone()),
            present => inner.encode(present),
        },
    )
}

fn array_codec(inner: Codec, sep: &str, empty: Option<String>) -> Codec {
    let decode_inner = inner.clone();
    let decode_sep = sep.to_string();
    let decode_empty = empty.clone();
    let sep = sep.to_string();
    Codec::new(
        move |s| {
            if decode_empty.as_deref() == Some(s) {
                return Ok(Value::List(Vec::new()));
            }
            s.split(decode_sep.as_str())
                .map(|part| decode_inner.decode(part))
                .collect::<CodecResult<Vec<_>>>()
                .map(Value::List)
        },
        move |v| {
            let items = match v {
                Value::List(items) => items,
                other => return Err(wrong_shape("list", other)),
            };
            if items.is_empty() {
                return empty.clone().ok_or_else(no_empty_encoding);
            }
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                let text = inner.encode(item)?;
                if text.contains(sep.as_str()) {
                    return Err(contaminated(&text, &sep));
                }
                parts.push(text);
            }
            finish_joined(parts.join(sep.as_str()), &empty)
        },
    )
}

fn unique_array_codec(inner: Codec, sep: &str, empty: Option<String>, order: OrderKey) -> Codec {
    let decode_inner = inner.clone();
    let decode_sep = sep.to_string();
    let decode_empty = empty.clone();
    let sep = sep.to_string();
    Codec::new(
        move |s| {
            if decode_empty.as_deref() == Some(s) {
                return Ok(Value::Set(ValueSet::new()));
            }
            s.split(decode_sep.as_str())
                .map(|part| decode_inner.decode(part))
                .collect::<CodecResult<ValueSet>>()
                .map(Value::Set)
        },
        move |v| {
            let items = match v {
                Value::Set(items) => items,
                other => return Err(wrong_shape("set", other)),
            };
            if items.is_empty() {
                return empty.clone().ok_or_else(no_empty_encoding);
            }
            let arranged = order.arrange(items.iter().map(|item| (item, ())).collect());
            let mut parts: IndexSet<String> = IndexSet::with_capacity(arranged.len());
            for (item, ()) in arranged {
                let text = inner.encode(item)?;
                if text.contains(sep.as_str()) {
                    return Err(contaminated(&text, &sep));
                }
                if parts.contains(&text) {
                    return Err(same_text(&text));
                }
                parts.insert(text);
            }
            let parts: Vec<String> = parts.into_iter().collect();
            finish_joined(parts.join(sep.as_str()), &empty)
        },
    )
}

fn fixed_array_codec(inner: Codec, sep: &str, arity: usize) -> Codec {
    let decode_inner = inner.clone();
    let decode_sep = sep.to_string();
    let sep = sep.to_string();
    Codec::new(
        move |s| {
            let parts: Vec<&str> = s.split(decode_sep.as_str()).collect();
            if parts.len() != arity {
                return Err(CodecError(format!(
                    "expected {} parts separated by {:?}, found {}",
                    arity,
                    decode_sep,
                    parts.len()
                )));
            }
            parts
                .into_iter()
                .map(|part| decode_inner.decode(part))
                .collect::<CodecResult<Vec<_>>>()
                .map(Value::Tuple)
        },
        move |v| {
            let items = match v {
                Value::Tuple(items) => items,
                other => return Err(wrong_shape("tuple", other)),
            };
            if items.len() != arity {
                return Err(CodecError(format!(
                    "expected a tuple of {} elements, found {}",
                    arity,
                    items.len()
                )));
            }
            let mut parts = Vec::with_capacity(arity);
            for item in items {
                let text = inner.encode(item)?;
                if text.contains(sep.as_str()) {
                    return Err(contaminated(&text, &sep));
                }
                parts.push(text);
            }
            Ok(parts.join(sep.as_str()))
        },
    )
}

struct MappingParts {
    key: Codec,
    value: Codec,
    pair_sep: String,
    kv_sep: String,
    empty: Option<String>,
    order: OrderKey,
    bare_keys: bool,
}

fn mapping_codec(parts: MappingParts) -> Codec {
    let parts = Arc::new(parts);
    let decoder = Arc::clone(&parts);
    Codec::new(
        move |s| decode_mapping(&decoder, s),
        move |v| encode_mapping(&parts, v),
    )
}

fn decode_mapping(m: &MappingParts, s: &str) -> CodecResult<Value> {
    let mut map = ValueMap::new();
    if m.empty.as_deref() == Some(s) {
        return Ok(Value::Map(map));
    }
    for pair in s.split(m.pair_sep.as_str()) {
        match pair.split_once(m.kv_sep.as_str()) {
            Some((k, v)) => {
                map.insert(m.key.decode(k)?, m.value.decode(v)?);
            }
            None if m.bare_keys => {
                map.insert(m.key.decode(pair)?, Value::NoValue);
            }
            None => {
                return Err(CodecError(format!(
                    "pair {:?} has no {:?} separator",
                    pair, m.kv_sep
                )))
            }
        }
    }
    Ok(Value::Map(map))
}

fn encode_mapping(m: &MappingParts, v: &Value) -> CodecResult<String> {
    let map = match v {
        Value::Map(map) => map,
        other => return Err(wrong_shape("map", other)),
    };
    if map.is_empty() {
        return m.empty.clone().ok_or_else(no_empty_encoding);
    }
    let arranged = m.order.arrange(map.iter().collect());
    let mut pairs = Vec::with_capacity(arranged.len());
    let mut seen: IndexSet<String> = IndexSet::with_capacity(arranged.len());
    for (key, value) in arranged {
        let key_text = m.key.encode(key)?;
        if key_text.contains(m.pair_sep.as_str()) {
            return Err(contaminated(&key_text, &m.pair_sep));
        }
        if key_text.contains(m.kv_sep.as_str()) {
            return Err(contaminated(&key_text, &m.kv_sep));
        }
        if !seen.insert(key_text.clone()) {
            return Err(same_text(&key_text));
        }
        if m.bare_keys && value.is_no_value() {
            pairs.push(key_text);
            continue;
        }
        let value_text = m.value.encode(value)?;
        if value_text.contains(m.pair_sep.as_str()) {
            return Err(contaminated(&value_text, &m.pair_sep));
        }
        pairs.push(format!("{}{}{}", key_text, m.kv_sep, value_text));
    }
    finish_joined(pairs.join(m.pair_sep.as_str()), &m.empty)
}
