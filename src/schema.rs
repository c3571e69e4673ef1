//! Record schemas and their compilation into a [`Format`].
//!
//! A [`Schema`] is plain data: an ordered list of [`Field`]s plus an optional post-construction
//! hook. [`Format::compile`] validates it against a [`FormatOptions`] and builds one codec per
//! field. Every schema problem is reported here, before any line is parsed.
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::descriptor::{self, OrderKey};
//! use conll_schema::{Format, FormatOptions, Kind, Schema};
//!
//! let schema = Schema::builder()
//!     .field("id", Kind::Int)
//!     .field("word", Kind::Text)
//!     .field_with(
//!         "tags",
//!         Kind::set(Kind::Text),
//!         descriptor::unique_array(descriptor::text(), ",", Some("_"), OrderKey::natural()),
//!     )
//!     .build();
//!
//! let format = Format::compile(schema, FormatOptions::default()).unwrap();
//! let record = format.parse_record("1\tdogs\tN,PL").unwrap();
//! assert_eq!(format.serialize_record(&record).unwrap(), "1\tdogs\tN,PL");
//! ```
//!
//! Two variable-width fields are rejected at compile time:
//!
//! ```rust
//! use conll_schema::descriptor;
//! use conll_schema::{Format, Kind, Schema};
//!
//! let schema = Schema::builder()
//!     .field_with("a", Kind::list(Kind::Text), descriptor::varcols(descriptor::text()))
//!     .field_with("b", Kind::list(Kind::Text), descriptor::varcols(descriptor::text()))
//!     .build();
//! assert!(Format::new(schema).unwrap_err().is_schema());
//! ```

use crate::descriptor::{Codec, Descriptor};
use crate::error::{Error, Result};
use crate::options::FormatOptions;
use crate::record::{Layout, Record};
use crate::value::{Kind, Value};
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Hook run on every freshly decoded record; an `Err` rejects the line.
pub type PostInitFn = Arc<dyn Fn(&mut Record) -> std::result::Result<(), String> + Send + Sync>;

/// One named column.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: Kind,
    descriptor: Option<Descriptor>,
}

impl Field {
    /// A field using the default descriptor of a primitive kind.
    pub fn new(name: &str, kind: Kind) -> Self {
        Field {
            name: name.to_string(),
            kind,
            descriptor: None,
        }
    }

    /// A field with an explicit descriptor.
    pub fn with_descriptor(name: &str, kind: Kind, descriptor: Descriptor) -> Self {
        Field {
            name: name.to_string(),
            kind,
            descriptor: Some(descriptor),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    fn is_varcols(&self) -> bool {
        self.descriptor.as_ref().is_some_and(Descriptor::is_varcols)
    }
}

/// Ordered field specification of a record type.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    post_init: Option<PostInitFn>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("post_init", &self.post_init.is_some())
            .finish()
    }
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`Schema`]. Fields are kept in the order they are added.
#[derive(Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
    post_init: Option<PostInitFn>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, name: &str, kind: Kind) -> Self {
        self.fields.push(Field::new(name, kind));
        self
    }

    #[must_use]
    pub fn field_with(mut self, name: &str, kind: Kind, descriptor: Descriptor) -> Self {
        self.fields
            .push(Field::with_descriptor(name, kind, descriptor));
        self
    }

    /// Appends an already constructed field.
    #[must_use]
    pub fn push(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the hook run after every record is decoded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::{Format, Kind, Schema, Value};
    ///
    /// let schema = Schema::builder()
    ///     .field("word", Kind::Text)
    ///     .field("count", Kind::Int)
    ///     .post_init(|r| match r.get("count") {
    ///         Some(Value::Int(n)) if *n < 0 => Err(format!("negative count {}", n)),
    ///         _ => Ok(()),
    ///     })
    ///     .build();
    /// let format = Format::new(schema).unwrap();
    ///
    /// assert!(format.parse_record("dog\t3").is_ok());
    /// assert!(format.parse_record("dog\t-3").unwrap_err().is_parse());
    /// ```
    #[must_use]
    pub fn post_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.post_init = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
            post_init: self.post_init,
        }
    }
}

pub(crate) struct CompiledField {
    pub(crate) name: String,
    pub(crate) codec: Codec,
}

pub(crate) struct Compiled {
    pub(crate) schema: Schema,
    pub(crate) options: FormatOptions,
    pub(crate) fields: Vec<CompiledField>,
    pub(crate) varcols: Option<usize>,
    pub(crate) layout: Arc<Layout>,
    defaults: Vec<Value>,
}

impl Compiled {
    pub(crate) fn post_init(&self) -> Option<&PostInitFn> {
        self.schema.post_init.as_ref()
    }
}

/// A schema bound to its line options, with one compiled codec per field.
///
/// `Format` is immutable and cheap to clone; clones share the compiled codec table. It is
/// `Send + Sync`, so one instance can parse and serialize from several threads at once.
#[derive(Clone)]
pub struct Format {
    pub(crate) inner: Arc<Compiled>,
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl Format {
    /// Validates `schema` and compiles its codecs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when:
    /// - the schema has no fields, or two fields share a name
    /// - more than one field uses `varcols`, or `varcols` is nested in another descriptor
    /// - an explicit descriptor produces a kind other than the field's declared kind
    /// - a non-primitive field has no descriptor
    /// - a separator, the delimiter or the comment marker is empty, or a tuple arity is zero
    pub fn compile(schema: Schema, options: FormatOptions) -> Result<Format> {
        if schema.fields.is_empty() {
            return Err(Error::schema("a schema needs at least one field"));
        }
        if options.delimiter.as_str().is_empty() {
            return Err(Error::schema("column delimiter must not be empty"));
        }
        if options.comment_marker.is_empty() {
            return Err(Error::schema("comment marker must not be empty"));
        }

        let mut names = IndexSet::with_capacity(schema.fields.len());
        let mut varcols: Option<usize> = None;
        let mut fields = Vec::with_capacity(schema.fields.len());
        let mut defaults = Vec::with_capacity(schema.fields.len());

        for (i, field) in schema.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(Error::schema(format!("field {} has an empty name", i)));
            }
            if !names.insert(field.name.clone()) {
                return Err(Error::schema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
            if field.is_varcols() {
                if let Some(prev) = varcols {
                    return Err(Error::schema(format!(
                        "at most one varcols field is allowed, found '{}' and '{}'",
                        schema.fields[prev].name, field.name
                    )));
                }
                varcols = Some(i);
            }

            let codec = compile_field(field)?;
            defaults.push(field.kind.default_value());
            fields.push(CompiledField {
                name: field.name.clone(),
                codec,
            });
        }

        debug!(
            target: "conll_schema::schema",
            fields = fields.len(),
            varcols = ?varcols,
            delimiter = ?options.delimiter.as_str(),
            "Format compiled"
        );

        Ok(Format {
            inner: Arc::new(Compiled {
                schema,
                options,
                fields,
                varcols,
                layout: Arc::new(Layout::new(names)),
                defaults,
            }),
        })
    }

    /// Compiles `schema` with [`FormatOptions::default`].
    pub fn new(schema: Schema) -> Result<Format> {
        Self::compile(schema, FormatOptions::default())
    }

    #[must_use]
    pub fn options(&self) -> &FormatOptions {
        &self.inner.options
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.fields.iter().map(|f| f.name.as_str())
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.inner.fields.len()
    }

    /// Position of the variable-width field, if the schema has one.
    #[must_use]
    pub fn varcols_index(&self) -> Option<usize> {
        self.inner.varcols
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.inner.layout
    }

    /// A record of this format holding each field kind's default value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::{conllu, Value};
    ///
    /// let format = conllu::format().unwrap();
    /// let mut token = format.new_record();
    /// assert_eq!(token.get("lemma"), Some(&Value::Absent));
    /// token.set("id", "1").unwrap();
    /// ```
    #[must_use]
    pub fn new_record(&self) -> Record {
        Record::from_parts(Arc::clone(&self.inner.layout), self.inner.defaults.clone())
    }
}

fn compile_field(field: &Field) -> Result<Codec> {
    let wrap = |msg: String| Error::schema(format!("field '{}': {}", field.name, msg));
    match &field.descriptor {
        None => match Descriptor::for_kind(&field.kind) {
            Some(d) => d.build().map_err(wrap),
            None => Err(wrap(format!(
                "kind {} has no default encoding and needs an explicit descriptor",
                field.kind
            ))),
        },
        Some(descriptor) => {
            let produced = descriptor.kind();
            if produced != field.kind {
                return Err(wrap(format!(
                    "declared as {} but its descriptor produces {}",
                    field.kind, produced
                )));
            }
            match descriptor {
                Descriptor::VarCols { inner } => inner.build().map_err(wrap),
                other => other.build().map_err(wrap),
            }
        }
    }
}
