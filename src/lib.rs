//! # conll_schema
//!
//! Schema-driven parsing and exact round-trip serialization of CoNLL-style tabular files.
//!
//! ## What is a CoNLL-style file?
//!
//! A line-oriented text format: one record per line, columns separated by a delimiter (a tab by
//! default), groups of records separated by blank lines, and comment lines (`# key = value`)
//! carrying per-group metadata. Columns hold small structured values: optional text written as
//! `_`, lists such as `a:b`, feature maps such as `Case=Acc,Nom|Number=Sing`.
//!
//! ## Key Features
//!
//! - **Declarative schemas**: describe each column once with composable descriptors
//!   ([`descriptor::nullable`], [`descriptor::array`], [`descriptor::mapping`], ...) and compile
//!   them into a reusable [`Format`]
//! - **Exact round trips**: whatever is read is written back byte for byte; anything that could
//!   not be read back identically is rejected with an [`Error::Format`]
//! - **Deterministic output**: sets and maps are written in a fixed order ([`descriptor::OrderKey`])
//! - **Streaming**: [`GroupIter`] reads group by group and recovers after a malformed group
//! - **Trees**: [`TreeBuilder`] links records into a rooted tree through id/head columns
//! - **Thread safe**: a [`Format`] is immutable, `Send + Sync` and cheap to clone
//!
//! ## Quick Start
//!
//! ```rust
//! use conll_schema::{conllu, Group};
//!
//! let input = "\
//! ## sent_id = 1
//! 1\tBirds\tbird\tNOUN\tNNS\tNumber=Plur\t2\tnsubj\t_\t_
//! 2\tsing\tsing\tVERB\tVBP\t_\t0\troot\t_\t_
//!
//! ";
//! let format = conllu::format().unwrap();
//! let mut corpus: Vec<Group> = format.load_from_str(input).unwrap();
//!
//! corpus[0].records[1].set("lemma", "chirp").unwrap();
//! let output = format.corpus_to_string(&corpus).unwrap();
//! assert!(output.contains("\tsing\tchirp\t"));
//! ```
//!
//! ### Defining a Schema
//!
//! ```rust
//! use conll_schema::{descriptor, schema, Format, FormatOptions, Kind, Value};
//!
//! let format = Format::compile(
//!     schema! {
//!         word: Kind::Text,
//!         tag: Kind::optional(Kind::Text) => descriptor::nullable(descriptor::text(), "-"),
//!         span: Kind::tuple(Kind::Int) => descriptor::fixed_array(descriptor::int(), ":", 2),
//!     },
//!     FormatOptions::default(),
//! )
//! .unwrap();
//!
//! let record = format.parse_record("Paris\t-\t0:5").unwrap();
//! assert_eq!(record.get("tag"), Some(&Value::Absent));
//! assert_eq!(record.get("span"), Some(&Value::tuple([0, 5])));
//! assert_eq!(format.serialize_record(&record).unwrap(), "Paris\t-\t0:5");
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events under the `conll_schema::*` targets and installs no
//! subscriber.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`roundtrip.rs`** - Reading and rewriting a CoNLL-U corpus
//! - **`custom_schema.rs`** - A schema of your own, including a variable-width column
//! - **`dependency_tree.rs`** - Walking the dependency tree of a sentence
//! - **`streaming.rs`** - Lazy iteration that survives a malformed group
//!
//! Run any example with: `cargo run --example <name>`

pub mod conllu;
pub mod de;
pub mod descriptor;
pub mod error;
pub mod group;
pub mod macros;
pub mod map;
pub mod options;
pub mod record;
pub mod schema;
pub mod ser;
pub mod tree;
pub mod value;

pub use de::GroupIter;
pub use descriptor::{CodecError, Descriptor, OrderKey};
pub use error::{Error, ErrorCategory, Result};
pub use group::{Group, RecordGroup};
pub use map::Metadata;
pub use options::{Delimiter, FormatOptions};
pub use record::{Layout, Record};
pub use schema::{Field, Format, Schema, SchemaBuilder};
pub use tree::{NodeId, Tree, TreeBuilder, TreeNode};
pub use value::{Kind, Value};

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str = "# sent_id = s1\n\
                            # text = I saw\n\
                            1\tI\tI\tPRON\tPRP\tCase=Nom|Number=Sing|Person=1\t2\tnsubj\t2:nsubj\t_\n\
                            2\tsaw\tsee\tVERB\tVBD\tTense=Past\t0\troot\t0:root\tSpaceAfter=No\n\
                            \n";

    #[test]
    fn test_load_and_write_back() {
        let format = conllu::format().unwrap();
        let corpus: Vec<Group> = format.load_from_str(SENTENCE).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].meta.value("sent_id"), Some("s1"));
        assert_eq!(format.corpus_to_string(&corpus).unwrap(), SENTENCE);
    }

    #[test]
    fn test_parse_group_and_tree() {
        let format = conllu::format().unwrap();
        let group: Group = format.parse_group(SENTENCE).unwrap();
        let tree = conllu::tree_from_records(&group.records).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root().data().str("lemma"), Some("see"));
        assert_eq!(tree.root().children().count(), 1);
    }

    #[test]
    fn test_custom_format_with_macro() {
        let format = Format::compile(
            schema! {
                word: Kind::Text,
                count: Kind::Int,
            },
            FormatOptions::new().with_delimiter(Delimiter::Comma),
        )
        .unwrap();
        let record = format.parse_record("dog,3").unwrap();
        assert_eq!(record.get("count"), Some(&Value::Int(3)));
        assert_eq!(format.serialize_record(&record).unwrap(), "dog,3");
    }

    #[test]
    fn test_export_to_json() {
        let format = conllu::format().unwrap();
        let group: Group = format.parse_group(SENTENCE).unwrap();
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["meta"]["text"], "I saw");
        assert_eq!(json["records"][1]["form"], "saw");
        assert_eq!(json["records"][1]["deps"]["0"][0], "root");
    }
}
