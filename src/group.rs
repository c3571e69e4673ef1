//! Record groups: the unit between blank lines.
//!
//! The reader never builds a concrete group type itself. It drives any [`RecordGroup`] through
//! three callbacks ([`accept_meta`](RecordGroup::accept_meta),
//! [`accept_record`](RecordGroup::accept_record) and [`finish`](RecordGroup::finish)), and the
//! writer reads it back through [`metadata`](RecordGroup::metadata) and
//! [`records`](RecordGroup::records). [`Group`] is the plain default.
//!
//! ## Examples
//!
//! A group type that keeps only the sentence text and counts tokens:
//!
//! ```rust
//! use conll_schema::{conllu, Metadata, Record, RecordGroup};
//!
//! #[derive(Default)]
//! struct Sentence {
//!     meta: Metadata,
//!     tokens: Vec<Record>,
//! }
//!
//! impl RecordGroup for Sentence {
//!     fn metadata(&self) -> &Metadata { &self.meta }
//!     fn records(&self) -> &[Record] { &self.tokens }
//!     fn records_mut(&mut self) -> &mut Vec<Record> { &mut self.tokens }
//!     fn accept_meta(&mut self, key: String, value: Option<String>) {
//!         if key == "text" {
//!             self.meta.insert(key, value);
//!         }
//!     }
//!     fn accept_record(&mut self, record: Record) { self.tokens.push(record); }
//! }
//!
//! let input = "# sent_id = 1\n# text = Hi\n1\tHi\thi\tINTJ\t_\t_\t0\troot\t_\t_\n";
//! let sentences: Vec<Sentence> = conllu::format().unwrap().load_from_str(input).unwrap();
//! assert_eq!(sentences[0].metadata().len(), 1);
//! assert_eq!(sentences[0].records().len(), 1);
//! ```

use crate::map::Metadata;
use crate::record::Record;
use serde::Serialize;

/// Capabilities the reader and writer need from a group of records.
pub trait RecordGroup: Default {
    /// Metadata in the order it is written.
    fn metadata(&self) -> &Metadata;

    /// Records in line order.
    fn records(&self) -> &[Record];

    fn records_mut(&mut self) -> &mut Vec<Record>;

    /// Called for each metadata comment, in order, before any record of the group.
    fn accept_meta(&mut self, key: String, value: Option<String>);

    /// Called for each record line, in order.
    fn accept_record(&mut self, record: Record);

    /// Called once the group's last line has been read. An `Err` fails the group.
    fn finish(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// The default group: ordered metadata plus ordered records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    pub meta: Metadata,
    pub records: Vec<Record>,
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl RecordGroup for Group {
    fn metadata(&self) -> &Metadata {
        &self.meta
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    fn accept_meta(&mut self, key: String, value: Option<String>) {
        self.meta.insert(key, value);
    }

    fn accept_record(&mut self, record: Record) {
        self.records.push(record);
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
