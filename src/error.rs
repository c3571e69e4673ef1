//! Error types for schema compilation, parsing, serialization and tree building.
//!
//! Every fallible operation in this crate returns [`Result`], whose error side is the single
//! [`Error`] enum. Variants fall into a small number of categories, reported by
//! [`Error::category`]:
//!
//! - **Parse**: malformed input text (wrong column count, undecodable column, misplaced comment)
//! - **Format**: a record cannot be written without ambiguity or loss
//! - **Schema**: the record specification itself is invalid; raised before any data is touched
//! - **Tree**: the id/head references of a group do not form a single rooted tree
//! - **Io**: the underlying line source or sink failed
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::{conllu, Error, ErrorCategory};
//!
//! let format = conllu::format().unwrap();
//! let err: Error = format.parse_record("1\tonly\tthree").unwrap_err();
//!
//! assert_eq!(err.category(), ErrorCategory::Parse);
//! assert!(err.to_string().contains("expected 10 columns, found 3"));
//! ```

use std::fmt;
use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Io,
    Parse,
    Format,
    Schema,
    Tree,
}

/// Represents all possible errors raised by this crate.
///
/// Parse errors carry the 1-based line number of the offending line when the error was raised
/// while reading a line source; errors from [`Format::parse_record`](crate::Format::parse_record)
/// called directly have no line number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error while reading from a line source or writing to a sink
    #[error("IO error: {0}")]
    Io(String),

    /// A record line has the wrong number of columns
    #[error(
        "Parse error{}: expected {}{expected} columns, found {found}: {context:?}",
        line_suffix(.line),
        at_least(.variable)
    )]
    ColumnCount {
        line: Option<usize>,
        expected: usize,
        found: usize,
        variable: bool,
        context: String,
    },

    /// A column could not be decoded by its field descriptor
    #[error("Parse error{}: field '{field}' (column {column}) could not decode {raw:?}: {msg}", line_suffix(.line))]
    Decode {
        line: Option<usize>,
        field: String,
        column: usize,
        raw: String,
        msg: String,
    },

    /// A metadata line is malformed or misplaced
    #[error("Parse error{}: {msg}", line_suffix(.line))]
    Metadata { line: Option<usize>, msg: String },

    /// The post-construction hook rejected a freshly decoded record
    #[error("Parse error{}: record rejected after decoding: {msg}", line_suffix(.line))]
    PostInit { line: Option<usize>, msg: String },

    /// The group's `finish` hook rejected a fully read group; the line is the group's first line
    #[error("Parse error{}: group rejected: {msg}", line_suffix(.line))]
    GroupRejected { line: Option<usize>, msg: String },

    /// A single group was requested but the source held more than one
    #[error("Parse error{}: expected a single record group, found more than one", line_suffix(.line))]
    MultipleGroups { line: Option<usize> },

    /// A record cannot be serialized without ambiguity or loss
    #[error("Format error in field '{field}': {msg}")]
    Format { field: String, msg: String },

    /// The record specification is invalid
    #[error("Schema error: {0}")]
    Schema(String),

    /// No record points at the starting id
    #[error("Tree error: no record has head {starting_id:?}, the group has no root")]
    NoRoot { starting_id: String },

    /// More than one record points at the starting id
    #[error("Tree error: {count} records have head {starting_id:?}, expected exactly one root")]
    MultipleRoots { starting_id: String, count: usize },

    /// A head reference does not resolve to any record id in the group
    #[error("Tree error: record {id:?} references head {head:?} which does not exist")]
    DanglingHead { id: String, head: String },

    /// The id extractor produced nothing for a participating record
    #[error("Tree error: record at position {position} has no id")]
    MissingId { position: usize },

    /// The head extractor produced nothing for a participating record
    #[error("Tree error: record {id:?} has no head")]
    MissingHead { id: String },

    /// Two participating records share an id
    #[error("Tree error: id {id:?} appears more than once")]
    DuplicateId { id: String },

    /// Records that can never be reached from the root, such as members of a head cycle
    #[error("Tree error: records {ids:?} are not attached to the root")]
    Unattached { ids: Vec<String> },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn at_least(variable: &bool) -> &'static str {
    if *variable {
        "at least "
    } else {
        ""
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" at line {}", n),
        None => String::new(),
    }
}

impl Error {
    /// Creates a column count mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::Error;
    ///
    /// let err = Error::column_count(10, 3, false, "1\ta\tb");
    /// assert!(err.to_string().contains("expected 10 columns, found 3"));
    /// ```
    pub fn column_count(expected: usize, found: usize, variable: bool, context: &str) -> Self {
        Error::ColumnCount {
            line: None,
            expected,
            found,
            variable,
            context: context.to_string(),
        }
    }

    /// Creates a column decode error for the named field.
    pub fn decode(field: &str, column: usize, raw: &str, msg: impl fmt::Display) -> Self {
        Error::Decode {
            line: None,
            field: field.to_string(),
            column,
            raw: raw.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a metadata error.
    pub fn metadata(msg: &str) -> Self {
        Error::Metadata {
            line: None,
            msg: msg.to_string(),
        }
    }

    /// Creates a serialization error for the named field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::Error;
    ///
    /// let err = Error::format("head", "missing required value");
    /// assert!(err.is_format());
    /// ```
    pub fn format(field: &str, msg: impl fmt::Display) -> Self {
        Error::Format {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a schema error.
    pub fn schema(msg: impl fmt::Display) -> Self {
        Error::Schema(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for line source or sink failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Attaches a 1-based line number to a parse error.
    ///
    /// Errors of other categories, and parse errors that already carry a line, are returned
    /// unchanged.
    #[must_use]
    pub fn at_line(mut self, n: usize) -> Self {
        match &mut self {
            Error::ColumnCount { line, .. }
            | Error::Decode { line, .. }
            | Error::Metadata { line, .. }
            | Error::PostInit { line, .. }
            | Error::GroupRejected { line, .. }
            | Error::MultipleGroups { line } => {
                if line.is_none() {
                    *line = Some(n);
                }
            }
            _ => {}
        }
        self
    }

    /// Returns the line number attached to a parse error, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::ColumnCount { line, .. }
            | Error::Decode { line, .. }
            | Error::Metadata { line, .. }
            | Error::PostInit { line, .. }
            | Error::GroupRejected { line, .. }
            | Error::MultipleGroups { line } => *line,
            _ => None,
        }
    }

    /// Returns the broad category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Error::Io(_) => ErrorCategory::Io,
            Error::ColumnCount { .. }
            | Error::Decode { .. }
            | Error::Metadata { .. }
            | Error::PostInit { .. }
            | Error::GroupRejected { .. }
            | Error::MultipleGroups { .. }
            | Error::Custom(_) => ErrorCategory::Parse,
            Error::Format { .. } => ErrorCategory::Format,
            Error::Schema(_) => ErrorCategory::Schema,
            Error::NoRoot { .. }
            | Error::MultipleRoots { .. }
            | Error::DanglingHead { .. }
            | Error::MissingId { .. }
            | Error::MissingHead { .. }
            | Error::DuplicateId { .. }
            | Error::Unattached { .. } => ErrorCategory::Tree,
        }
    }

    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self.category(), ErrorCategory::Parse)
    }

    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self.category(), ErrorCategory::Format)
    }

    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self.category(), ErrorCategory::Schema)
    }

    #[must_use]
    pub const fn is_tree(&self) -> bool {
        matches!(self.category(), ErrorCategory::Tree)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
