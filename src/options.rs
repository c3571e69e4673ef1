//! Configuration options for reading and writing record lines.
//!
//! This module provides types to customize how a compiled [`Format`](crate::Format) splits and
//! joins lines:
//!
//! - [`FormatOptions`]: Main configuration struct
//! - [`Delimiter`]: Column delimiter (tab by default)
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::{Delimiter, FormatOptions};
//!
//! // CoNLL defaults: tab columns, '#' comments
//! let options = FormatOptions::new();
//! assert_eq!(options.delimiter.as_str(), "\t");
//!
//! // Whitespace separated columns where runs of spaces count as one delimiter
//! let options = FormatOptions::new()
//!     .with_delimiter(Delimiter::Space)
//!     .with_collapse_delimiters(true);
//! assert!(options.collapse_delimiters);
//! ```

/// Delimiter between the columns of a record line.
///
/// # Examples
///
/// ```rust
/// use conll_schema::Delimiter;
///
/// assert_eq!(Delimiter::Tab.as_str(), "\t");
/// assert_eq!(Delimiter::Pipe.as_str(), "|");
/// assert_eq!(Delimiter::Custom(";;".to_string()).as_str(), ";;");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
    Pipe,
    Space,
    Custom(String),
}

impl Delimiter {
    /// Returns the string representation of this delimiter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Delimiter::Tab => "\t",
            Delimiter::Comma => ",",
            Delimiter::Pipe => "|",
            Delimiter::Space => " ",
            Delimiter::Custom(s) => s,
        }
    }
}

/// Line-level configuration shared by the parser and the serializer.
///
/// # Examples
///
/// ```rust
/// use conll_schema::{Delimiter, FormatOptions};
///
/// let options = FormatOptions::new()
///     .with_delimiter(Delimiter::Comma)
///     .with_comment_marker("%");
/// assert_eq!(options.comment_marker, "%");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub delimiter: Delimiter,
    pub comment_marker: String,
    /// When set, consecutive delimiters are read as one and empty columns cannot be written.
    pub collapse_delimiters: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            delimiter: Delimiter::default(),
            comment_marker: "#".to_string(),
            collapse_delimiters: false,
        }
    }
}

impl FormatOptions {
    /// Creates default options (tab delimiter, `#` comment marker, no collapsing).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::FormatOptions;
    ///
    /// let options = FormatOptions::new();
    /// assert_eq!(options.comment_marker, "#");
    /// assert!(!options.collapse_delimiters);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the prefix that marks metadata lines.
    #[must_use]
    pub fn with_comment_marker(mut self, marker: &str) -> Self {
        self.comment_marker = marker.to_string();
        self
    }

    /// Sets whether runs of delimiters are treated as a single delimiter.
    #[must_use]
    pub fn with_collapse_delimiters(mut self, collapse: bool) -> Self {
        self.collapse_delimiters = collapse;
        self
    }
}
