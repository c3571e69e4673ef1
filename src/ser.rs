//! Writing records and record groups.
//!
//! This module adds the writing half of [`Format`]:
//!
//! - [`Format::serialize_record`]: one record into one line (no trailing newline)
//! - [`Format::serialize_group`]: metadata lines then record lines, each ending in `\n`
//! - [`Format::write_group`], [`Format::write_corpus`], [`Format::corpus_to_string`]: output to
//!   any [`std::io::Write`]; a corpus puts a blank line after every group
//!
//! Output is either exactly what reading would turn back into the same data, or an
//! [`Error::Format`]. Nothing partial is written for a group that fails.
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::{conllu, Group};
//!
//! let format = conllu::format().unwrap();
//! let input = "# text = Hi\n1\tHi\thi\tINTJ\t_\t_\t0\troot\t_\t_\n\n";
//! let corpus: Vec<Group> = format.load_from_str(input).unwrap();
//!
//! assert_eq!(format.corpus_to_string(&corpus).unwrap(), input);
//! ```

use crate::error::{Error, Result};
use crate::group::RecordGroup;
use crate::map::Metadata;
use crate::record::Record;
use crate::schema::Format;
use crate::value::Value;
use std::io::Write;
use std::sync::Arc;
use tracing::trace;

impl Format {
    /// Serializes one record into a line without a trailing newline.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] when a field holds a value its descriptor cannot write back
    /// unambiguously, when column text contains the delimiter or a line break, when the line
    /// would read back as a comment or a blank line, or when the record belongs to another
    /// format's layout.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::{conllu, Value};
    ///
    /// let format = conllu::format().unwrap();
    /// let mut token = format.parse_record("1\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\t_").unwrap();
    ///
    /// token.set("form", "do\tg").unwrap();
    /// assert!(format.serialize_record(&token).unwrap_err().is_format());
    ///
    /// token.set("form", "dogs").unwrap();
    /// assert_eq!(
    ///     format.serialize_record(&token).unwrap(),
    ///     "1\tdogs\tdog\tNOUN\t_\t_\t0\troot\t_\t_"
    /// );
    /// ```
    pub fn serialize_record(&self, record: &Record) -> Result<String> {
        let compiled = &*self.inner;
        if !Arc::ptr_eq(record.layout(), &compiled.layout) && **record.layout() != *compiled.layout
        {
            return Err(Error::format(
                "*",
                "record fields do not match the fields of this format",
            ));
        }

        let delimiter = compiled.options.delimiter.as_str();
        let mut columns: Vec<String> = Vec::with_capacity(record.len());
        for (i, (field, value)) in compiled.fields.iter().zip(record.values()).enumerate() {
            if compiled.varcols == Some(i) {
                let items = match value {
                    Value::List(items) => items,
                    other => {
                        return Err(Error::format(
                            &field.name,
                            format!("expected list value, found {}", other.type_name()),
                        ))
                    }
                };
                for item in items {
                    let text = field
                        .codec
                        .encode(item)
                        .map_err(|e| Error::format(&field.name, e))?;
                    self.check_column(&field.name, &text)?;
                    columns.push(text);
                }
            } else {
                let text = field
                    .codec
                    .encode(value)
                    .map_err(|e| Error::format(&field.name, e))?;
                self.check_column(&field.name, &text)?;
                columns.push(text);
            }
        }

        let line = columns.join(delimiter);
        if let Some(name) = compiled.fields.first().map(|f| f.name.as_str()) {
            if line.starts_with(compiled.options.comment_marker.as_str()) {
                return Err(Error::format(
                    name,
                    "record line would start with the comment marker",
                ));
            }
            if line.trim().is_empty() {
                return Err(Error::format(name, "record line would read back as blank"));
            }
        }
        Ok(line)
    }

    fn check_column(&self, field: &str, text: &str) -> Result<()> {
        let options = &self.inner.options;
        let delimiter = options.delimiter.as_str();
        if text.contains(delimiter) {
            return Err(Error::format(
                field,
                format!("column text {:?} contains the delimiter {:?}", text, delimiter),
            ));
        }
        if text.contains(['\n', '\r']) {
            return Err(Error::format(
                field,
                format!("column text {:?} contains a line break", text),
            ));
        }
        if options.collapse_delimiters && text.is_empty() {
            return Err(Error::format(
                field,
                "empty column cannot be written when delimiters collapse",
            ));
        }
        Ok(())
    }

    fn push_metadata(&self, meta: &Metadata, out: &mut String) -> Result<()> {
        let marker = self.inner.options.comment_marker.as_str();
        for (key, value) in meta {
            check_meta_text("key", key)?;
            if key.contains('=') {
                return Err(Error::format(
                    "metadata",
                    format!("key {:?} contains '='", key),
                ));
            }
            match value {
                Some(value) => {
                    check_meta_text("value", value)?;
                    out.push_str(&format!("{} {} = {}\n", marker, key, value));
                }
                None => {
                    if key.is_empty() {
                        return Err(Error::format(
                            "metadata",
                            "an empty key needs a value to be written",
                        ));
                    }
                    out.push_str(&format!("{} {}\n", marker, key));
                }
            }
        }
        Ok(())
    }

    fn push_group<G: RecordGroup>(&self, group: &G, out: &mut String) -> Result<()> {
        self.push_metadata(group.metadata(), out)?;
        for record in group.records() {
            out.push_str(&self.serialize_record(record)?);
            out.push('\n');
        }
        Ok(())
    }

    /// Serializes a group: metadata lines, then one line per record, each ending in `\n`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::{conllu, Group};
    ///
    /// let format = conllu::format().unwrap();
    /// let mut group = Group::new();
    /// group.meta.insert("newdoc", None::<&str>);
    /// group.meta.insert("sent_id", Some("a-1"));
    ///
    /// assert_eq!(
    ///     format.serialize_group(&group).unwrap(),
    ///     "# newdoc\n# sent_id = a-1\n"
    /// );
    /// ```
    pub fn serialize_group<G: RecordGroup>(&self, group: &G) -> Result<String> {
        let mut out = String::new();
        self.push_group(group, &mut out)?;
        Ok(out)
    }

    /// Writes one group to `writer`. Nothing is written if any line fails to serialize.
    pub fn write_group<G: RecordGroup, W: Write>(&self, group: &G, writer: &mut W) -> Result<()> {
        let text = self.serialize_group(group)?;
        writer.write_all(text.as_bytes())?;
        trace!(
            target: "conll_schema::ser",
            records = group.records().len(),
            "Group written"
        );
        Ok(())
    }

    /// Writes every group followed by a blank line.
    ///
    /// Groups before a failing group have already been written when the error is returned.
    pub fn write_corpus<'g, G, I, W>(&self, groups: I, writer: &mut W) -> Result<()>
    where
        G: RecordGroup + 'g,
        I: IntoIterator<Item = &'g G>,
        W: Write,
    {
        for group in groups {
            let mut text = self.serialize_group(group)?;
            text.push('\n');
            writer.write_all(text.as_bytes())?;
            trace!(
                target: "conll_schema::ser",
                records = group.records().len(),
                "Group written"
            );
        }
        writer.flush().map_err(Error::from)
    }

    /// Serializes a whole corpus into a string.
    pub fn corpus_to_string<'g, G, I>(&self, groups: I) -> Result<String>
    where
        G: RecordGroup + 'g,
        I: IntoIterator<Item = &'g G>,
    {
        let mut out = String::new();
        for group in groups {
            self.push_group(group, &mut out)?;
            out.push('\n');
        }
        Ok(out)
    }
}

/// Metadata text must survive the reader's trimming and line splitting.
fn check_meta_text(what: &str, text: &str) -> Result<()> {
    if text.contains(['\n', '\r']) {
        return Err(Error::format(
            "metadata",
            format!("{} {:?} contains a line break", what, text),
        ));
    }
    if text.trim() != text {
        return Err(Error::format(
            "metadata",
            format!("{} {:?} has surrounding whitespace", what, text),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor;
    use crate::group::Group;
    use crate::options::{Delimiter, FormatOptions};
    use crate::schema::Schema;
    use crate::value::Kind;

    fn words() -> Format {
        Format::new(
            Schema::builder()
                .field("word", Kind::Text)
                .field_with(
                    "tags",
                    Kind::list(Kind::Text),
                    descriptor::varcols(descriptor::text()),
                )
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_varcols_round_trip() {
        let format = words();
        for line in ["dog\tN\tSG", "dog"] {
            let r = format.parse_record(line).unwrap();
            assert_eq!(format.serialize_record(&r).unwrap(), line);
        }
    }

    #[test]
    fn test_rejects_comment_like_line() {
        let format = words();
        let mut r = format.new_record();
        r.set("word", "#hash").unwrap();
        assert!(format.serialize_record(&r).is_err());
    }

    #[test]
    fn test_rejects_blank_line() {
        let format = words();
        let r = format.new_record();
        let err = format.serialize_record(&r).unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn test_rejects_line_break() {
        let format = words();
        let mut r = format.new_record();
        r.set("word", "a\nb").unwrap();
        assert!(format
            .serialize_record(&r)
            .unwrap_err()
            .to_string()
            .contains("line break"));
    }

    #[test]
    fn test_collapse_forbids_empty_columns() {
        let format = Format::compile(
            Schema::builder()
                .field("a", Kind::Text)
                .field("b", Kind::Text)
                .build(),
            FormatOptions::new()
                .with_delimiter(Delimiter::Space)
                .with_collapse_delimiters(true),
        )
        .unwrap();
        let mut r = format.new_record();
        r.set("a", "x").unwrap();
        assert!(format.serialize_record(&r).is_err());
        r.set("b", "y").unwrap();
        assert_eq!(format.serialize_record(&r).unwrap(), "x y");
    }

    #[test]
    fn test_rejects_foreign_record() {
        let other = Format::new(Schema::builder().field("x", Kind::Text).build()).unwrap();
        let r = other.parse_record("dog").unwrap();
        assert!(words().serialize_record(&r).is_err());
    }

    #[test]
    fn test_metadata_checks() {
        let format = words();
        let mut group = Group::new();
        group.meta.insert("a=b", Some("1"));
        assert!(format.serialize_group(&group).is_err());

        let mut group = Group::new();
        group.meta.insert("text", Some("two\nlines"));
        assert!(format.serialize_group(&group).is_err());

        let mut group = Group::new();
        group.meta.insert("", None::<&str>);
        assert!(format.serialize_group(&group).is_err());
    }

    #[test]
    fn test_write_corpus_separates_groups() {
        let format = words();
        let groups: Vec<Group> = format.load_from_str("# id = 1\na\tX\n\nb\n").unwrap();
        let mut out = Vec::new();
        format.write_corpus(&groups, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "# id = 1\na\tX\n\nb\n\n");
    }
}
