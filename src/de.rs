//! Reading records and record groups.
//!
//! This module adds the reading half of [`Format`]:
//!
//! - [`Format::parse_record`]: one line into one [`Record`]
//! - [`Format::parse_group`]: text holding exactly one group
//! - [`Format::load_from_str`], [`Format::load_from_reader`], [`Format::load_from_file`]: a whole
//!   corpus, failing on the first error
//! - [`Format::iter_from_str`], [`Format::iter_from_reader`], [`Format::iter_lines`]: a lazy
//!   [`GroupIter`] that reports a faulty group and carries on with the next one
//!
//! ## Line rules
//!
//! - A blank or whitespace-only line ends the current group; runs of blank lines are ignored.
//! - A line starting with the comment marker is metadata. The text after the marker is split on
//!   the first `=` into a trimmed key and value; without `=` the trimmed text is a key with no
//!   value, and an empty key without `=` is dropped. Metadata after a record line of the same
//!   group is an error.
//! - Every other line is a record.
//!
//! Parse errors raised while reading a line source carry the 1-based line number.
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::{conllu, Group};
//!
//! let input = "\
//! ## sent_id = 1
//! ## text = Dogs bark
//! 1\tDogs\tdog\tNOUN\tNNS\tNumber=Plur\t2\tnsubj\t_\t_
//! 2\tbark\tbark\tVERB\tVBP\t_\t0\troot\t_\tSpaceAfter=No
//!
//! ";
//! let groups: Vec<Group> = conllu::format().unwrap().load_from_str(input).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].meta.value("text"), Some("Dogs bark"));
//! assert_eq!(groups[0].records[1].str("form"), Some("bark"));
//! ```

use crate::error::{Error, Result};
use crate::group::RecordGroup;
use crate::record::Record;
use crate::schema::{CompiledField, Format};
use crate::value::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Line iterator over an in-memory string.
pub type StrLines<'a> = std::iter::Map<std::str::Lines<'a>, fn(&'a str) -> io::Result<String>>;

fn owned_line(line: &str) -> io::Result<String> {
    Ok(line.to_string())
}

fn strip_newline(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}

fn decode_column(field: &CompiledField, column: usize, raw: &str) -> Result<Value> {
    field
        .codec
        .decode(raw)
        .map_err(|e| Error::decode(&field.name, column + 1, raw, e))
}

/// Splits comment text (marker already removed) into a metadata entry.
fn parse_comment(text: &str) -> Option<(String, Option<String>)> {
    match text.split_once('=') {
        Some((key, value)) => Some((key.trim().to_string(), Some(value.trim().to_string()))),
        None => {
            let key = text.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), None))
            }
        }
    }
}

impl Format {
    /// Parses one record line.
    ///
    /// A trailing `\n` or `\r\n` is ignored. Column numbers in decode errors are 1-based.
    ///
    /// # Errors
    ///
    /// - [`Error::ColumnCount`] when the number of columns does not fit the schema
    /// - [`Error::Decode`] when a column cannot be decoded by its field
    /// - [`Error::PostInit`] when the post-construction hook rejects the record
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conll_schema::{conllu, Value};
    ///
    /// let format = conllu::format().unwrap();
    /// let token = format
    ///     .parse_record("3\tbook\tbook\tNOUN\t_\tNumber=Sing\t0\troot\t_\t_\n")
    ///     .unwrap();
    /// assert_eq!(token.str("lemma"), Some("book"));
    /// assert_eq!(token.get("xpos"), Some(&Value::Absent));
    ///
    /// let err = format.parse_record("3\tbook").unwrap_err();
    /// assert!(err.to_string().contains("expected 10 columns, found 2"));
    /// ```
    pub fn parse_record(&self, line: &str) -> Result<Record> {
        let compiled = &*self.inner;
        let line = strip_newline(line);
        let delimiter = compiled.options.delimiter.as_str();
        let columns: Vec<&str> = if compiled.options.collapse_delimiters {
            line.split(delimiter).filter(|c| !c.is_empty()).collect()
        } else {
            line.split(delimiter).collect()
        };

        let fields = &compiled.fields;
        let mut values = Vec::with_capacity(fields.len());
        match compiled.varcols {
            None => {
                if columns.len() != fields.len() {
                    return Err(Error::column_count(
                        fields.len(),
                        columns.len(),
                        false,
                        line,
                    ));
                }
                for (i, (field, raw)) in fields.iter().zip(&columns).enumerate() {
                    values.push(decode_column(field, i, raw)?);
                }
            }
            Some(at) => {
                let fixed = fields.len() - 1;
                if columns.len() < fixed {
                    return Err(Error::column_count(fixed, columns.len(), true, line));
                }
                let run = columns.len() - fixed;
                for (i, field) in fields.iter().enumerate() {
                    if i < at {
                        values.push(decode_column(field, i, columns[i])?);
                    } else if i == at {
                        let items = columns[at..at + run]
                            .iter()
                            .enumerate()
                            .map(|(j, raw)| decode_column(field, at + j, raw))
                            .collect::<Result<Vec<_>>>()?;
                        values.push(Value::List(items));
                    } else {
                        let column = i - 1 + run;
                        values.push(decode_column(field, column, columns[column])?);
                    }
                }
            }
        }

        let mut record = Record::from_parts(Arc::clone(&compiled.layout), values);
        if let Some(hook) = compiled.post_init() {
            hook(&mut record).map_err(|msg| Error::PostInit { line: None, msg })?;
        }
        Ok(record)
    }

    /// Parses text that holds at most one group.
    ///
    /// Text with no records or metadata yields an empty group.
    ///
    /// # Errors
    ///
    /// [`Error::MultipleGroups`] if a second group follows the first, plus any error of the
    /// group itself.
    pub fn parse_group<G: RecordGroup>(&self, text: &str) -> Result<G> {
        let mut iter = self.iter_from_str::<G>(text);
        let group = match iter.next() {
            Some(group) => group?,
            None => G::default(),
        };
        if iter.next().is_some() {
            return Err(Error::MultipleGroups {
                line: Some(iter.group_start()),
            });
        }
        Ok(group)
    }

    /// Reads every group of `text`.
    ///
    /// # Errors
    ///
    /// Returns the first error; no partial corpus is returned.
    pub fn load_from_str<G: RecordGroup>(&self, text: &str) -> Result<Vec<G>> {
        self.iter_from_str(text).collect()
    }

    /// Reads every group from a buffered reader.
    pub fn load_from_reader<G: RecordGroup, R: BufRead>(&self, reader: R) -> Result<Vec<G>> {
        self.iter_from_reader(reader).collect()
    }

    /// Reads every group of a UTF-8 file.
    pub fn load_from_file<G: RecordGroup, P: AsRef<Path>>(&self, path: P) -> Result<Vec<G>> {
        let file = File::open(path)?;
        self.load_from_reader(BufReader::new(file))
    }

    /// Lazily iterates over the groups of `text`.
    pub fn iter_from_str<'a, G: RecordGroup>(&self, text: &'a str) -> GroupIter<G, StrLines<'a>> {
        self.iter_lines(text.lines().map(owned_line as fn(&'a str) -> io::Result<String>))
    }

    /// Lazily iterates over the groups read from `reader`.
    pub fn iter_from_reader<G: RecordGroup, R: BufRead>(
        &self,
        reader: R,
    ) -> GroupIter<G, io::Lines<R>> {
        self.iter_lines(reader.lines())
    }

    /// Lazily iterates over the groups of any line source.
    ///
    /// Lines may carry their trailing newline or not.
    pub fn iter_lines<G, I>(&self, lines: I) -> GroupIter<G, I>
    where
        G: RecordGroup,
        I: Iterator<Item = io::Result<String>>,
    {
        GroupIter {
            format: self.clone(),
            lines,
            line_no: 0,
            group_start: 0,
            pending: None,
            done: false,
            _group: PhantomData,
        }
    }
}

/// Lazy, forward-only iterator over the record groups of a line source.
///
/// A group containing a malformed line is reported as `Err` once; the iterator then skips to the
/// next blank line and continues. An I/O error from the source is reported and ends iteration.
///
/// # Examples
///
/// ```rust
/// use conll_schema::{conllu, Group, Result};
///
/// let input = "1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n\n1\tbroken\n2\tx\n\n1\tb\tb\tX\t_\t_\t0\troot\t_\t_\n";
/// let results: Vec<Result<Group>> = conllu::format().unwrap().iter_from_str(input).collect();
///
/// assert_eq!(results.len(), 3);
/// assert!(results[0].is_ok());
/// assert_eq!(results[1].as_ref().unwrap_err().line(), Some(3));
/// assert!(results[2].is_ok());
/// ```
pub struct GroupIter<G, I> {
    format: Format,
    lines: I,
    line_no: usize,
    group_start: usize,
    pending: Option<Error>,
    done: bool,
    _group: PhantomData<fn() -> G>,
}

impl<G, I> GroupIter<G, I>
where
    G: RecordGroup,
    I: Iterator<Item = io::Result<String>>,
{
    /// Number of lines consumed so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line_no
    }

    /// Line number of the first line of the most recently started group.
    #[must_use]
    pub fn group_start(&self) -> usize {
        self.group_start
    }

    fn accept_line(&self, group: &mut G, line: &str, seen_record: &mut bool) -> Result<()> {
        let marker = self.format.options().comment_marker.as_str();
        if let Some(comment) = line.strip_prefix(marker) {
            if *seen_record {
                return Err(Error::metadata(
                    "comment line after a record line of the same group",
                ));
            }
            if let Some((key, value)) = parse_comment(strip_newline(comment)) {
                group.accept_meta(key, value);
            }
            return Ok(());
        }
        let record = self.format.parse_record(line)?;
        *seen_record = true;
        group.accept_record(record);
        Ok(())
    }

    /// Consumes lines up to and including the next blank line.
    fn skip_group(&mut self) {
        for line in self.lines.by_ref() {
            match line {
                Ok(line) => {
                    self.line_no += 1;
                    if line.trim().is_empty() {
                        return;
                    }
                }
                Err(e) => {
                    self.pending = Some(Error::from(e));
                    self.done = true;
                    return;
                }
            }
        }
        self.done = true;
    }
}

impl<G, I> Iterator for GroupIter<G, I>
where
    G: RecordGroup,
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<G>;

    fn next(&mut self) -> Option<Result<G>> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        if self.done {
            return None;
        }

        let mut group = G::default();
        let mut started = false;
        let mut seen_record = false;
        loop {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::from(e)));
                }
                Some(Ok(line)) => line,
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                if started {
                    break;
                }
                continue;
            }
            if !started {
                started = true;
                self.group_start = self.line_no;
            }

            if let Err(err) = self.accept_line(&mut group, &line, &mut seen_record) {
                let err = err.at_line(self.line_no);
                debug!(
                    target: "conll_schema::de",
                    line = self.line_no,
                    error = %err,
                    "Skipping rest of malformed group"
                );
                self.skip_group();
                return Some(Err(err));
            }
        }

        if !started {
            return None;
        }
        if let Err(msg) = group.finish() {
            let err = Error::GroupRejected { line: None, msg }.at_line(self.group_start);
            debug!(
                target: "conll_schema::de",
                line = self.group_start,
                error = %err,
                "Group rejected by finish"
            );
            return Some(Err(err));
        }
        trace!(
            target: "conll_schema::de",
            line = self.group_start,
            records = group.records().len(),
            "Group parsed"
        );
        Some(Ok(group))
    }
}

impl<G, I> FusedIterator for GroupIter<G, I>
where
    G: RecordGroup,
    I: Iterator<Item = io::Result<String>>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor;
    use crate::group::Group;
    use crate::options::{Delimiter, FormatOptions};
    use crate::schema::Schema;
    use crate::value::Kind;

    fn pairs() -> Format {
        Format::new(
            Schema::builder()
                .field("id", Kind::Int)
                .field("word", Kind::Text)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_comment() {
        assert_eq!(
            parse_comment(" sent_id = a = b "),
            Some(("sent_id".to_string(), Some("a = b".to_string())))
        );
        assert_eq!(parse_comment(" newdoc "), Some(("newdoc".to_string(), None)));
        assert_eq!(parse_comment("   "), None);
        assert_eq!(
            parse_comment(" = x"),
            Some((String::new(), Some("x".to_string())))
        );
    }

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline("a\tb\r\n"), "a\tb");
        assert_eq!(strip_newline("a\tb\n"), "a\tb");
        assert_eq!(strip_newline("a\tb"), "a\tb");
    }

    #[test]
    fn test_decode_error_reports_field_and_column() {
        let err = pairs().parse_record("x\tdog").unwrap_err();
        match err {
            Error::Decode {
                field, column, raw, ..
            } => {
                assert_eq!(field, "id");
                assert_eq!(column, 1);
                assert_eq!(raw, "x");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_collapse_delimiters() {
        let format = Format::compile(
            Schema::builder()
                .field("id", Kind::Int)
                .field("word", Kind::Text)
                .build(),
            FormatOptions::new()
                .with_delimiter(Delimiter::Space)
                .with_collapse_delimiters(true),
        )
        .unwrap();
        let r = format.parse_record("7    seven").unwrap();
        assert_eq!(r.get("id"), Some(&Value::Int(7)));
        assert_eq!(r.str("word"), Some("seven"));
    }

    #[test]
    fn test_varcols_in_the_middle() {
        let format = Format::new(
            Schema::builder()
                .field("first", Kind::Text)
                .field_with(
                    "middle",
                    Kind::list(Kind::Int),
                    descriptor::varcols(descriptor::int()),
                )
                .field("last", Kind::Text)
                .build(),
        )
        .unwrap();

        let r = format.parse_record("a\t1\t2\t3\tz").unwrap();
        assert_eq!(r.str("first"), Some("a"));
        assert_eq!(r.get("middle"), Some(&Value::list([1, 2, 3])));
        assert_eq!(r.str("last"), Some("z"));

        let r = format.parse_record("a\tz").unwrap();
        assert_eq!(r.get("middle"), Some(&Value::List(vec![])));

        let err = format.parse_record("a").unwrap_err();
        assert!(err.to_string().contains("expected at least 2 columns, found 1"));

        let err = format.parse_record("a\t1\tq\tz").unwrap_err();
        assert!(matches!(err, Error::Decode { column: 3, .. }));
    }

    #[test]
    fn test_empty_input_has_no_groups() {
        let groups: Vec<Group> = pairs().load_from_str("").unwrap();
        assert!(groups.is_empty());
        let groups: Vec<Group> = pairs().load_from_str("\n  \n\n").unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_parse_group_rejects_second_group() {
        let err = pairs()
            .parse_group::<Group>("1\ta\n\n2\tb\n")
            .unwrap_err();
        assert_eq!(err, Error::MultipleGroups { line: Some(3) });

        let group: Group = pairs().parse_group("").unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn test_comment_after_record_is_an_error() {
        let err = pairs()
            .load_from_str::<Group>("# a = 1\n1\tx\n# b = 2\n")
            .unwrap_err();
        assert!(matches!(err, Error::Metadata { line: Some(3), .. }));
    }

    #[test]
    fn test_io_error_ends_iteration() {
        let lines = vec![
            Ok("1\ta".to_string()),
            Ok(String::new()),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
            Ok("2\tb".to_string()),
        ];
        let mut iter = pairs().iter_lines::<Group, _>(lines.into_iter());
        assert!(iter.next().unwrap().is_ok());
        let err = iter.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_finish_failure_is_reported() {
        #[derive(Default)]
        struct NonEmpty(Group);

        impl RecordGroup for NonEmpty {
            fn metadata(&self) -> &crate::Metadata {
                &self.0.meta
            }
            fn records(&self) -> &[Record] {
                &self.0.records
            }
            fn records_mut(&mut self) -> &mut Vec<Record> {
                &mut self.0.records
            }
            fn accept_meta(&mut self, key: String, value: Option<String>) {
                self.0.accept_meta(key, value);
            }
            fn accept_record(&mut self, record: Record) {
                self.0.accept_record(record);
            }
            fn finish(&mut self) -> std::result::Result<(), String> {
                if self.0.records.is_empty() {
                    Err("no records".to_string())
                } else {
                    Ok(())
                }
            }
        }

        let results: Vec<Result<NonEmpty>> =
            pairs().iter_from_str("# only = meta\n\n1\tx\n").collect();
        assert_eq!(results.len(), 2);
        let err = results[0].as_ref().err().unwrap();
        assert!(matches!(err, Error::GroupRejected { msg, .. } if msg == "no records"));
        assert_eq!(err.line(), Some(1));
        assert!(err.is_parse());
        assert!(err.to_string().contains("at line 1"));
        assert!(results[1].is_ok());
    }
}
