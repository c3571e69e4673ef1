//! The CoNLL-U token format.
//!
//! Ten tab-separated columns, built with the same public [`Schema`] builder any caller uses:
//!
//! | column | kind | encoding |
//! |---|---|---|
//! | `id` | text | as is (`1`, `3-4` for a multiword range, `5.1` for an empty node) |
//! | `form`, `lemma`, `upos`, `xpos` | optional text | `_` is absent |
//! | `feats` | map of text to set of text | `Case=Acc,Nom\|Number=Sing`, `_` when empty |
//! | `head`, `deprel` | optional text | `_` is absent |
//! | `deps` | map of text to list of text | `2:nsubj\|4:obj:pass`, `_` when empty |
//! | `misc` | map of text to set of text | like `feats`, but bare keys are allowed |
//!
//! `feats` and `misc` are written with keys and values sorted case-insensitively; `deps` is
//! written in token-id order. A token whose form and lemma are both `_` keeps `_` as the literal
//! text of both.
//!
//! Two corpus utilities sit on top: [`find_ngrams`] searches word-form sequences and
//! [`find_nonprojective_deps`] lists crossing dependency arcs.
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::{conllu, Group, Value};
//!
//! let format = conllu::format().unwrap();
//! let input = "\
//! ## text = They buy
//! 1\tThey\tthey\tPRON\tPRP\tCase=Nom|Number=Plur\t2\tnsubj\t2:nsubj\t_
//! 2\tbuy\tbuy\tVERB\tVBP\tNumber=Plur|Tense=Pres\t0\troot\t0:root\tSpaceAfter=No
//!
//! ";
//! let corpus: Vec<Group> = format.load_from_str(input).unwrap();
//! let buy = &corpus[0].records[1];
//! assert_eq!(
//!     buy.get("feats").and_then(|f| f.as_map()).and_then(|m| m.get(&Value::from("Tense"))),
//!     Some(&Value::set(["Pres"]))
//! );
//!
//! let tree = conllu::tree_from_records(&corpus[0].records).unwrap();
//! assert_eq!(tree.root().data().str("form"), Some("buy"));
//!
//! assert_eq!(format.corpus_to_string(&corpus).unwrap(), input);
//! ```

use crate::descriptor::{self, OrderKey};
use crate::error::{Error, Result};
use crate::group::RecordGroup;
use crate::record::Record;
use crate::schema::{Format, Schema};
use crate::tree::{Tree, TreeBuilder};
use crate::value::{Kind, Value};
use std::collections::HashMap;

/// Column names in file order.
pub const FIELDS: [&str; 10] = [
    "id", "form", "lemma", "upos", "xpos", "feats", "head", "deprel", "deps", "misc",
];

/// Marker for an absent or empty column.
pub const EMPTY: &str = "_";

/// Head id of the root token.
pub const ROOT_HEAD: &str = "0";

/// Orders token ids numerically: `1 < 1.1 < 2 < 2-3 < 3 < 10`.
///
/// A range orders by its start then its end, and a decimal id by its whole then its fractional
/// part. Text that is not a token id keeps its natural order.
///
/// # Examples
///
/// ```rust
/// use conll_schema::conllu;
/// use conll_schema::Value;
/// use std::cmp::Ordering;
///
/// let order = conllu::token_id_order();
/// assert_eq!(order.compare(&Value::from("10"), &Value::from("9")), Ordering::Greater);
/// assert_eq!(order.compare(&Value::from("2-3"), &Value::from("2")), Ordering::Greater);
/// assert_eq!(order.compare(&Value::from("2.1"), &Value::from("3")), Ordering::Less);
/// ```
#[must_use]
pub fn token_id_order() -> OrderKey {
    OrderKey::by(|v| match v.as_str().and_then(token_id_parts) {
        Some(parts) => Value::tuple(parts),
        None => v.clone(),
    })
}

fn token_id_parts(id: &str) -> Option<[i64; 4]> {
    let (start, end) = id.split_once('-').unwrap_or((id, id));
    let (a, b) = decimal_parts(start)?;
    let (c, d) = decimal_parts(end)?;
    Some([a, b, c, d])
}

fn decimal_parts(part: &str) -> Option<(i64, i64)> {
    match part.split_once('.') {
        Some((whole, frac)) => Some((whole.parse().ok()?, frac.parse().ok()?)),
        None => Some((part.parse().ok()?, 0)),
    }
}

fn optional_text() -> descriptor::Descriptor {
    descriptor::nullable(descriptor::text(), EMPTY)
}

fn value_set() -> descriptor::Descriptor {
    descriptor::unique_array(
        descriptor::text(),
        ",",
        Some(""),
        OrderKey::case_insensitive(),
    )
}

/// Restores `_` as literal form and lemma when both columns read as absent.
fn restore_underscores(token: &mut Record) -> std::result::Result<(), String> {
    let both_absent = matches!(
        (token.get("form"), token.get("lemma")),
        (Some(Value::Absent), Some(Value::Absent))
    );
    if both_absent {
        for name in ["form", "lemma"] {
            if let Some(slot) = token.get_mut(name) {
                *slot = Value::from(EMPTY);
            }
        }
    }
    Ok(())
}

/// The CoNLL-U record schema.
#[must_use]
pub fn schema() -> Schema {
    let optional = Kind::optional(Kind::Text);
    let text_sets = Kind::map(Kind::Text, Kind::set(Kind::Text));
    Schema::builder()
        .field("id", Kind::Text)
        .field_with("form", optional.clone(), optional_text())
        .field_with("lemma", optional.clone(), optional_text())
        .field_with("upos", optional.clone(), optional_text())
        .field_with("xpos", optional.clone(), optional_text())
        .field_with(
            "feats",
            text_sets.clone(),
            descriptor::mapping(
                descriptor::text(),
                value_set(),
                "|",
                "=",
                Some(EMPTY),
                OrderKey::case_insensitive(),
            ),
        )
        .field_with("head", optional.clone(), optional_text())
        .field_with("deprel", optional, optional_text())
        .field_with(
            "deps",
            Kind::map(Kind::Text, Kind::list(Kind::Text)),
            descriptor::mapping(
                descriptor::text(),
                descriptor::array(descriptor::text(), ":", None),
                "|",
                ":",
                Some(EMPTY),
                token_id_order(),
            ),
        )
        .field_with(
            "misc",
            text_sets,
            descriptor::mapping_ext(
                descriptor::text(),
                value_set(),
                "|",
                "=",
                Some(EMPTY),
                OrderKey::case_insensitive(),
            ),
        )
        .post_init(restore_underscores)
        .build()
}

/// The CoNLL-U format with default options (tab columns, `#` comments).
pub fn format() -> Result<Format> {
    Format::new(schema())
}

/// Whether the token is a multiword range such as `3-4`.
#[must_use]
pub fn is_multiword(token: &Record) -> bool {
    token.str("id").is_some_and(|id| id.contains('-'))
}

/// Whether the token is an empty node such as `5.1`.
#[must_use]
pub fn is_empty_node(token: &Record) -> bool {
    token.str("id").is_some_and(|id| id.contains('.'))
}

/// Builds the dependency tree of one sentence.
///
/// The root token has head `0`. Multiword ranges and empty nodes do not take part.
pub fn tree_from_records(tokens: &[Record]) -> Result<Tree<'_, Record>> {
    TreeBuilder::new(
        ROOT_HEAD.to_string(),
        |t: &Record| t.str("id").map(str::to_string),
        |t: &Record| t.str("head").map(str::to_string),
    )
    .skip(|t: &Record| is_multiword(t) || is_empty_node(t))
    .build(tokens)
}

/// One occurrence of an n-gram found by [`find_ngrams`].
#[derive(Debug, Clone, PartialEq)]
pub struct NgramMatch<'a, G> {
    /// The sentence holding the occurrence.
    pub group: &'a G,
    /// Position of the first matched token in the sentence's records.
    pub start: usize,
    /// The matched tokens, without any multiword range skipped over.
    pub tokens: Vec<&'a Record>,
}

/// Finds every occurrence of a sequence of word forms across a corpus.
///
/// Multiword ranges never start a match and are stepped over inside one, so `["do", "n't"]`
/// matches the words of a `don't` range. Without `case_sensitive`, forms compare lower-cased.
/// An empty `ngram` matches nothing.
///
/// # Examples
///
/// ```rust
/// use conll_schema::{conllu, Group};
///
/// let input = "\
/// 1\tThe\tthe\tDET\t_\t_\t2\tdet\t_\t_
/// 2\tdog\tdog\tNOUN\t_\t_\t0\troot\t_\t_
///
/// ";
/// let corpus: Vec<Group> = conllu::format().unwrap().load_from_str(input).unwrap();
/// let found = conllu::find_ngrams(&corpus, &["the", "dog"], false);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].start, 0);
/// ```
pub fn find_ngrams<'a, G, I>(
    groups: I,
    ngram: &[&str],
    case_sensitive: bool,
) -> Vec<NgramMatch<'a, G>>
where
    G: RecordGroup + 'a,
    I: IntoIterator<Item = &'a G>,
{
    let mut found = Vec::new();
    for group in groups {
        let tokens = group.records();
        for start in 0..tokens.len() {
            if let Some(matched) = match_at(tokens, start, ngram, case_sensitive) {
                found.push(NgramMatch {
                    group,
                    start,
                    tokens: matched,
                });
            }
        }
    }
    found
}

fn match_at<'a>(
    tokens: &'a [Record],
    start: usize,
    ngram: &[&str],
    case_sensitive: bool,
) -> Option<Vec<&'a Record>> {
    let (first, rest) = ngram.split_first()?;
    let head = tokens.get(start)?;
    if is_multiword(head) || !same_form(head, first, case_sensitive) {
        return None;
    }

    let mut matched = Vec::with_capacity(ngram.len());
    matched.push(head);
    let mut following = tokens[start + 1..].iter().filter(|t| !is_multiword(t));
    for word in rest {
        let token = following.next()?;
        if !same_form(token, word, case_sensitive) {
            return None;
        }
        matched.push(token);
    }
    Some(matched)
}

fn same_form(token: &Record, word: &str, case_sensitive: bool) -> bool {
    match token.str("form") {
        Some(form) if case_sensitive => form == word,
        Some(form) => form.to_lowercase() == word.to_lowercase(),
        None => false,
    }
}

/// Finds the pairs of dependency arcs that cross each other in one sentence.
///
/// Each arc is named by its dependent token. Two arcs cross when exactly one end of one lies
/// strictly inside the span of the other; arcs that share an end do not cross. Every crossing
/// is reported once as `(later, earlier)`, where arcs are ordered by their left end and then by
/// the wider span first. Root arcs, multiword ranges, empty nodes and tokens without a head take
/// no part.
///
/// A head that names no token of the sentence is an [`Error::DanglingHead`].
pub fn find_nonprojective_deps(tokens: &[Record]) -> Result<Vec<(&Record, &Record)>> {
    let positions: HashMap<&str, usize> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.str("id").map(|id| (id, i)))
        .collect();

    // (left, right, dependent)
    let mut arcs = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if is_multiword(token) || is_empty_node(token) {
            continue;
        }
        let head = match token.str("head") {
            Some(head) if head != ROOT_HEAD => head,
            _ => continue,
        };
        let h = *positions.get(head).ok_or_else(|| Error::DanglingHead {
            id: token.str("id").unwrap_or_default().to_string(),
            head: head.to_string(),
        })?;
        arcs.push((i.min(h), i.max(h), i));
    }
    arcs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

    let mut crossing = Vec::new();
    for (k, later) in arcs.iter().enumerate() {
        for earlier in &arcs[..k] {
            if earlier.0 < later.0 && later.0 < earlier.1 && earlier.1 < later.1 {
                crossing.push((&tokens[later.2], &tokens[earlier.2]));
            }
        }
    }
    Ok(crossing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id_parts() {
        assert_eq!(token_id_parts("3"), Some([3, 0, 3, 0]));
        assert_eq!(token_id_parts("3-4"), Some([3, 0, 4, 0]));
        assert_eq!(token_id_parts("3.1"), Some([3, 1, 3, 1]));
        assert_eq!(token_id_parts("x"), None);
    }

    #[test]
    fn test_underscore_form_and_lemma() {
        let format = format().unwrap();
        let token = format
            .parse_record("5\t_\t_\tPUNCT\t_\t_\t4\tpunct\t_\t_")
            .unwrap();
        assert_eq!(token.str("form"), Some("_"));
        assert_eq!(token.str("lemma"), Some("_"));
        assert_eq!(
            format.serialize_record(&token).unwrap(),
            "5\t_\t_\tPUNCT\t_\t_\t4\tpunct\t_\t_"
        );
    }

    #[test]
    fn test_only_lemma_absent() {
        let token = format()
            .unwrap()
            .parse_record("5\tdogs\t_\tNOUN\t_\t_\t4\tobj\t_\t_")
            .unwrap();
        assert_eq!(token.get("lemma"), Some(&Value::Absent));
    }

    #[test]
    fn test_match_at_needs_enough_tokens() {
        let format = format().unwrap();
        let tokens = vec![format
            .parse_record("1\tgo\tgo\tVERB\t_\t_\t0\troot\t_\t_")
            .unwrap()];
        assert!(match_at(&tokens, 0, &["go"], true).is_some());
        assert!(match_at(&tokens, 0, &["go", "home"], true).is_none());
        assert!(match_at(&tokens, 0, &[], true).is_none());
    }

    #[test]
    fn test_token_kinds() {
        let format = format().unwrap();
        let range = format
            .parse_record("1-2\tdon't\t_\t_\t_\t_\t_\t_\t_\t_")
            .unwrap();
        assert!(is_multiword(&range));
        assert!(!is_empty_node(&range));
        let empty = format
            .parse_record("2.1\tgone\tgo\tVERB\t_\t_\t_\t_\t1:conj\t_")
            .unwrap();
        assert!(is_empty_node(&empty));
    }
}
