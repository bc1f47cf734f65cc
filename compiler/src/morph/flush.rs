//! Flush path resolution for filtered values.
//!
//! A streaming engine walks each record depth-first. A filter collects the
//! value and its conditions and must be evaluated and reset at a point that
//! encloses all of them. Flushing at the record is always correct but merges
//! repeated entities; flushing at the deepest shared ancestor keeps each
//! entity instance separate.
//!
//! ```text
//! value:   person.name          filters: person.age
//! common string prefix:  "person."   ->  flush at "person"
//!
//! value:   persona.name         filters: person.x
//! common string prefix:  "person"    ->  not an identifier of the value -> record
//!
//! value:   title                filters: titles
//! common string prefix:  "title"     ->  the value's own identifier -> flush at "title"
//! ```

use std::fmt;

use crate::models::{AttributePath, ATTRIBUTE_DELIMITER};
use crate::morph::escape::unescape_xml;

/// Literal flush target meaning "once per whole record".
pub const RECORD_IDENTIFIER: &str = "record";

/// Where an accumulator is evaluated and reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushPath {
    /// Once per input record
    Record,
    /// Once per occurrence of this shared ancestor
    Path(AttributePath),
}

impl FlushPath {
    /// The value written into the script's flush attribute.
    pub fn as_str(&self) -> &str {
        match self {
            FlushPath::Record => RECORD_IDENTIFIER,
            FlushPath::Path(path) => path.as_str(),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FlushPath::Record)
    }
}

impl fmt::Display for FlushPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the flush path for a value filtered by conditions on `filter_paths`.
///
/// Filter paths are XML-unescaped first. The longest common string prefix is
/// cut back to a delimiter boundary; a prefix without any delimiter is kept
/// whole. The candidate is accepted only if each of its identifiers equals
/// the identifier at the same position in the value path, otherwise the
/// record is used.
pub fn resolve_flush_path<'a, I>(value_path: &str, filter_paths: I) -> FlushPath
where
    I: IntoIterator<Item = &'a str>,
{
    let filter_paths: Vec<String> = filter_paths
        .into_iter()
        .map(|p| unescape_xml(p).into_owned())
        .collect();

    let common = common_attribute_path(value_path, &filter_paths);
    if common.is_empty() {
        return FlushPath::Record;
    }

    let candidate = AttributePath::new(common);
    if AttributePath::new(value_path).starts_with(&candidate) {
        FlushPath::Path(candidate)
    } else {
        FlushPath::Record
    }
}

/// Longest common prefix trimmed to a delimiter boundary.
fn common_attribute_path<'v>(value_path: &'v str, filter_paths: &[String]) -> &'v str {
    let prefix = &value_path[..common_prefix_len(value_path, filter_paths)];

    if let Some(stripped) = prefix.strip_suffix(ATTRIBUTE_DELIMITER) {
        return stripped;
    }

    match prefix.rfind(ATTRIBUTE_DELIMITER) {
        Some(idx) => &prefix[..idx],
        None => prefix,
    }
}

/// Byte length of the longest prefix of `first` shared by all `others`,
/// always on a char boundary.
fn common_prefix_len(first: &str, others: &[String]) -> usize {
    let mut len = first.len();
    for other in others {
        len = first[..len]
            .char_indices()
            .zip(other.chars())
            .find(|((_, a), b)| a != b)
            .map(|((idx, _), _)| idx)
            .unwrap_or_else(|| len.min(other.len()));
    }
    len
}
