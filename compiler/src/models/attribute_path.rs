//! Attribute paths address a position inside a hierarchical record.
//!
//! A path is a sequence of attribute identifiers joined by
//! [`ATTRIBUTE_DELIMITER`]. Identifiers never contain the delimiter, so
//! splitting and rejoining always reproduces the original text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between attribute identifiers, fixed for the whole process.
pub const ATTRIBUTE_DELIMITER: char = '.';

/// An ordered, delimiter-joined sequence of attribute identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributePath(String);

impl AttributePath {
    /// Wrap an already delimiter-joined path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Join identifiers with the attribute delimiter.
    pub fn join<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&ATTRIBUTE_DELIMITER.to_string());
        Self(joined)
    }

    /// The delimiter-joined text of this path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into attribute identifiers.
    ///
    /// Text without a delimiter is a single-segment path.
    pub fn segments(&self) -> Vec<&str> {
        segments(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every identifier of `prefix` equals the identifier at the
    /// same position in `self`. A path starts with itself.
    pub fn starts_with(&self, prefix: &AttributePath) -> bool {
        let own = self.segments();
        let theirs = prefix.segments();
        theirs.len() <= own.len() && theirs.iter().zip(own.iter()).all(|(a, b)| a == b)
    }
}

/// Split delimiter-joined text into identifiers.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(ATTRIBUTE_DELIMITER).collect()
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttributePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for AttributePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl AsRef<str> for AttributePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
