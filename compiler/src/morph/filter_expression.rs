//! Filter expression extraction.
//!
//! A stored filter expression is a JSON array of single-entry objects:
//!
//! ```text
//! [ { "person.age": "^[0-9]+$" }, { "person.type": "adult" } ]
//! ```
//!
//! Entries form an implicit conjunction. Their order matters: the last
//! entry's path governs when the whole predicate block resets.

use serde_json::Value;

use crate::diagnostics::log_warning;
use crate::error::{FilterExpressionError, FilterExpressionResult};

/// Ordered mapping from (escaped) attribute path to regex pattern.
///
/// Re-inserting a path replaces its pattern but keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    entries: Vec<(String, String)>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, pattern: impl Into<String>) {
        let path = path.into();
        let pattern = pattern.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = pattern,
            None => self.entries.push((path, pattern)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, pattern)| pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// The last-inserted path, which bounds the conjunction
    pub fn last_path(&self) -> Option<&str> {
        self.entries.last().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }
}

impl<P: Into<String>, R: Into<String>> FromIterator<(P, R)> for FilterExpression {
    fn from_iter<I: IntoIterator<Item = (P, R)>>(iter: I) -> Self {
        let mut expression = Self::new();
        for (path, pattern) in iter {
            expression.insert(path, pattern);
        }
        expression
    }
}

/// Parse a filter expression, reporting malformed input.
///
/// `None` and empty input yield an empty expression. Array elements that are
/// not objects contribute nothing.
pub fn try_extract(raw: Option<&str>) -> FilterExpressionResult<FilterExpression> {
    let mut expression = FilterExpression::new();

    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Ok(expression),
    };

    let parsed: Value = serde_json::from_str(raw)?;
    let items = match parsed {
        Value::Array(items) => items,
        other => return Err(FilterExpressionError::NotAnArray(json_kind(&other))),
    };

    for item in items {
        if let Value::Object(fields) = item {
            for (path, pattern) in fields {
                expression.insert(path, as_text(&pattern));
            }
        }
    }

    Ok(expression)
}

/// Parse a filter expression, degrading to "no filter" on malformed input.
///
/// The failure is logged and broadcast as a warning diagnostic.
pub fn extract(raw: Option<&str>) -> FilterExpression {
    match try_extract(raw) {
        Ok(expression) => expression,
        Err(e) => {
            log_warning(format!("ignoring malformed filter expression: {}", e));
            FilterExpression::new()
        }
    }
}

/// Plain-text reading of a JSON scalar: strings unquoted, containers empty.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
