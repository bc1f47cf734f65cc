//! Domain models for mapping tasks.
//!
//! This module contains the task definition the compiler consumes:
//!
//! - [`Task`] - A named, ordered list of mappings
//! - [`Mapping`] - One output attribute path produced by one component
//! - [`Component`] - A named value-transform function with parameters
//! - [`Filter`] - A stored filter expression gating a mapping
//! - [`AttributePath`] - Delimiter-joined attribute identifiers
//!
//! Tasks are produced upstream and consumed read-only.

pub mod attribute_path;

pub use attribute_path::{segments, AttributePath, ATTRIBUTE_DELIMITER};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::{TaskError, TaskResult};
use crate::morph::escape::unescape_xml;

// =============================================================================
// Task
// =============================================================================

/// A complete mapping task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task name, written into the script's meta section
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Mappings in emission order
    #[serde(default)]
    pub mappings: Vec<Mapping>,
}

impl Task {
    /// Create an empty task
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            mappings: Vec::new(),
        }
    }

    /// Add a mapping to the end of the task
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Parse a task from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a task from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> TaskResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that every mapping is addressable.
    ///
    /// Mapping names must be unique because they name script variables.
    pub fn validate(&self) -> TaskResult<()> {
        if self.name.trim().is_empty() {
            return Err(TaskError::InvalidTask("task name is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for mapping in &self.mappings {
            if mapping.name.trim().is_empty() {
                return Err(TaskError::InvalidTask(format!(
                    "mapping producing '{}' has no name",
                    mapping.output_attribute_path
                )));
            }
            if mapping.input_attribute_path.is_empty() {
                return Err(TaskError::MissingPath {
                    mapping: mapping.name.clone(),
                    field: "input attribute path",
                });
            }
            if mapping.output_attribute_path.is_empty() {
                return Err(TaskError::MissingPath {
                    mapping: mapping.name.clone(),
                    field: "output attribute path",
                });
            }
            if !seen.insert(mapping.name.as_str()) {
                return Err(TaskError::DuplicateMapping(mapping.name.clone()));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// One output attribute path produced by one component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Unique name within the task
    pub name: String,

    /// Attribute path the value is read from
    pub input_attribute_path: AttributePath,

    /// Attribute path the result is written to
    pub output_attribute_path: AttributePath,

    /// Transformation applied to the value
    pub component: Component,

    /// Optional filter gating the value
    #[serde(default)]
    pub filter: Option<Filter>,
}

/// Suffix of the variable carrying a mapping's input value.
const INPUT_VARIABLE_POSTFIX: &str = "__input";

impl Mapping {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<AttributePath>,
        output: impl Into<AttributePath>,
        component: Component,
    ) -> Self {
        Self {
            name: name.into(),
            input_attribute_path: input.into(),
            output_attribute_path: output.into(),
            component,
            filter: None,
        }
    }

    /// Gate this mapping with a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Script variable holding the (possibly filtered) input value.
    pub fn input_variable(&self) -> String {
        format!("{}{}", self.name, INPUT_VARIABLE_POSTFIX)
    }
}

// =============================================================================
// Component
// =============================================================================

/// A named value-transform function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Component name, also used to name its lookup table
    pub name: String,

    /// Function identifier in the target script dialect (e.g. "trim", "regexp")
    pub function: String,

    /// Function parameters, emitted in key order
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    /// Lookup table entries for table-driven functions
    #[serde(default)]
    pub lookup: BTreeMap<String, String>,
}

impl Component {
    pub fn new(name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
            parameters: BTreeMap::new(),
            lookup: BTreeMap::new(),
        }
    }

    /// Set a function parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Add a lookup table entry
    pub fn with_lookup_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.lookup.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Filter
// =============================================================================

/// A stored filter: a JSON array of `{ "<attribute path>": "<regex>" }` objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub name: String,

    /// Raw expression, possibly XML-escaped by the store
    #[serde(default)]
    pub expression: Option<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: Some(expression.into()),
        }
    }

    /// The unescaped expression text, or `None` when there is nothing to parse.
    pub fn expression_text(&self) -> Option<String> {
        self.expression
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| unescape_xml(e).into_owned())
    }
}

/// Generate an example task for documentation and the CLI
pub fn example_task() -> Task {
    Task {
        name: "persons".to_string(),
        description: "Copy names of persons with a numeric age".to_string(),
        mappings: vec![
            Mapping::new(
                "adult_names",
                "person.name",
                "contact.fullName",
                Component::new("trim_name", "trim"),
            )
            .with_filter(Filter::new(
                "numeric_age",
                r#"[{"person.age":"^[0-9]+$"}]"#,
            )),
            Mapping::new(
                "countries",
                "person.address.country",
                "contact.country",
                Component::new("country_codes", "lookup")
                    .with_lookup_entry("DE", "Germany")
                    .with_lookup_entry("FR", "France"),
            ),
        ],
    }
}
