//! Target script dialects.
//!
//! The builder owns the document skeleton and the filter fragment; a
//! [`ScriptDialect`] decides how everything else looks in a particular
//! target language. [`MetamorphDialect`] targets the Metamorph streaming
//! engine.

use crate::models::{Mapping, ATTRIBUTE_DELIMITER};
use crate::morph::filter::{ATTRIBUTE_NAME, ATTRIBUTE_SOURCE, ATTRIBUTE_VALUE, ELEMENT_DATA};
use crate::morph::tree::Element;

/// Dialect-specific fragment shapes, injected into the builder.
pub trait ScriptDialect {
    /// Root element of a new document, without children.
    fn root_element(&self) -> Element;

    /// Node copying the value at `attribute_path` into the collector-local
    /// name `variable`, placed after a filter's condition block.
    fn filter_data_element(&self, variable: &str, attribute_path: &str) -> Element;

    /// Node copying the value at `attribute_path` into the script variable
    /// `variable` when the mapping has no filter.
    fn input_data_element(&self, variable: &str, attribute_path: &str) -> Element;

    /// Rules producing the mapping's output from its input variable.
    fn mapping_elements(&self, mapping: &Mapping, input_variable: &str) -> Vec<Element>;

    /// Lookup tables the mapping's component needs in the `maps` section.
    fn lookup_maps(&self, _mapping: &Mapping) -> Vec<Element> {
        Vec::new()
    }
}

// =============================================================================
// Metamorph
// =============================================================================

pub const METAMORPH_IDENTIFIER: &str = "metamorph";
pub const METAMORPH_NAMESPACE: &str = "http://www.culturegraph.org/metamorph";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const METAMORPH_SCHEMA_LOCATION: &str = "http://www.culturegraph.org/metamorph metamorph.xsd";

pub const ELEMENT_MAP: &str = "map";
pub const ELEMENT_ENTRY: &str = "entry";
pub const ATTRIBUTE_MAP_REFERENCE: &str = "in";

/// Metamorph script dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetamorphDialect;

impl MetamorphDialect {
    pub fn new() -> Self {
        Self
    }
}

/// Reference to a script variable as a data source or target.
pub fn variable_reference(variable: &str) -> String {
    format!("@{}", variable)
}

impl ScriptDialect for MetamorphDialect {
    fn root_element(&self) -> Element {
        Element::new(METAMORPH_IDENTIFIER)
            .with_attr("xmlns", METAMORPH_NAMESPACE)
            .with_attr("xmlns:xsi", XSI_NAMESPACE)
            .with_attr("xsi:schemaLocation", METAMORPH_SCHEMA_LOCATION)
            .with_attr("entityMarker", ATTRIBUTE_DELIMITER.to_string())
            .with_attr("version", "1")
    }

    fn filter_data_element(&self, variable: &str, attribute_path: &str) -> Element {
        Element::new(ELEMENT_DATA)
            .with_attr(ATTRIBUTE_SOURCE, attribute_path)
            .with_attr(ATTRIBUTE_NAME, variable)
    }

    fn input_data_element(&self, variable: &str, attribute_path: &str) -> Element {
        Element::new(ELEMENT_DATA)
            .with_attr(ATTRIBUTE_SOURCE, attribute_path)
            .with_attr(ATTRIBUTE_NAME, variable_reference(variable))
    }

    fn mapping_elements(&self, mapping: &Mapping, input_variable: &str) -> Vec<Element> {
        let component = &mapping.component;

        let mut function = Element::new(component.function.as_str());
        for (key, value) in &component.parameters {
            function.set_attr(key.as_str(), value.as_str());
        }
        if !component.lookup.is_empty() {
            function.set_attr(ATTRIBUTE_MAP_REFERENCE, component.name.as_str());
        }

        vec![Element::new(ELEMENT_DATA)
            .with_attr(ATTRIBUTE_SOURCE, variable_reference(input_variable))
            .with_attr(ATTRIBUTE_NAME, mapping.output_attribute_path.as_str())
            .with_child(function)]
    }

    fn lookup_maps(&self, mapping: &Mapping) -> Vec<Element> {
        let component = &mapping.component;
        if component.lookup.is_empty() {
            return Vec::new();
        }

        let map = component.lookup.iter().fold(
            Element::new(ELEMENT_MAP).with_attr(ATTRIBUTE_NAME, component.name.as_str()),
            |map, (key, value)| {
                map.with_child(
                    Element::new(ELEMENT_ENTRY)
                        .with_attr(ATTRIBUTE_NAME, key.as_str())
                        .with_attr(ATTRIBUTE_VALUE, value.as_str()),
                )
            },
        );
        vec![map]
    }
}
