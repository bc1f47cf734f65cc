//! Filter fragment compilation.
//!
//! A filtered value becomes a collector that only emits when every
//! condition matched within the same entity:
//!
//! ```text
//! combine  name=@VAR  value=${VAR.filtered}  flushWith=<shared ancestor>
//! ├── if
//! │   └── all  name=CONDITION_ALL  flushWith=<last filter path>
//! │       ├── data source=<filter path 1>
//! │       │   └── regexp match=<pattern 1>
//! │       └── data source=<filter path n>
//! │           └── regexp match=<pattern n>
//! └── <pass-through of the value into VAR.filtered>
//! ```

use crate::morph::dialect::{variable_reference, ScriptDialect};
use crate::morph::escape::unescape_xml;
use crate::morph::filter_expression::FilterExpression;
use crate::morph::flush::resolve_flush_path;
use crate::morph::tree::Element;

pub const FILTER_VARIABLE_POSTFIX: &str = ".filtered";
pub const FILTER_ALL_COLLECTOR_NAME: &str = "CONDITION_ALL";

pub const FUNCTION_COMBINE: &str = "combine";
pub const FUNCTION_IF: &str = "if";
pub const FUNCTION_ALL: &str = "all";
pub const FUNCTION_REGEXP: &str = "regexp";
pub const ELEMENT_DATA: &str = "data";

pub const ATTRIBUTE_NAME: &str = "name";
pub const ATTRIBUTE_VALUE: &str = "value";
pub const ATTRIBUTE_SOURCE: &str = "source";
pub const ATTRIBUTE_RESET: &str = "reset";
pub const ATTRIBUTE_SAME_ENTITY: &str = "sameEntity";
pub const ATTRIBUTE_INCLUDE_SUB_ENTITIES: &str = "includeSubEntities";
pub const ATTRIBUTE_FLUSH_WITH: &str = "flushWith";
pub const ATTRIBUTE_MATCH: &str = "match";

const TRUE: &str = "true";

/// Name of the collector-local variable carrying the value to be filtered.
pub fn filtered_variable(variable: &str) -> String {
    format!("{}{}", variable, FILTER_VARIABLE_POSTFIX)
}

/// Build the filter fragment for the value at `value_path`.
///
/// The result is written to `@variable` when `result_is_variable`, otherwise
/// to `variable` itself. `expression` must not be empty.
pub fn filter_fragment<D>(
    dialect: &D,
    value_path: &str,
    variable: &str,
    expression: &FilterExpression,
    result_is_variable: bool,
) -> Element
where
    D: ScriptDialect + ?Sized,
{
    let combine_variable = filtered_variable(variable);

    let result_name = if result_is_variable {
        variable_reference(variable)
    } else {
        variable.to_string()
    };

    let flush_path = resolve_flush_path(value_path, expression.paths());

    log::debug!(
        variable = variable,
        flush_with = flush_path.as_str(),
        conditions = expression.len();
        "compiling filter"
    );

    let mut all = Element::new(FUNCTION_ALL)
        .with_attr(ATTRIBUTE_NAME, FILTER_ALL_COLLECTOR_NAME)
        .with_attr(ATTRIBUTE_RESET, TRUE)
        .with_attr(ATTRIBUTE_INCLUDE_SUB_ENTITIES, TRUE);

    if let Some(last) = expression.last_path() {
        all.set_attr(ATTRIBUTE_FLUSH_WITH, unescape_xml(last));
    }

    for (path, pattern) in expression.iter() {
        all.push(
            Element::new(ELEMENT_DATA)
                .with_attr(ATTRIBUTE_SOURCE, unescape_xml(path))
                .with_child(Element::new(FUNCTION_REGEXP).with_attr(ATTRIBUTE_MATCH, pattern)),
        );
    }

    Element::new(FUNCTION_COMBINE)
        .with_attr(ATTRIBUTE_RESET, TRUE)
        .with_attr(ATTRIBUTE_SAME_ENTITY, TRUE)
        .with_attr(ATTRIBUTE_INCLUDE_SUB_ENTITIES, TRUE)
        .with_attr(ATTRIBUTE_NAME, result_name)
        .with_attr(ATTRIBUTE_VALUE, format!("${{{}}}", combine_variable))
        .with_attr(ATTRIBUTE_FLUSH_WITH, flush_path.as_str())
        .with_child(Element::new(FUNCTION_IF).with_child(all))
        .with_child(dialect.filter_data_element(&combine_variable, value_path))
}
