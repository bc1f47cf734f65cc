//! Script document builder.
//!
//! A builder compiles exactly one task:
//!
//! ```text
//! new ──▶ initialize(task) ──▶ compile_mapping / compile_filter ... ──▶ render / to_file
//! ```
//!
//! `apply` runs the first two steps for every mapping in task order. The
//! builder holds the document exclusively; compile different tasks with
//! different builders.

use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::diagnostics::{Diagnostic, DIAGNOSTICS};
use crate::error::{CompileError, CompileResult, RenderError, RenderResult};
use crate::models::{Filter, Mapping, Task};
use crate::morph::dialect::{MetamorphDialect, ScriptDialect};
use crate::morph::filter::filter_fragment;
use crate::morph::filter_expression::{try_extract, FilterExpression};
use crate::morph::render::Renderer;
use crate::morph::tree::ScriptDocument;

const TEMP_FILE_PREFIX: &str = "morphscript";
const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Builds the script for one task.
pub struct ScriptBuilder<'a, D: ScriptDialect = MetamorphDialect> {
    dialect: D,
    config: &'a RenderConfig,
    document: Option<ScriptDocument>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ScriptBuilder<'a, MetamorphDialect> {
    /// Builder for the Metamorph dialect
    pub fn metamorph(config: &'a RenderConfig) -> Self {
        Self::new(MetamorphDialect, config)
    }
}

impl<'a, D: ScriptDialect> ScriptBuilder<'a, D> {
    pub fn new(dialect: D, config: &'a RenderConfig) -> Self {
        Self {
            dialect,
            config,
            document: None,
            diagnostics: Vec::new(),
        }
    }

    /// Create the empty meta/rules/maps skeleton for `task`.
    ///
    /// A builder is meant for a single task; initializing again discards
    /// the previous document.
    pub fn initialize(&mut self, task: &Task) -> &mut Self {
        if self.document.is_some() {
            log::warn!(
                task = task.name.as_str();
                "builder re-initialized, discarding previous script"
            );
        }

        self.document = Some(ScriptDocument::new(self.dialect.root_element(), task.name.as_str()));
        self
    }

    /// Initialize for `task` and compile all of its mappings in order.
    pub fn apply(&mut self, task: &Task) -> CompileResult<&mut Self> {
        self.initialize(task);

        for mapping in &task.mappings {
            self.compile_mapping(mapping)?;
        }

        log::debug!(
            task = task.name.as_str(),
            mappings = task.mappings.len(),
            rules = self.document.as_ref().map_or(0, |d| d.rules().len());
            "compiled task"
        );

        Ok(self)
    }

    /// Append the rules for one mapping.
    ///
    /// The input value goes through the mapping's filter when it has a
    /// usable one, otherwise straight into the input variable. The
    /// component's rules and lookup tables follow.
    pub fn compile_mapping(&mut self, mapping: &Mapping) -> CompileResult<()> {
        self.document_mut()?;

        let variable = mapping.input_variable();
        let input_path = mapping.input_attribute_path.as_str();
        let expression = self.mapping_filter(mapping);

        if expression.is_empty() {
            let element = self.dialect.input_data_element(&variable, input_path);
            self.document_mut()?.push_rule(element);
        } else {
            self.check_patterns(mapping, &expression);
            self.compile_filter(input_path, &variable, &expression, true)?;
        }

        let rules = self.dialect.mapping_elements(mapping, &variable);
        let maps = self.dialect.lookup_maps(mapping);

        let document = self.document_mut()?;
        for rule in rules {
            document.push_rule(rule);
        }
        for map in maps {
            document.push_map(map);
        }

        Ok(())
    }

    /// Append a filter fragment for the value at `value_path` to the rules.
    ///
    /// An empty expression appends nothing.
    pub fn compile_filter(
        &mut self,
        value_path: &str,
        variable: &str,
        expression: &FilterExpression,
        result_is_variable: bool,
    ) -> CompileResult<()> {
        if expression.is_empty() {
            log::debug!(variable = variable; "empty filter expression, no filter emitted");
            return Ok(());
        }

        let fragment = filter_fragment(
            &self.dialect,
            value_path,
            variable,
            expression,
            result_is_variable,
        );
        self.document_mut()?.push_rule(fragment);
        Ok(())
    }

    /// The mapping's filter, or an empty expression when it has none or it
    /// cannot be parsed.
    fn mapping_filter(&mut self, mapping: &Mapping) -> FilterExpression {
        let raw = mapping.filter.as_ref().and_then(Filter::expression_text);

        match try_extract(raw.as_deref()) {
            Ok(expression) => expression,
            Err(e) => {
                self.report(
                    Diagnostic::warning(format!("ignoring malformed filter expression: {}", e))
                        .for_mapping(mapping.name.as_str()),
                );
                FilterExpression::new()
            }
        }
    }

    /// Warn about patterns this crate's regex engine rejects.
    ///
    /// The pattern is still emitted verbatim since the engine's own regex
    /// flavour decides in the end.
    fn check_patterns(&mut self, mapping: &Mapping, expression: &FilterExpression) {
        let rejected: Vec<String> = expression
            .iter()
            .filter_map(|(path, pattern)| {
                Regex::new(pattern)
                    .err()
                    .map(|e| format!("pattern '{}' for '{}' may not compile: {}", pattern, path, e))
            })
            .collect();

        for message in rejected {
            self.report(Diagnostic::warning(message).for_mapping(mapping.name.as_str()));
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        DIAGNOSTICS.publish(diagnostic.clone());
        self.diagnostics.push(diagnostic);
    }

    fn document_mut(&mut self) -> CompileResult<&mut ScriptDocument> {
        self.document.as_mut().ok_or(CompileError::Uninitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&ScriptDocument> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<ScriptDocument> {
        self.document
    }

    /// Diagnostics reported while compiling with this builder
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    fn renderer(&self) -> Renderer<'a> {
        Renderer::new(self.config)
    }

    /// Render the script, or `None` if there is nothing to render or
    /// rendering failed. Failures are logged.
    pub fn render(&self, indent: bool, encoding: &str) -> Option<String> {
        match &self.document {
            Some(document) => self.renderer().render(document, indent, encoding),
            None => {
                log::debug!("no script document available for rendering");
                None
            }
        }
    }

    /// Render with the configured default encoding.
    pub fn render_default(&self, indent: bool) -> Option<String> {
        self.render(indent, &self.config.default_encoding)
    }

    pub fn try_render(&self, indent: bool, encoding: &str) -> RenderResult<String> {
        let document = self.document.as_ref().ok_or(RenderError::Uninitialized)?;
        self.renderer().try_render(document, indent, encoding)
    }

    pub fn try_render_bytes(&self, indent: bool, encoding: &str) -> RenderResult<Vec<u8>> {
        let document = self.document.as_ref().ok_or(RenderError::Uninitialized)?;
        self.renderer().try_render_bytes(document, indent, encoding)
    }

    /// Write the unindented script to a new temporary file that is kept.
    pub fn to_file(&self) -> CompileResult<PathBuf> {
        self.to_file_in(std::env::temp_dir())
    }

    /// Write the unindented script to a new kept file inside `dir`.
    pub fn to_file_in(&self, dir: impl AsRef<Path>) -> CompileResult<PathBuf> {
        let bytes = self.try_render_bytes(false, &self.config.default_encoding)?;

        let mut file = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(TEMP_FILE_SUFFIX)
            .tempfile_in(dir)?;
        file.write_all(&bytes)?;
        file.flush()?;

        let (_, path) = file.keep().map_err(|e| CompileError::Io(e.error))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Component, Filter};

    fn filtered_task() -> Task {
        Task::new("persons").with_mapping(
            Mapping::new(
                "names",
                "person.name",
                "contact.name",
                Component::new("trim_name", "trim"),
            )
            .with_filter(Filter::new("adults", r#"[{"person.age":"^[0-9]+$"}]"#)),
        )
    }

    #[test]
    fn test_initialize_creates_skeleton() {
        let config = RenderConfig::default();
        let mut builder = ScriptBuilder::metamorph(&config);
        assert!(!builder.is_initialized());

        builder.initialize(&Task::new("empty"));
        let document = builder.document().unwrap();
        assert_eq!(document.meta_name(), "empty");
        assert!(document.rules().is_empty());
        assert!(document.maps().is_empty());
    }

    #[test]
    fn test_reinitialize_replaces_document() {
        let config = RenderConfig::default();
        let mut builder = ScriptBuilder::metamorph(&config);
        builder.apply(&filtered_task()).unwrap();
        builder.initialize(&Task::new("second"));

        let document = builder.document().unwrap();
        assert_eq!(document.meta_name(), "second");
        assert!(document.rules().is_empty());
    }

    #[test]
    fn test_filtered_mapping_rules() {
        let config = RenderConfig::default();
        let mut builder = ScriptBuilder::metamorph(&config);
        builder.apply(&filtered_task()).unwrap();

        let rules = builder.document().unwrap().rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "combine");
        assert_eq!(rules[0].attr("name"), Some("@names__input"));
        assert_eq!(rules[0].attr("flushWith"), Some("person"));
        assert_eq!(rules[1].attr("source"), Some("@names__input"));
        assert_eq!(rules[1].attr("name"), Some("contact.name"));
        assert!(builder.diagnostics().is_empty());
    }

    #[test]
    fn test_unfiltered_mapping_has_no_filter_fragment() {
        let config = RenderConfig::default();
        let task = Task::new("t").with_mapping(Mapping::new(
            "titles",
            "work.title",
            "title",
            Component::new("c", "trim"),
        ));

        let mut builder = ScriptBuilder::metamorph(&config);
        builder.apply(&task).unwrap();

        let rules = builder.document().unwrap().rules();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.name() != "combine"));
        assert_eq!(rules[0].attr("source"), Some("work.title"));
        assert_eq!(rules[0].attr("name"), Some("@titles__input"));
    }

    #[test]
    fn test_malformed_filter_degrades_with_diagnostic() {
        let config = RenderConfig::default();
        let task = Task::new("t").with_mapping(
            Mapping::new("titles", "work.title", "title", Component::new("c", "trim"))
                .with_filter(Filter::new("broken", "[{\"work.type\":")),
        );

        let mut builder = ScriptBuilder::metamorph(&config);
        builder.apply(&task).unwrap();

        let rules = builder.document().unwrap().rules();
        assert!(rules.iter().all(|r| r.name() != "combine"));
        assert_eq!(builder.diagnostics().len(), 1);
        assert_eq!(builder.diagnostics()[0].mapping.as_deref(), Some("titles"));
    }

    #[test]
    fn test_unsupported_pattern_is_reported_and_kept() {
        let config = RenderConfig::default();
        let task = Task::new("t").with_mapping(
            Mapping::new("titles", "work.title", "title", Component::new("c", "trim"))
                .with_filter(Filter::new("lookahead", r#"[{"work.type":"^(?!demo).*"}]"#)),
        );

        let mut builder = ScriptBuilder::metamorph(&config);
        builder.apply(&task).unwrap();

        assert_eq!(builder.diagnostics().len(), 1);
        let text = builder.render(false, "UTF-8").unwrap();
        assert!(text.contains("match=\"^(?!demo).*\""));
    }

    #[test]
    fn test_compile_filter_requires_initialization() {
        let config = RenderConfig::default();
        let mut builder = ScriptBuilder::metamorph(&config);
        let expression: FilterExpression = [("a.b", "x")].into_iter().collect();

        assert!(matches!(
            builder.compile_filter("a.c", "v", &expression, true),
            Err(CompileError::Uninitialized)
        ));
    }

    #[test]
    fn test_empty_filter_appends_nothing() {
        let config = RenderConfig::default();
        let mut builder = ScriptBuilder::metamorph(&config);
        builder.initialize(&Task::new("t"));
        builder.compile_filter("a.c", "v", &FilterExpression::new(), true).unwrap();
        assert!(builder.document().unwrap().rules().is_empty());
    }

    #[test]
    fn test_render_before_initialize_is_none() {
        let config = RenderConfig::default();
        let builder = ScriptBuilder::metamorph(&config);
        assert!(builder.render(true, "UTF-8").is_none());
        assert!(matches!(builder.try_render(true, "UTF-8"), Err(RenderError::Uninitialized)));
    }

    #[test]
    fn test_to_file_writes_unindented_script() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::default();
        let mut builder = ScriptBuilder::metamorph(&config);
        builder.apply(&filtered_task()).unwrap();

        let path = builder.to_file_in(dir.path()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(Some(written), builder.render(false, "UTF-8"));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("morphscript"));
    }

    #[test]
    fn test_to_file_fails_when_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::default();
        let builder = ScriptBuilder::metamorph(&config);
        assert!(matches!(
            builder.to_file_in(dir.path()),
            Err(CompileError::Render(RenderError::Uninitialized))
        ));
    }
}
