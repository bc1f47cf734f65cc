//! High-level API for compiling a task into a rendered script.
//!
//! Combines task validation, compilation and rendering in one call.
//!
//! # Example
//!
//! ```rust,ignore
//! use morphscript::pipeline::{compile_task_file, CompileOptions};
//! use morphscript::RenderConfig;
//!
//! let config = RenderConfig::from_env();
//! let compiled = compile_task_file("task.json", &config, &CompileOptions::default())?;
//! println!("{}", compiled.script);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::RenderConfig;
use crate::diagnostics::{log_info, Diagnostic};
use crate::error::CompileResult;
use crate::models::Task;
use crate::morph::builder::ScriptBuilder;
use crate::morph::dialect::ScriptDialect;
use crate::morph::filter::FUNCTION_COMBINE;

/// Options for a single compilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Indent the rendered script
    pub indent: bool,

    /// Encoding label, the configured default when absent
    pub encoding: Option<String>,

    /// Check the task definition before compiling
    pub validate: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            indent: true,
            encoding: None,
            validate: true,
        }
    }
}

/// Result of compiling one task
#[derive(Debug, Clone, Serialize)]
pub struct CompiledScript {
    /// Task name
    pub task: String,

    /// Rendered script text
    pub script: String,

    /// Number of top-level rules
    pub rule_count: usize,

    /// Number of lookup tables
    pub map_count: usize,

    /// Number of filter fragments
    pub filter_count: usize,

    /// Non-fatal problems found while compiling
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile a task with the Metamorph dialect.
pub fn compile_task(
    task: &Task,
    config: &RenderConfig,
    options: &CompileOptions,
) -> CompileResult<CompiledScript> {
    compile_task_with(ScriptBuilder::metamorph(config), task, config, options)
}

/// Compile a task with a fresh builder of any dialect.
pub fn compile_task_with<D: ScriptDialect>(
    mut builder: ScriptBuilder<'_, D>,
    task: &Task,
    config: &RenderConfig,
    options: &CompileOptions,
) -> CompileResult<CompiledScript> {
    if options.validate {
        task.validate()?;
    }

    builder.apply(task)?;

    let encoding = options
        .encoding
        .as_deref()
        .unwrap_or(config.default_encoding.as_str());
    let script = builder.try_render(options.indent, encoding)?;

    let (rule_count, map_count, filter_count) = builder
        .document()
        .map(|d| {
            let filters = d.rules().iter().filter(|r| r.name() == FUNCTION_COMBINE).count();
            (d.rules().len(), d.maps().len(), filters)
        })
        .unwrap_or_default();

    log_info(format!(
        "compiled task '{}': {} rules, {} filters, {} maps",
        task.name, rule_count, filter_count, map_count
    ));

    Ok(CompiledScript {
        task: task.name.clone(),
        script,
        rule_count,
        map_count,
        filter_count,
        diagnostics: builder.diagnostics().to_vec(),
    })
}

/// Load a task from a JSON file and compile it.
pub fn compile_task_file(
    path: impl AsRef<Path>,
    config: &RenderConfig,
    options: &CompileOptions,
) -> CompileResult<CompiledScript> {
    let task = Task::from_file(path)?;
    compile_task(&task, config, options)
}
