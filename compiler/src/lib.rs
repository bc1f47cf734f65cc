//! # Morphscript - mapping tasks compiled to Metamorph scripts
//!
//! Morphscript turns a declarative mapping task (input attribute path,
//! output attribute path, transformation component, optional filter) into
//! an executable Metamorph XML script for a stream-processing engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Task JSON  │────▶│   Builder   │────▶│  Document   │────▶│  Renderer   │
//! │ (mappings)  │     │ (+ filters) │     │ (meta/rules │     │ (XML, enc.) │
//! └─────────────┘     └─────────────┘     │  /maps)     │     └─────────────┘
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use morphscript::{compile_task, example_task, CompileOptions, RenderConfig};
//!
//! let config = RenderConfig::from_env();
//! let compiled = compile_task(&example_task(), &config, &CompileOptions::default())?;
//! println!("{}", compiled.script);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Task, mapping and attribute path models
//! - [`morph`] - Filter compilation, script building and rendering
//! - [`config`] - Render configuration
//! - [`diagnostics`] - Non-fatal compilation diagnostics
//! - [`pipeline`] - One-call task compilation

// Core modules
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;

// Compilation
pub mod morph;
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CompileError,
    CompileResult,
    FilterExpressionError,
    RenderError,
    TaskError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    example_task,
    AttributePath,
    Component,
    Filter,
    Mapping,
    Task,
    ATTRIBUTE_DELIMITER,
};

// =============================================================================
// Re-exports - Script compilation
// =============================================================================

pub use morph::{
    extract,
    filter_fragment,
    resolve_flush_path,
    try_extract,
    Element,
    FilterExpression,
    FlushPath,
    MetamorphDialect,
    Renderer,
    ScriptBuilder,
    ScriptDialect,
    ScriptDocument,
    RECORD_IDENTIFIER,
};

// =============================================================================
// Re-exports - Configuration and diagnostics
// =============================================================================

pub use config::RenderConfig;
pub use diagnostics::{Diagnostic, DiagnosticLevel, DIAGNOSTICS};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    compile_task,
    compile_task_file,
    compile_task_with,
    CompileOptions,
    CompiledScript,
};
