//! Error types for the mapping-to-script compiler.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`TaskError`] - Task definition loading and validation errors
//! - [`FilterExpressionError`] - Filter expression parsing errors
//! - [`RenderError`] - Script rendering errors
//! - [`CompileError`] - Top-level compilation errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Most of these never reach a caller of the builder directly: malformed
//! filters degrade to "no filter" and render failures surface as `None`.
//! Only file materialization and task loading return hard errors.

use thiserror::Error;

// =============================================================================
// Task Errors
// =============================================================================

/// Errors while loading or checking a task definition.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Failed to read the task file.
    #[error("Failed to read task: {0}")]
    IoError(#[from] std::io::Error),

    /// Task JSON could not be deserialized.
    #[error("Invalid task JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Task is structurally invalid.
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A mapping is missing a required attribute path.
    #[error("Mapping '{mapping}' has no {field}")]
    MissingPath { mapping: String, field: &'static str },

    /// Two mappings share the same name.
    #[error("Duplicate mapping name: {0}")]
    DuplicateMapping(String),
}

// =============================================================================
// Filter Expression Errors
// =============================================================================

/// Errors from strict filter expression extraction.
#[derive(Debug, Error)]
pub enum FilterExpressionError {
    /// Expression is not valid JSON.
    #[error("Filter expression is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Expression is valid JSON but not an array.
    #[error("Filter expression must be a JSON array, found {0}")]
    NotAnArray(&'static str),
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while serializing a script document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing to render yet.
    #[error("No script document available, the builder was never initialized")]
    Uninitialized,

    /// Encoding label is not known.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// An element or attribute name is not a valid XML name.
    #[error("Invalid XML {kind} name: '{name}'")]
    InvalidName { kind: &'static str, name: String },

    /// The serializer failed while writing the tree.
    #[error("Failed to serialize script: {0}")]
    Serialization(#[from] std::fmt::Error),
}

// =============================================================================
// Compile Errors (top-level)
// =============================================================================

/// Top-level compilation errors.
///
/// This is the error type returned by [`crate::pipeline::compile_task`] and
/// by file materialization on the builder.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Task loading error.
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Writing the script failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A fragment was appended before the builder was initialized.
    #[error("No script document, initialize the builder with a task first")]
    Uninitialized,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Result type for filter expression extraction.
pub type FilterExpressionResult<T> = Result<T, FilterExpressionError>;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // RenderError -> CompileError
        let render_err = RenderError::UnsupportedEncoding("klingon".into());
        let compile_err: CompileError = render_err.into();
        assert!(compile_err.to_string().contains("klingon"));

        // TaskError -> CompileError
        let task_err = TaskError::DuplicateMapping("title".into());
        let compile_err: CompileError = task_err.into();
        assert!(compile_err.to_string().contains("title"));
    }

    #[test]
    fn test_invalid_name_format() {
        let err = RenderError::InvalidName {
            kind: "element",
            name: "bad name".into(),
        };
        assert_eq!(err.to_string(), "Invalid XML element name: 'bad name'");
    }

    #[test]
    fn test_missing_path_format() {
        let err = TaskError::MissingPath {
            mapping: "names".into(),
            field: "output attribute path",
        };
        let msg = err.to_string();
        assert!(msg.contains("names"));
        assert!(msg.contains("output attribute path"));
    }
}
