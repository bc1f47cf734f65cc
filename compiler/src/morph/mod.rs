//! Mapping-to-script compilation.
//!
//! This module provides:
//! - `filter_expression`: Parse stored filter expressions
//! - `flush`: Resolve where a filter is evaluated and reset
//! - `filter`: Build the filter fragment
//! - `dialect`: Target-specific fragment shapes
//! - `builder`: Own the script document and compile tasks into it
//! - `render`: Serialize the finished document
//!
//! ## Usage Flow
//!
//! ```text
//! Task → builder::apply → (filter_expression → flush → filter)* → render
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use morphscript::{example_task, RenderConfig, ScriptBuilder};
//!
//! let config = RenderConfig::default();
//! let mut builder = ScriptBuilder::metamorph(&config);
//! builder.apply(&example_task())?;
//! let script = builder.render(true, "UTF-8");
//! ```

pub mod builder;
pub mod dialect;
pub mod escape;
pub mod filter;
pub mod filter_expression;
pub mod flush;
pub mod render;
pub mod tree;

// Re-exports for convenience
pub use builder::ScriptBuilder;
pub use dialect::{MetamorphDialect, ScriptDialect};
pub use filter::filter_fragment;
pub use filter_expression::{extract, try_extract, FilterExpression};
pub use flush::{resolve_flush_path, FlushPath, RECORD_IDENTIFIER};
pub use render::Renderer;
pub use tree::{Element, ScriptDocument};
