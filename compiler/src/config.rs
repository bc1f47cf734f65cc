//! Render configuration.
//!
//! Built once at startup and shared read-only by every builder and renderer.

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding [`RenderConfig::indent_width`]
pub const ENV_INDENT_WIDTH: &str = "MORPHSCRIPT_INDENT_WIDTH";

/// Environment variable overriding [`RenderConfig::default_encoding`]
pub const ENV_ENCODING: &str = "MORPHSCRIPT_ENCODING";

/// Settings for serializing script documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Spaces per nesting level when indenting
    pub indent_width: usize,

    /// Encoding used when none is requested explicitly
    pub default_encoding: String,

    /// Version written into the XML declaration
    pub xml_version: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            default_encoding: "UTF-8".to_string(),
            xml_version: "1.1".to_string(),
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(width) = env::var(ENV_INDENT_WIDTH) {
            match width.trim().parse() {
                Ok(w) => config.indent_width = w,
                Err(_) => log::warn!("ignoring invalid {}: '{}'", ENV_INDENT_WIDTH, width),
            }
        }

        if let Ok(encoding) = env::var(ENV_ENCODING) {
            if !encoding.trim().is_empty() {
                config.default_encoding = encoding.trim().to_string();
            }
        }

        config
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_default_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.default_encoding = encoding.into();
        self
    }
}
