//! Compilation diagnostics.
//!
//! Non-fatal problems found while compiling (a filter that could not be
//! parsed, a regex the engine may reject) change the meaning of the script
//! without failing it. They are forwarded to the `log` facade and broadcast
//! so that callers can observe them, and each builder also keeps its own list.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// A single diagnostic entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    /// Mapping the diagnostic refers to, if any
    #[serde(default)]
    pub mapping: Option<String>,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: DiagnosticLevel::Info, message: message.into(), mapping: None }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: DiagnosticLevel::Warning, message: message.into(), mapping: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: DiagnosticLevel::Error, message: message.into(), mapping: None }
    }

    pub fn for_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }
}

/// Global diagnostic broadcaster
pub static DIAGNOSTICS: Lazy<DiagnosticBroadcaster> = Lazy::new(DiagnosticBroadcaster::new);

/// Broadcasts diagnostics to all subscribers
pub struct DiagnosticBroadcaster {
    sender: broadcast::Sender<Diagnostic>,
}

impl DiagnosticBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Log a diagnostic and send it to all subscribers
    pub fn publish(&self, diagnostic: Diagnostic) {
        let mapping = diagnostic.mapping.as_deref().unwrap_or("-");
        match diagnostic.level {
            DiagnosticLevel::Info => {
                log::info!(target: "morphscript", mapping = mapping; "{}", diagnostic.message)
            }
            DiagnosticLevel::Warning => {
                log::warn!(target: "morphscript", mapping = mapping; "{}", diagnostic.message)
            }
            DiagnosticLevel::Error => {
                log::error!(target: "morphscript", mapping = mapping; "{}", diagnostic.message)
            }
        }

        // No receivers is fine
        let _ = self.sender.send(diagnostic);
    }

    /// Get a receiver for diagnostics published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Diagnostic> {
        self.sender.subscribe()
    }
}

impl Default for DiagnosticBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient publishing functions
pub fn log_info(msg: impl Into<String>) {
    DIAGNOSTICS.publish(Diagnostic::info(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    DIAGNOSTICS.publish(Diagnostic::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    DIAGNOSTICS.publish(Diagnostic::error(msg));
}
