//! Diagnostic output, injected into the retriever and filter rather than
//! reached for as global state.

use std::cell::RefCell;

use tracing::Level;

/// Receives diagnostic messages from library operations.
pub trait Diagnostics {
    fn emit(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            _ => tracing::trace!("{message}"),
        }
    }
}

/// Drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn emit(&self, _level: Level, _message: &str) {}
}

/// Records messages in emission order.
#[derive(Debug, Default)]
pub struct CaptureDiagnostics {
    entries: RefCell<Vec<(Level, String)>>,
}

impl CaptureDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Messages emitted at exactly `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Diagnostics for CaptureDiagnostics {
    fn emit(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}
