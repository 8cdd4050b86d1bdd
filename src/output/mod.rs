pub mod console;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{CimClass, Namespace};
use crate::AuditReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" | "table" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render an audit report into the specified format.
pub fn render(report: &AuditReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Json => json::render(report),
    }
}

/// Render a class listing into the specified format.
pub fn render_classes(
    namespace: &Namespace,
    classes: &[CimClass],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_classes(namespace, classes)),
        OutputFormat::Json => json::render_classes(namespace, classes),
    }
}
