use crate::error::Result;
use crate::schema::{CimClass, Namespace};
use crate::AuditReport;

use serde::Serialize;

#[derive(Serialize)]
struct JsonClassListing<'a> {
    namespace: &'a Namespace,
    classes: &'a [CimClass],
}

/// Render an audit report as JSON.
pub fn render(report: &AuditReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

/// Render class definitions as JSON, in the same shape snapshots use for a namespace.
pub fn render_classes(namespace: &Namespace, classes: &[CimClass]) -> Result<String> {
    let json = serde_json::to_string_pretty(&JsonClassListing { namespace, classes })?;
    Ok(json)
}
