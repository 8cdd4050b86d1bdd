use crate::schema::{CimClass, Namespace};
use crate::AuditReport;

/// Render an audit report as a plain table, in discovery order.
pub fn render(report: &AuditReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n  Namespace {} via {}: {} class(es) scanned for writable {} properties\n\n",
        report.namespace, report.provider, report.classes_scanned, report.data_type
    ));

    if let Some(warning) = &report.warning {
        output.push_str(&format!("  Warning: {}\n\n", warning));
        return output;
    }

    let class_width = column_width(report.records.iter().map(|r| r.class_name.as_str()), 5);
    let prop_width = column_width(report.records.iter().map(|r| r.property_name.as_str()), 8);

    output.push_str(&format!(
        "  {:<cw$}  {:<pw$}  TYPE\n",
        "CLASS",
        "PROPERTY",
        cw = class_width,
        pw = prop_width
    ));
    output.push_str(&format!("  {}\n", "-".repeat(class_width + prop_width + 12)));
    for record in &report.records {
        output.push_str(&format!(
            "  {:<cw$}  {:<pw$}  {}\n",
            record.class_name,
            record.property_name,
            record.property_type,
            cw = class_width,
            pw = prop_width
        ));
    }
    output.push('\n');

    let status = if report.verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} ({} writable, {} after policy)\n\n",
        status, report.verdict.total_records, report.verdict.effective_records
    ));

    output
}

/// Render a class listing with property counts.
pub fn render_classes(namespace: &Namespace, classes: &[CimClass]) -> String {
    let mut output = format!("\n  {} class(es) in {}\n\n", classes.len(), namespace);
    let width = column_width(classes.iter().map(|c| c.name.as_str()), 5);

    for class in classes {
        let writable = class.properties.iter().filter(|p| p.is_writable()).count();
        output.push_str(&format!(
            "  {:<w$}  {} properties, {} writable\n",
            class.name,
            class.properties.len(),
            writable,
            w = width
        ));
    }
    output.push('\n');
    output
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, min: usize) -> usize {
    values.map(str::len).max().unwrap_or(0).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{NoMatchWarning, WritablePropertyRecord};
    use crate::policy::PolicyVerdict;
    use crate::schema::{DataType, PropertyMetadata};

    fn report(records: Vec<WritablePropertyRecord>) -> AuditReport {
        let warning = records.is_empty().then_some(NoMatchWarning {
            data_type: DataType::String,
            classes_scanned: 1,
        });
        AuditReport {
            generated_at: chrono::Utc::now(),
            provider: "snapshot (in-memory)".into(),
            namespace: Namespace::default(),
            data_type: DataType::String,
            classes_scanned: 1,
            verdict: PolicyVerdict {
                pass: true,
                total_records: records.len(),
                effective_records: records.len(),
                fail_on_match: false,
            },
            records,
            warning,
        }
    }

    #[test]
    fn lists_records_and_verdict() {
        let out = render(&report(vec![WritablePropertyRecord {
            class_name: "Win32_OSRecoveryConfiguration".into(),
            property_name: "DebugFilePath".into(),
            property_type: DataType::String,
        }]));
        assert!(out.contains("Win32_OSRecoveryConfiguration  DebugFilePath  String"));
        assert!(out.contains("Result: PASS (1 writable, 1 after policy)"));
    }

    #[test]
    fn empty_report_shows_warning() {
        let out = render(&report(vec![]));
        assert!(out.contains("Warning: No writable properties of type String found in 1 class(es)"));
        assert!(!out.contains("Result:"));
    }

    #[test]
    fn class_listing_counts_writable_properties() {
        let classes = vec![CimClass::new(
            "Win32_Environment",
            vec![
                PropertyMetadata::new("Name", DataType::String, ["key"]),
                PropertyMetadata::new("VariableValue", DataType::String, ["write"]),
            ],
        )];
        let out = render_classes(&Namespace::default(), &classes);
        assert!(out.contains("1 class(es) in root/cimv2"));
        assert!(out.contains("Win32_Environment  2 properties, 1 writable"));
    }
}
