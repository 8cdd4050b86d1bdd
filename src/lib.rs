//! wmiscout: writable-property enumeration for management instrumentation.
//!
//! Retrieves class definitions from a local, remote, or snapshotted CIM
//! repository and reports properties that carry the `write` qualifier and
//! have a requested data type: configuration surfaces an operator can
//! modify.
//!
//! # Quick Start
//!
//! ```no_run
//! use wmiscout::{audit, AuditOptions};
//! use wmiscout::retriever::ClassSelector;
//! use wmiscout::schema::DataType;
//!
//! let options = AuditOptions::default();
//! let report = audit(&options, &ClassSelector::All, DataType::String).unwrap();
//! println!("Writable string properties: {}", report.records.len());
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod output;
pub mod policy;
pub mod provider;
pub mod retriever;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use config::Config;
use diagnostics::{Diagnostics, TracingDiagnostics};
use error::Result;
use filter::{NoMatchWarning, WritablePropertyFilter, WritablePropertyRecord};
use output::OutputFormat;
use policy::{Policy, PolicyVerdict};
use provider::snapshot::Snapshot;
use provider::Provider;
use retriever::{ClassRetriever, ClassSelector};
use schema::{CimClass, DataType, Namespace};

const DEFAULT_CONFIG: &str = ".wmiscout.toml";

/// Options shared by every command. CLI values override the config file.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Path to config file (defaults to `.wmiscout.toml` in the working directory).
    pub config_path: Option<PathBuf>,
    /// Namespace override.
    pub namespace: Option<String>,
    /// Remote host override.
    pub computer_name: Option<String>,
    /// Snapshot file override; selects the offline provider.
    pub snapshot: Option<PathBuf>,
    /// CLI override for `policy.fail_on_match`.
    pub fail_on_match_override: Option<bool>,
}

impl AuditOptions {
    /// Load the config file and apply overrides.
    pub fn resolve(&self) -> Result<Config> {
        let config_path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
        let mut config = Config::load(&config_path)?;

        if let Some(ns) = &self.namespace {
            config.provider.namespace = Namespace::new(ns);
        }
        if let Some(host) = &self.computer_name {
            config.provider.computer_name = Some(host.clone());
        }
        if let Some(path) = &self.snapshot {
            config.provider.snapshot = Some(path.clone());
        }
        if let Some(fail_on_match) = self.fail_on_match_override {
            config.policy.fail_on_match = fail_on_match;
        }
        Ok(config)
    }
}

/// Complete audit report.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub namespace: Namespace,
    pub data_type: DataType,
    pub classes_scanned: usize,
    pub records: Vec<WritablePropertyRecord>,
    pub warning: Option<NoMatchWarning>,
    pub verdict: PolicyVerdict,
}

/// Run a complete audit: load config, retrieve classes, filter writable
/// properties, apply policy.
pub fn audit(
    options: &AuditOptions,
    selector: &ClassSelector,
    data_type: DataType,
) -> Result<AuditReport> {
    let config = options.resolve()?;
    let provider = provider::from_config(&config.provider)?;
    audit_with(
        provider.as_ref(),
        &config.provider.namespace,
        selector,
        data_type,
        &config.policy,
        &TracingDiagnostics,
    )
}

/// Audit against an explicit provider.
pub fn audit_with<P: Provider + ?Sized>(
    provider: &P,
    namespace: &Namespace,
    selector: &ClassSelector,
    data_type: DataType,
    policy: &Policy,
    diagnostics: &dyn Diagnostics,
) -> Result<AuditReport> {
    let classes = ClassRetriever::new(provider, diagnostics).retrieve(namespace, selector)?;
    let outcome = WritablePropertyFilter::new(data_type, diagnostics).run(&classes)?;

    let verdict = policy.evaluate(&outcome.records);
    let records = policy.apply(&outcome.records);
    // Matches dropped by the ignore list still leave the report empty.
    let warning = outcome.warning.or_else(|| {
        records.is_empty().then_some(NoMatchWarning {
            data_type,
            classes_scanned: classes.len(),
        })
    });

    Ok(AuditReport {
        generated_at: Utc::now(),
        provider: provider.describe(),
        namespace: namespace.clone(),
        data_type,
        classes_scanned: classes.len(),
        records,
        warning,
        verdict,
    })
}

/// Retrieve class definitions without filtering.
pub fn list_classes(
    options: &AuditOptions,
    selector: &ClassSelector,
) -> Result<(Namespace, Vec<CimClass>)> {
    let config = options.resolve()?;
    let provider = provider::from_config(&config.provider)?;
    let namespace = config.provider.namespace;
    let classes =
        ClassRetriever::new(provider.as_ref(), &TracingDiagnostics).retrieve(&namespace, selector)?;
    Ok((namespace, classes))
}

/// Capture every class in the configured namespace from the live provider
/// into a snapshot file. A configured snapshot source is not consulted.
/// Returns the number of classes written.
pub fn capture_snapshot(options: &AuditOptions, path: &Path) -> Result<usize> {
    let config = options.resolve()?;
    let provider = provider::live_from_config(&config.provider);
    capture_snapshot_with(
        &provider,
        &config.provider.namespace,
        path,
        &TracingDiagnostics,
    )
}

/// Capture a namespace from an explicit provider.
pub fn capture_snapshot_with<P: Provider + ?Sized>(
    provider: &P,
    namespace: &Namespace,
    path: &Path,
    diagnostics: &dyn Diagnostics,
) -> Result<usize> {
    let classes =
        ClassRetriever::new(provider, diagnostics).retrieve(namespace, &ClassSelector::All)?;
    let count = classes.len();

    let mut snapshot = Snapshot::default();
    snapshot.namespaces.insert(namespace.clone(), classes);
    snapshot.save(path)?;

    tracing::info!(path = %path.display(), classes = count, "snapshot written");
    Ok(count)
}

/// Render an audit report in the specified format.
pub fn render_report(report: &AuditReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::diagnostics::SilentDiagnostics;
    use crate::schema::PropertyMetadata;
    use pretty_assertions::assert_eq;

    fn write_snapshot(dir: &Path) -> PathBuf {
        let snapshot = Snapshot {
            namespaces: [(
                Namespace::default(),
                vec![
                    CimClass::new(
                        "Win32_OSRecoveryConfiguration",
                        vec![
                            PropertyMetadata::new(
                                "AutoReboot",
                                DataType::Boolean,
                                ["write", "description"],
                            ),
                            PropertyMetadata::new("DebugFilePath", DataType::String, ["write"]),
                        ],
                    ),
                    CimClass::new(
                        "Win32_Environment",
                        vec![PropertyMetadata::new("VariableValue", DataType::String, ["write"])],
                    ),
                ],
            )]
            .into_iter()
            .collect(),
        };
        let path = dir.join("schema.json");
        snapshot.save(&path).unwrap();
        path
    }

    fn options(dir: &Path) -> AuditOptions {
        AuditOptions {
            config_path: Some(dir.join("absent.toml")),
            snapshot: Some(write_snapshot(dir)),
            ..AuditOptions::default()
        }
    }

    #[test]
    fn audit_all_classes_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let report = audit(&options(dir.path()), &ClassSelector::All, DataType::String).unwrap();

        let found: Vec<_> = report
            .records
            .iter()
            .map(|r| (r.class_name.as_str(), r.property_name.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Win32_OSRecoveryConfiguration", "DebugFilePath"),
                ("Win32_Environment", "VariableValue"),
            ]
        );
        assert_eq!(report.classes_scanned, 2);
        assert!(report.verdict.pass);
    }

    #[test]
    fn audit_single_class_without_match_warns() {
        let dir = tempfile::tempdir().unwrap();
        let report = audit(
            &options(dir.path()),
            &ClassSelector::Named("Win32_OSRecoveryConfiguration".into()),
            DataType::UInt32,
        )
        .unwrap();
        assert!(report.records.is_empty());
        assert!(report.warning.is_some());
    }

    #[test]
    fn config_policy_applies() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".wmiscout.toml");
        std::fs::write(
            &config_path,
            "[policy]\nfail_on_match = true\nignore_classes = [\"Win32_Environment\"]\n",
        )
        .unwrap();

        let opts = AuditOptions {
            config_path: Some(config_path),
            ..options(dir.path())
        };
        let report = audit(&opts, &ClassSelector::All, DataType::String).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.verdict.total_records, 2);
        assert!(!report.verdict.pass);

        let relaxed = AuditOptions {
            fail_on_match_override: Some(false),
            ..opts
        };
        assert!(audit(&relaxed, &ClassSelector::All, DataType::String).unwrap().verdict.pass);
    }

    #[test]
    fn unknown_namespace_is_retrieval_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = AuditOptions {
            namespace: Some("SecurityCenter".into()),
            ..options(dir.path())
        };
        let err = audit(&opts, &ClassSelector::All, DataType::String).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Retrieval error: Invalid namespace: root/SecurityCenter"
        );
    }

    #[test]
    fn capture_then_audit_offline() {
        let dir = tempfile::tempdir().unwrap();
        let source = provider::SnapshotProvider::load(&write_snapshot(dir.path())).unwrap();
        let copy = dir.path().join("copy.json");
        let count =
            capture_snapshot_with(&source, &Namespace::default(), &copy, &SilentDiagnostics)
                .unwrap();
        assert_eq!(count, 2);

        let provider = provider::SnapshotProvider::load(&copy).unwrap();
        let report = audit_with(
            &provider,
            &Namespace::default(),
            &ClassSelector::All,
            DataType::Boolean,
            &Policy::default(),
            &SilentDiagnostics,
        )
        .unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].property_name, "AutoReboot");
    }

    #[test]
    fn capture_queries_live_provider_even_with_snapshot_configured() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());
        let config_path = dir.path().join(".wmiscout.toml");
        std::fs::write(
            &config_path,
            format!(
                "[provider]\nsnapshot = {:?}\npowershell = \"/nonexistent/wmiscout-powershell\"\n",
                snapshot.display().to_string()
            ),
        )
        .unwrap();

        let opts = AuditOptions {
            config_path: Some(config_path),
            ..AuditOptions::default()
        };
        let out = dir.path().join("captured.json");
        let err = capture_snapshot(&opts, &out).unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to start /nonexistent/wmiscout-powershell"));
        assert!(!out.exists());
    }

    #[test]
    fn fully_ignored_matches_still_warn() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".wmiscout.toml");
        std::fs::write(
            &config_path,
            "[policy]\nignore_classes = [\"Win32_Environment\", \"Win32_OSRecoveryConfiguration\"]\n",
        )
        .unwrap();

        let opts = AuditOptions {
            config_path: Some(config_path),
            ..options(dir.path())
        };
        let report = audit(&opts, &ClassSelector::All, DataType::String).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.verdict.total_records, 2);
        assert_eq!(
            report.warning,
            Some(NoMatchWarning {
                data_type: DataType::String,
                classes_scanned: 2
            })
        );

        let json: serde_json::Value =
            serde_json::from_str(&render_report(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["warning"]["classes_scanned"], 2);
    }

    #[test]
    fn rendered_json_round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let report = audit(&options(dir.path()), &ClassSelector::All, DataType::String).unwrap();
        let json = render_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["records"].as_array().map(Vec::len), Some(2));
    }
}
