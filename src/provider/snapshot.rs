use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result, ScoutError};
use crate::schema::{CimClass, Namespace};

/// On-disk snapshot: class definitions keyed by rooted namespace path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub namespaces: BTreeMap<Namespace, Vec<CimClass>>,
}

/// Offline provider over a captured schema snapshot.
///
/// Lets an audit run away from the target host, and gives tests a
/// deterministic provider.
#[derive(Debug)]
pub struct SnapshotProvider {
    source: Option<PathBuf>,
    snapshot: Snapshot,
}

impl SnapshotProvider {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoutError::Config(format!("cannot read snapshot {}: {e}", path.display()))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            snapshot,
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            source: None,
            snapshot,
        }
    }

    /// Convenience for a single namespace of in-memory classes.
    pub fn with_classes(namespace: Namespace, classes: Vec<CimClass>) -> Self {
        let mut snapshot = Snapshot::default();
        snapshot.namespaces.insert(namespace, classes);
        Self::from_snapshot(snapshot)
    }

    fn namespace(&self, namespace: &Namespace) -> std::result::Result<&[CimClass], ProviderError> {
        self.snapshot
            .namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .ok_or_else(|| ProviderError::new(format!("Invalid namespace: {namespace}")))
    }
}

impl Snapshot {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl super::Provider for SnapshotProvider {
    fn describe(&self) -> String {
        match &self.source {
            Some(path) => format!("snapshot ({})", path.display()),
            None => "snapshot (in-memory)".into(),
        }
    }

    fn get_class(
        &self,
        namespace: &Namespace,
        class_name: &str,
    ) -> std::result::Result<CimClass, ProviderError> {
        // CIM class names compare case-insensitively.
        self.namespace(namespace)?
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(class_name))
            .cloned()
            .ok_or_else(|| ProviderError::new(format!("Not found: class {class_name} in {namespace}")))
    }

    fn list_classes(
        &self,
        namespace: &Namespace,
    ) -> std::result::Result<Vec<CimClass>, ProviderError> {
        Ok(self.namespace(namespace)?.to_vec())
    }
}
