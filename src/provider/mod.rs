pub mod cim;
pub mod snapshot;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::schema::{CimClass, Namespace};

pub use cim::CimProvider;
pub use snapshot::SnapshotProvider;

/// A source of class definitions: the live CIM repository, or an offline
/// snapshot of one.
pub trait Provider {
    /// Short label used in diagnostics.
    fn describe(&self) -> String;

    /// Look up a single class definition.
    fn get_class(&self, namespace: &Namespace, class_name: &str)
        -> std::result::Result<CimClass, ProviderError>;

    /// List every class definition in a namespace, in provider order.
    fn list_classes(&self, namespace: &Namespace)
        -> std::result::Result<Vec<CimClass>, ProviderError>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn get_class(
        &self,
        namespace: &Namespace,
        class_name: &str,
    ) -> std::result::Result<CimClass, ProviderError> {
        (**self).get_class(namespace, class_name)
    }

    fn list_classes(
        &self,
        namespace: &Namespace,
    ) -> std::result::Result<Vec<CimClass>, ProviderError> {
        (**self).list_classes(namespace)
    }
}

/// Pick a provider from configuration: a snapshot file when one is set,
/// otherwise the live CIM provider.
pub fn from_config(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match &config.snapshot {
        Some(path) => Ok(Box::new(SnapshotProvider::load(path)?)),
        None => Ok(Box::new(live_from_config(config))),
    }
}

/// The live CIM provider for the configured host, regardless of any
/// snapshot setting.
pub fn live_from_config(config: &ProviderConfig) -> CimProvider {
    let provider = CimProvider::new(config.computer_name.clone());
    match &config.powershell {
        Some(exe) => provider.with_powershell(exe),
        None => provider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn snapshot_setting_selects_snapshot_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"namespaces": {{"root/cimv2": []}}}}"#).unwrap();

        let config = ProviderConfig {
            snapshot: Some(file.path().to_path_buf()),
            ..ProviderConfig::default()
        };
        let provider = from_config(&config).unwrap();
        assert!(provider.describe().starts_with("snapshot"));
        assert!(provider.list_classes(&Namespace::default()).unwrap().is_empty());
    }

    #[test]
    fn live_provider_ignores_snapshot_setting() {
        let config = ProviderConfig {
            computer_name: Some("srv01".into()),
            snapshot: Some("old.json".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(live_from_config(&config).describe(), "cim (srv01)");
    }

    #[test]
    fn default_settings_select_live_provider() {
        let provider = from_config(&ProviderConfig::default()).unwrap();
        assert_eq!(provider.describe(), "cim (localhost)");
    }
}
