use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::policy::Policy;
use crate::schema::Namespace;

/// Top-level configuration from `.wmiscout.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub policy: Policy,
}

/// Where class definitions come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Namespace to query; a short name is rooted (`cimv2` -> `root/cimv2`).
    #[serde(default)]
    pub namespace: Namespace,
    /// Remote host to query instead of the local machine.
    #[serde(default)]
    pub computer_name: Option<String>,
    /// PowerShell executable used by the live provider.
    #[serde(default)]
    pub powershell: Option<PathBuf>,
    /// Read class definitions from a snapshot file instead of the live provider.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# wmiscout configuration

[provider]
# Namespace to enumerate; "cimv2" is queried as root/cimv2.
namespace = "cimv2"

# Query a remote host instead of the local machine.
# computer_name = "host01"

# PowerShell used for live queries (defaults to powershell.exe, or pwsh off Windows).
# powershell = "pwsh"

# Audit an offline snapshot captured with `wmiscout snapshot`.
# snapshot = "schema.json"

[policy]
# Exit with status 1 when any writable property is found.
fail_on_match = false

# Classes whose findings are dropped from reports.
# ignore_classes = ["Win32_Environment"]
"#
    }
}
