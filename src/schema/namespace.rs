use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

const ROOT: &str = "root";

/// Default namespace when none is configured.
pub const DEFAULT_NAMESPACE: &str = "cimv2";

/// A provider namespace, always held in its rooted form (`root/cimv2`).
///
/// Namespace names compare case-insensitively; the spelling given is kept
/// for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Namespace {
    path: String,
}

impl Namespace {
    /// Build a rooted namespace from a short name such as `cimv2` or
    /// `SecurityCenter`. An explicit leading `root` segment is not doubled
    /// and backslash separators are normalized to `/`.
    pub fn new(name: &str) -> Self {
        let normalized = name.trim().replace('\\', "/");
        let relative = normalized.trim_matches('/');

        let relative = match relative.split_once('/') {
            Some((head, rest)) if head.eq_ignore_ascii_case(ROOT) => rest,
            None if relative.eq_ignore_ascii_case(ROOT) => "",
            _ => relative,
        };

        let path = if relative.is_empty() {
            ROOT.to_string()
        } else {
            format!("{ROOT}/{relative}")
        };
        Self { path }
    }

    /// Fully qualified path handed to the provider.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        self.path.eq_ignore_ascii_case(&other.path)
    }
}

impl Eq for Namespace {}

impl Ord for Namespace {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.path.bytes().map(|b| b.to_ascii_lowercase());
        let rhs = other.path.bytes().map(|b| b.to_ascii_lowercase());
        lhs.cmp(rhs)
    }
}

impl PartialOrd for Namespace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.path.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.path
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}
