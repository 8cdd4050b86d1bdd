use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::filter::WritablePropertyRecord;

/// Policy verdict: the final pass/fail decision after dropping ignored
/// classes from the raw records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_records: usize,
    pub effective_records: usize,
    pub fail_on_match: bool,
}

/// Policy configuration loaded from `.wmiscout.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Policy {
    /// Fail the run when any writable property survives the ignore list.
    #[serde(default)]
    pub fail_on_match: bool,
    /// Class names to drop from reports (case-insensitive).
    #[serde(default)]
    pub ignore_classes: HashSet<String>,
}

impl Policy {
    fn is_ignored(&self, class_name: &str) -> bool {
        self.ignore_classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class_name))
    }

    /// Evaluate records against this policy and produce a verdict.
    pub fn evaluate(&self, records: &[WritablePropertyRecord]) -> PolicyVerdict {
        let effective = records
            .iter()
            .filter(|r| !self.is_ignored(&r.class_name))
            .count();

        PolicyVerdict {
            pass: !(self.fail_on_match && effective > 0),
            total_records: records.len(),
            effective_records: effective,
            fail_on_match: self.fail_on_match,
        }
    }

    /// Remove records belonging to ignored classes, keeping order.
    pub fn apply(&self, records: &[WritablePropertyRecord]) -> Vec<WritablePropertyRecord> {
        records
            .iter()
            .filter(|r| !self.is_ignored(&r.class_name))
            .cloned()
            .collect()
    }
}
