use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Decision threshold used when no assignment is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Per-group decision thresholds applied to prediction scores.
///
/// A score greater than or equal to the active threshold counts as a
/// positive prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ThresholdAssignment {
    /// Threshold for groups without an explicit entry.
    pub default: f64,
    /// Per-group overrides keyed by group identifier.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub per_group: BTreeMap<String, f64>,
}

impl ThresholdAssignment {
    /// Single global threshold for every group.
    pub fn global(threshold: f64) -> Self {
        Self {
            default: threshold,
            per_group: BTreeMap::new(),
        }
    }

    pub fn threshold_for(&self, group_id: &str) -> f64 {
        self.per_group
            .get(group_id)
            .copied()
            .unwrap_or(self.default)
    }

    pub fn set(&mut self, group_id: impl Into<String>, threshold: f64) {
        self.per_group.insert(group_id.into(), threshold);
    }
}

impl Default for ThresholdAssignment {
    fn default() -> Self {
        Self::global(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_group_overrides_fall_back_to_default() {
        let mut assignment = ThresholdAssignment::default();
        assignment.set("f", 0.4);
        assert_eq!(assignment.threshold_for("f"), 0.4);
        assert_eq!(assignment.threshold_for("m"), DEFAULT_THRESHOLD);
    }
}
