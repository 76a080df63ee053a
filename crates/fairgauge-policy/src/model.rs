use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use fairgauge_core::{PartitionOptions, ThresholdAssignment};

/// Policy contract version for `policy.json` documents.
pub const POLICY_VERSION: &str = "0.1";

/// How disparities are aggregated across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisparityMode {
    /// Report the extremal pair of groups per metric.
    MaxPairwise,
    /// Report each group against the dataset-wide value.
    GroupVsOverall,
}

/// How two metric values are compared against the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    /// Pass when the absolute difference is at most the tolerance.
    Absolute,
    /// Pass when min/max is at least the tolerance (the 80% rule at 0.8).
    Ratio,
}

/// Disparity evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DisparityConfig {
    pub mode: DisparityMode,
    pub comparison: ComparisonKind,
    pub tolerance: f64,
}

impl Default for DisparityConfig {
    fn default() -> Self {
        Self {
            mode: DisparityMode::MaxPairwise,
            comparison: ComparisonKind::Absolute,
            tolerance: 0.2,
        }
    }
}

/// Threshold mitigation request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MitigationConfig {
    /// Rate-type metric to equalize across groups.
    pub target_metric: String,
    /// Utility metric maximized subject to the tolerance.
    #[serde(default = "default_utility_metric")]
    pub utility_metric: String,
    /// Overrides the disparity tolerance for the search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Wall-clock budget for the combinatorial search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Upper bound on threshold combinations examined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_combinations: Option<u64>,
}

fn default_utility_metric() -> String {
    "accuracy".to_string()
}

/// Canonical fairness policy for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FairnessPolicy {
    /// Contract version for the policy format.
    #[serde(default = "default_policy_version")]
    pub policy_version: String,
    /// Sensitive-attribute columns used for partitioning.
    pub group_by: Vec<String>,
    /// Metric names to evaluate; must exist in the registry.
    pub metrics: Vec<String>,
    /// Disparity evaluation settings.
    #[serde(default)]
    pub disparity: DisparityConfig,
    /// Partitioner guards.
    #[serde(default)]
    pub partition: PartitionOptions,
    /// Decision thresholds; a single global 0.5 when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdAssignment>,
    /// Include the full pairwise disparity list in the report.
    #[serde(default)]
    pub verbose_pairs: bool,
    /// Optional threshold mitigation request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<MitigationConfig>,
}

fn default_policy_version() -> String {
    POLICY_VERSION.to_string()
}

impl FairnessPolicy {
    /// Minimal policy with defaults for everything but grouping and metrics.
    pub fn new(group_by: Vec<String>, metrics: Vec<String>) -> Self {
        Self {
            policy_version: POLICY_VERSION.to_string(),
            group_by,
            metrics,
            disparity: DisparityConfig::default(),
            partition: PartitionOptions::default(),
            thresholds: None,
            verbose_pairs: false,
            mitigation: None,
        }
    }

    /// The configured thresholds, or the global 0.5 default.
    pub fn thresholds_or_default(&self) -> ThresholdAssignment {
        self.thresholds.clone().unwrap_or_default()
    }
}
