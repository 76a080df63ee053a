use std::time::Duration;

use fairgauge_core::{MetricValue, ThresholdAssignment};
use fairgauge_metrics::MetricResult;
use fairgauge_policy::ComparisonKind;

/// Options for the threshold search.
#[derive(Debug, Clone)]
pub struct MitigationOptions {
    /// Disparity tolerance the search tries to satisfy.
    pub tolerance: f64,
    /// How per-group target values are compared.
    pub comparison: ComparisonKind,
    /// Wall-clock budget; when exceeded the best combination found so far
    /// is returned with `search_truncated` set.
    pub timeout: Option<Duration>,
    /// Upper bound on threshold combinations examined.
    pub max_combinations: u64,
}

impl Default for MitigationOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.2,
            comparison: ComparisonKind::Absolute,
            timeout: None,
            max_combinations: 1_000_000,
        }
    }
}

/// Best-effort result of the threshold search.
#[derive(Debug, Clone)]
pub struct MitigationOutcome {
    pub assignment: ThresholdAssignment,
    /// Target metric per group under the returned thresholds.
    pub achieved: Vec<MetricResult>,
    /// Disparity of the target metric under the returned thresholds:
    /// the spread for absolute comparison, min/max for ratio comparison.
    pub disparity: MetricValue,
    /// Aggregate utility under the returned thresholds.
    pub utility: MetricValue,
    /// Set when no combination satisfied the tolerance.
    pub tolerance_unmet: bool,
    /// Set when the search hit its deadline or combination budget.
    pub search_truncated: bool,
    pub combinations_examined: u64,
}
