use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of a metric computation.
///
/// `Undefined` marks a zero-denominator result. It serializes to JSON `null`
/// and must stay non-comparable downstream: disparity computation skips it
/// instead of coercing it to zero or NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MetricValue {
    Defined(f64),
    Undefined,
}

impl MetricValue {
    /// Build a value from a numerator/denominator pair.
    ///
    /// A denominator that is zero or negative yields `Undefined`.
    pub fn from_ratio(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            MetricValue::Defined(numerator / denominator)
        } else {
            MetricValue::Undefined
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, MetricValue::Defined(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Defined(value) => Some(*value),
            MetricValue::Undefined => None,
        }
    }
}
