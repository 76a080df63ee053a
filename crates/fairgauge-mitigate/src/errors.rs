use thiserror::Error;

/// Errors emitted by the threshold optimizer.
#[derive(Debug, Error)]
pub enum MitigationError {
    /// The target or utility metric is not in the registry.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    /// Only rate-type metrics respond to thresholds.
    #[error("metric '{0}' is not rate-type")]
    NotRateType(String),
}
