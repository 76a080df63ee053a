use thiserror::Error;

/// Errors emitted by the metric registry and engine.
#[derive(Debug, Error)]
pub enum MetricError {
    /// A metric with the same name is already registered.
    #[error("duplicate metric name: {0}")]
    DuplicateMetric(String),
    /// A requested metric name is not in the registry.
    #[error("unknown metric: {0}")]
    UndefinedMetric(String),
}
