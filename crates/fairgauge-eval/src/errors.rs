use thiserror::Error;

/// Errors emitted by the evaluation engine.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("core error: {0}")]
    Core(#[from] fairgauge_core::Error),
    #[error("metric error: {0}")]
    Metric(#[from] fairgauge_metrics::MetricError),
    #[error("mitigation error: {0}")]
    Mitigation(#[from] fairgauge_mitigate::MitigationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
