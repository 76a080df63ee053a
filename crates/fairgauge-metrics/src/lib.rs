//! Metric registry and engine for Fairgauge.
//!
//! Hosts the sample-weighted confusion matrix, the built-in fairness metric
//! catalog, and the open registry used to evaluate metrics per group.

pub mod catalog;
pub mod confusion;
pub mod engine;
pub mod errors;
pub mod registry;

pub use catalog::{
    ACCURACY, AUC, FALSE_NEGATIVE_RATE, FALSE_POSITIVE_RATE, POSITIVE_PREDICTIVE_VALUE,
    SELECTION_RATE, TRUE_POSITIVE_RATE, area_under_curve, catalog,
};
pub use confusion::ConfusionMatrix;
pub use engine::{MetricResult, evaluate, evaluate_metric_on_rows};
pub use errors::MetricError;
pub use registry::{MetricDefinition, MetricFn, MetricKind, MetricRegistry};
