//! Fairness evaluation engine for Fairgauge.
//!
//! Orchestrates partitioning, metric computation, disparity evaluation, and
//! optional threshold mitigation into a single immutable report.

pub mod disparity;
pub mod engine;
pub mod errors;
pub mod report;

pub use disparity::{DisparityAnalysis, DisparityResult, DisparityStatus, evaluate_disparities};
pub use engine::EvaluationEngine;
pub use errors::EvalError;
pub use report::{
    EvaluationReport, GroupSummary, MitigationSummary, REPORT_VERSION, ReportWarning,
    render_markdown, report_json_schema,
};
