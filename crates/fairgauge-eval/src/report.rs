use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};

use fairgauge_core::{MetricValue, ThresholdAssignment};
use fairgauge_metrics::MetricResult;

use crate::disparity::DisparityResult;

/// Report contract version for serialized evaluation reports.
pub const REPORT_VERSION: &str = "0.1";

/// Sample descriptor for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupSummary {
    pub id: String,
    pub sample_size: u64,
    pub weight: f64,
    pub low_confidence: bool,
}

/// Structured warning entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportWarning {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Mitigation section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MitigationSummary {
    pub target_metric: String,
    pub utility_metric: String,
    pub tolerance: f64,
    /// Target metric per group under the mitigated thresholds.
    pub achieved: Vec<MetricResult>,
    pub achieved_disparity: MetricValue,
    /// Target-metric disparity under the unmitigated thresholds.
    pub baseline_disparity: MetricValue,
    pub utility: MetricValue,
    pub tolerance_unmet: bool,
    pub search_truncated: bool,
    pub combinations_examined: u64,
}

/// Machine-readable artifact of one fairness evaluation.
///
/// Deterministically ordered; evaluating identical inputs twice yields
/// byte-identical serialization, so the report carries no run identifiers
/// or timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationReport {
    pub report_version: String,
    pub group_columns: Vec<String>,
    pub groups: Vec<GroupSummary>,
    /// Per-group metric values, sorted by metric name then group id.
    pub metrics: Vec<MetricResult>,
    /// Dataset-wide metric values.
    pub overall: Vec<MetricResult>,
    pub disparities: Vec<DisparityResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disparity_pairs: Vec<DisparityResult>,
    /// The thresholds the metric sections were computed under.
    pub thresholds: ThresholdAssignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<MitigationSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
}

impl EvaluationReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Emit the JSON Schema for serialized evaluation reports.
pub fn report_json_schema() -> RootSchema {
    schema_for!(EvaluationReport)
}

pub(crate) fn sort_warnings(warnings: &mut [ReportWarning]) {
    warnings
        .sort_by(|a, b| (a.path.clone(), a.code.clone()).cmp(&(b.path.clone(), b.code.clone())));
}

/// Render a deterministic markdown report.
pub fn render_markdown(report: &EvaluationReport) -> String {
    let mut lines = Vec::new();

    lines.push("# Fairness Evaluation Report".to_string());
    lines.push(String::new());
    lines.push("## Groups".to_string());
    lines.push(format!("- group_columns: {}", report.group_columns.join(", ")));
    lines.push("| group | samples | weight | low_confidence |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for group in &report.groups {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            group.id, group.sample_size, group.weight, group.low_confidence
        ));
    }
    lines.push(String::new());

    lines.push("## Metrics".to_string());
    lines.push("| metric | group | value | samples |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for result in &report.metrics {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            result.metric,
            result.group,
            fmt_value(result.value),
            result.sample_size
        ));
    }
    for result in &report.overall {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            result.metric,
            result.group,
            fmt_value(result.value),
            result.sample_size
        ));
    }
    lines.push(String::new());

    lines.push("## Disparities".to_string());
    lines.push("| metric | groups | abs_difference | ratio | status |".to_string());
    lines.push("| --- | --- | --- | --- | --- |".to_string());
    for disparity in &report.disparities {
        lines.push(format!(
            "| {} | {} vs {} | {} | {} | {} |",
            disparity.metric,
            disparity.group_a,
            disparity.group_b,
            fmt_value(disparity.abs_difference),
            fmt_value(disparity.ratio),
            fmt_status(disparity)
        ));
    }
    lines.push(String::new());

    lines.push("## Thresholds".to_string());
    lines.push(format!("- default: {}", report.thresholds.default));
    for (group, threshold) in &report.thresholds.per_group {
        lines.push(format!("- {group}: {threshold}"));
    }
    lines.push(String::new());

    if let Some(mitigation) = &report.mitigation {
        lines.push("## Mitigation".to_string());
        lines.push(format!("- target_metric: {}", mitigation.target_metric));
        lines.push(format!("- utility_metric: {}", mitigation.utility_metric));
        lines.push(format!("- tolerance: {}", mitigation.tolerance));
        lines.push(format!(
            "- baseline_disparity: {}",
            fmt_value(mitigation.baseline_disparity)
        ));
        lines.push(format!(
            "- achieved_disparity: {}",
            fmt_value(mitigation.achieved_disparity)
        ));
        lines.push(format!("- utility: {}", fmt_value(mitigation.utility)));
        lines.push(format!("- tolerance_unmet: {}", mitigation.tolerance_unmet));
        lines.push(format!(
            "- search_truncated: {}",
            mitigation.search_truncated
        ));
        lines.push(format!(
            "- combinations_examined: {}",
            mitigation.combinations_examined
        ));
        lines.push(String::new());
    }

    if !report.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in &report.warnings {
            let hint = warning
                .hint
                .as_ref()
                .map(|hint| format!(" (hint: {hint})"))
                .unwrap_or_default();
            lines.push(format!("- {}: {}{}", warning.path, warning.message, hint));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn fmt_value(value: MetricValue) -> String {
    match value {
        MetricValue::Defined(value) => format!("{value:.4}"),
        MetricValue::Undefined => "undefined".to_string(),
    }
}

fn fmt_status(disparity: &DisparityResult) -> String {
    let status = match disparity.status {
        crate::disparity::DisparityStatus::Pass => "pass",
        crate::disparity::DisparityStatus::Fail => "fail",
        crate::disparity::DisparityStatus::Undefined => "undefined",
    };
    if disparity.low_confidence {
        format!("{status} (low confidence)")
    } else {
        status.to_string()
    }
}
