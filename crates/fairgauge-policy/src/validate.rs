use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde_json::Value;

use fairgauge_core::Dataset;

use crate::errors::{IssueSeverity, PolicyError, ValidationIssue, ValidationReport};
use crate::model::{ComparisonKind, FairnessPolicy};

/// Validated policy with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPolicy {
    pub policy: FairnessPolicy,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a policy JSON document against the policy JSON Schema.
pub fn validate_policy_json(
    policy_json: &Value,
    policy_schema: &Value,
) -> Result<ValidationReport, PolicyError> {
    let compiled =
        JSONSchema::compile(policy_schema).map_err(|err| PolicyError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(policy_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Validate a parsed policy's internal consistency.
pub fn validate_policy_semantics(policy: &FairnessPolicy) -> ValidationReport {
    let mut report = ValidationReport::default();

    if policy.group_by.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "group_by_empty",
            "/group_by",
            "policy requires at least one grouping column".to_string(),
            Some("add a sensitive-attribute column name".to_string()),
        ));
    }

    let mut seen_columns = HashSet::new();
    for (idx, column) in policy.group_by.iter().enumerate() {
        if !seen_columns.insert(column.as_str()) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_group_column",
                format!("/group_by/{idx}"),
                format!("grouping column '{column}' listed more than once"),
                Some("keep each column once".to_string()),
            ));
        }
    }

    if policy.metrics.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "metrics_empty",
            "/metrics",
            "policy requires at least one metric".to_string(),
            Some("add a metric name such as selection_rate".to_string()),
        ));
    }

    let mut seen_metrics = HashSet::new();
    for (idx, metric) in policy.metrics.iter().enumerate() {
        if !seen_metrics.insert(metric.as_str()) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "duplicate_metric",
                format!("/metrics/{idx}"),
                format!("metric '{metric}' listed more than once"),
                None,
            ));
        }
    }

    validate_tolerance(
        policy.disparity.comparison,
        policy.disparity.tolerance,
        "/disparity/tolerance",
        &mut report,
    );

    if policy.partition.max_cardinality == 0 {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "max_cardinality_zero",
            "/partition/max_cardinality",
            "max_cardinality must be greater than zero".to_string(),
            None,
        ));
    }

    if policy.partition.min_group_size == 0 {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "min_group_size_zero",
            "/partition/min_group_size",
            "min_group_size of zero disables low-confidence flagging".to_string(),
            None,
        ));
    }

    if let Some(thresholds) = &policy.thresholds {
        if !(0.0..=1.0).contains(&thresholds.default) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "threshold_out_of_range",
                "/thresholds/default",
                format!("threshold {} outside [0, 1]", thresholds.default),
                None,
            ));
        }
        for (group, threshold) in &thresholds.per_group {
            if !(0.0..=1.0).contains(threshold) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "threshold_out_of_range",
                    format!("/thresholds/per_group/{group}"),
                    format!("threshold {threshold} outside [0, 1]"),
                    None,
                ));
            }
        }
    }

    if let Some(mitigation) = &policy.mitigation {
        if mitigation.target_metric.trim().is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "empty_target_metric",
                "/mitigation/target_metric",
                "target_metric must be a non-empty string".to_string(),
                None,
            ));
        }
        if mitigation.utility_metric.trim().is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "empty_utility_metric",
                "/mitigation/utility_metric",
                "utility_metric must be a non-empty string".to_string(),
                None,
            ));
        }
        if let Some(tolerance) = mitigation.tolerance {
            validate_tolerance(
                policy.disparity.comparison,
                tolerance,
                "/mitigation/tolerance",
                &mut report,
            );
        }
        if mitigation.timeout_ms == Some(0) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "timeout_zero",
                "/mitigation/timeout_ms",
                "a zero timeout truncates the search immediately".to_string(),
                Some("omit timeout_ms or set a positive budget".to_string()),
            ));
        }
        if mitigation.max_combinations == Some(0) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "max_combinations_zero",
                "/mitigation/max_combinations",
                "a zero combination budget truncates the search immediately".to_string(),
                None,
            ));
        }
    }

    report
}

/// Validate a parsed policy against the dataset it will evaluate.
pub fn validate_policy_against_dataset(
    policy: &FairnessPolicy,
    dataset: &Dataset,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (idx, column) in policy.group_by.iter().enumerate() {
        if dataset.column_index(column).is_none() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "unknown_group_column",
                format!("/group_by/{idx}"),
                format!("attribute column '{column}' not found in dataset"),
                Some("check the dataset's attribute_columns".to_string()),
            ));
        }
    }

    report
}

/// Validate the policy end-to-end, returning structured issues on failure.
pub fn validate_policy(
    policy_json: &Value,
    policy_schema: &Value,
    dataset: &Dataset,
) -> Result<ValidatedPolicy, ValidationReport> {
    let structural = match validate_policy_json(policy_json, policy_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let policy: FairnessPolicy = match serde_json::from_value(policy_json.clone()) {
        Ok(policy) => policy,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_policy_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let mut combined = validate_policy_semantics(&policy);
    combined.merge(validate_policy_against_dataset(&policy, dataset));
    if !combined.is_ok() {
        return Err(combined);
    }

    Ok(ValidatedPolicy {
        policy,
        warnings: combined.warnings,
    })
}

fn validate_tolerance(
    comparison: ComparisonKind,
    tolerance: f64,
    path: &str,
    report: &mut ValidationReport,
) {
    let valid = match comparison {
        ComparisonKind::Absolute => tolerance.is_finite() && tolerance >= 0.0,
        ComparisonKind::Ratio => tolerance.is_finite() && (0.0..=1.0).contains(&tolerance),
    };
    if !valid {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "tolerance_out_of_range",
            path,
            format!("tolerance {tolerance} invalid for {comparison:?} comparison"),
            Some("absolute tolerances are >= 0; ratio tolerances lie in [0, 1]".to_string()),
        ));
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
