use fairgauge_core::{Dataset, EvaluationRow};
use fairgauge_policy::{
    FairnessPolicy, policy_json_schema, validate_policy, validate_policy_json,
    validate_policy_semantics,
};
use serde_json::json;

fn schema_value() -> serde_json::Value {
    serde_json::to_value(policy_json_schema()).expect("serialize schema")
}

fn dataset() -> Dataset {
    let rows = vec![
        EvaluationRow::new(1.0, 0.9, vec!["f".into()]),
        EvaluationRow::new(0.0, 0.2, vec!["m".into()]),
    ];
    Dataset::new(vec!["sex".to_string()], rows).expect("dataset")
}

#[test]
fn minimal_policy_validates() {
    let policy_json = json!({
        "group_by": ["sex"],
        "metrics": ["selection_rate", "accuracy"],
    });

    let structural =
        validate_policy_json(&policy_json, &schema_value()).expect("structural validation");
    assert!(structural.errors.is_empty(), "structural errors found");

    let validated = validate_policy(&policy_json, &schema_value(), &dataset())
        .expect("policy validation should succeed");
    assert!(validated.warnings.is_empty(), "unexpected warnings");
    assert_eq!(validated.policy.disparity.tolerance, 0.2);
    assert_eq!(validated.policy.partition.max_cardinality, 100);
}

#[test]
fn unknown_group_column_is_an_error() {
    let policy_json = json!({
        "group_by": ["age_bucket"],
        "metrics": ["selection_rate"],
    });

    let report = validate_policy(&policy_json, &schema_value(), &dataset()).unwrap_err();
    assert!(
        report
            .errors
            .iter()
            .any(|issue| issue.code == "unknown_group_column")
    );
}

#[test]
fn ratio_tolerance_above_one_is_an_error() {
    let mut policy = FairnessPolicy::new(
        vec!["sex".to_string()],
        vec!["selection_rate".to_string()],
    );
    policy.disparity.comparison = fairgauge_policy::ComparisonKind::Ratio;
    policy.disparity.tolerance = 1.5;

    let report = validate_policy_semantics(&policy);
    assert!(
        report
            .errors
            .iter()
            .any(|issue| issue.code == "tolerance_out_of_range")
    );
}

#[test]
fn out_of_range_threshold_is_an_error() {
    let policy_json = json!({
        "group_by": ["sex"],
        "metrics": ["selection_rate"],
        "thresholds": { "default": 1.5 },
    });

    let report = validate_policy(&policy_json, &schema_value(), &dataset()).unwrap_err();
    assert!(
        report
            .errors
            .iter()
            .any(|issue| issue.code == "threshold_out_of_range")
    );
}

#[test]
fn duplicate_metric_is_a_warning_only() {
    let policy = FairnessPolicy::new(
        vec!["sex".to_string()],
        vec!["accuracy".to_string(), "accuracy".to_string()],
    );

    let report = validate_policy_semantics(&policy);
    assert!(report.is_ok());
    assert!(
        report
            .warnings
            .iter()
            .any(|issue| issue.code == "duplicate_metric")
    );
}

#[test]
fn zero_timeout_warns_about_truncation() {
    let policy_json = json!({
        "group_by": ["sex"],
        "metrics": ["selection_rate"],
        "mitigation": {
            "target_metric": "selection_rate",
            "timeout_ms": 0,
        },
    });

    let validated = validate_policy(&policy_json, &schema_value(), &dataset())
        .expect("warnings do not fail validation");
    assert!(
        validated
            .warnings
            .iter()
            .any(|issue| issue.code == "timeout_zero")
    );
    assert_eq!(validated.policy.mitigation.unwrap().utility_metric, "accuracy");
}

#[test]
fn policy_round_trips_through_json() {
    let policy = FairnessPolicy::new(
        vec!["sex".to_string(), "region".to_string()],
        vec!["true_positive_rate".to_string()],
    );
    let json = serde_json::to_value(&policy).expect("serialize");
    let back: FairnessPolicy = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back.group_by, policy.group_by);
    assert_eq!(back.metrics, policy.metrics);
}
