use std::sync::Arc;

use fairgauge_core::{Dataset, EvaluationRow, MetricValue};
use fairgauge_eval::{DisparityStatus, EvaluationEngine, render_markdown};
use fairgauge_metrics::{MetricDefinition, MetricKind, MetricRegistry, SELECTION_RATE};
use fairgauge_policy::{ComparisonKind, DisparityMode, FairnessPolicy, MitigationConfig};

fn repeated(count: usize, label: f64, score: f64, group: &str) -> Vec<EvaluationRow> {
    (0..count)
        .map(|_| EvaluationRow::new(label, score, vec![group.into()]))
        .collect()
}

fn polarized_dataset() -> Dataset {
    let mut rows = Vec::new();
    rows.extend(repeated(15, 1.0, 0.9, "a"));
    rows.extend(repeated(15, 0.0, 0.9, "a"));
    rows.extend(repeated(15, 1.0, 0.3, "b"));
    rows.extend(repeated(15, 0.0, 0.3, "b"));
    Dataset::new(vec!["group".to_string()], rows).expect("dataset")
}

#[test]
fn polarized_groups_fail_absolute_tolerance() {
    let policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![SELECTION_RATE.to_string()],
    );
    let report = EvaluationEngine::new(policy)
        .run(&polarized_dataset())
        .expect("evaluation");

    let by_group: Vec<(String, MetricValue)> = report
        .metrics
        .iter()
        .map(|result| (result.group.clone(), result.value))
        .collect();
    assert_eq!(
        by_group,
        vec![
            ("a".to_string(), MetricValue::Defined(1.0)),
            ("b".to_string(), MetricValue::Defined(0.0)),
        ]
    );

    let worst = &report.disparities[0];
    assert_eq!(worst.abs_difference, MetricValue::Defined(1.0));
    assert_eq!(worst.ratio, MetricValue::Defined(0.0));
    assert_eq!(worst.status, DisparityStatus::Fail);
}

#[test]
fn polarized_groups_fail_the_eighty_percent_rule() {
    let mut policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![SELECTION_RATE.to_string()],
    );
    policy.disparity.comparison = ComparisonKind::Ratio;
    policy.disparity.tolerance = 0.8;

    let report = EvaluationEngine::new(policy)
        .run(&polarized_dataset())
        .expect("evaluation");
    let worst = &report.disparities[0];
    assert_eq!(worst.ratio, MetricValue::Defined(0.0));
    assert_eq!(worst.status, DisparityStatus::Fail);
}

#[test]
fn zero_positive_group_degrades_to_undefined() {
    let mut rows = Vec::new();
    rows.extend(repeated(20, 1.0, 0.9, "a"));
    rows.extend(repeated(20, 0.0, 0.4, "a"));
    rows.extend(repeated(30, 0.0, 0.6, "b"));
    let dataset = Dataset::new(vec!["group".to_string()], rows).expect("dataset");

    let policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec!["true_positive_rate".to_string()],
    );
    let report = EvaluationEngine::new(policy).run(&dataset).expect("evaluation");

    let b_result = report
        .metrics
        .iter()
        .find(|result| result.group == "b")
        .expect("group b result");
    assert_eq!(b_result.value, MetricValue::Undefined);

    let disparity = &report.disparities[0];
    assert_eq!(disparity.status, DisparityStatus::Undefined);
    assert_eq!(disparity.undefined_groups, vec!["b".to_string()]);

    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.code == "undefined_metric_value"
                && warning.path == "true_positive_rate/b")
    );
}

#[test]
fn group_vs_overall_mode_compares_each_group() {
    let mut policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![SELECTION_RATE.to_string()],
    );
    policy.disparity.mode = DisparityMode::GroupVsOverall;

    let report = EvaluationEngine::new(policy)
        .run(&polarized_dataset())
        .expect("evaluation");

    assert_eq!(report.disparities.len(), 2);
    assert!(
        report
            .disparities
            .iter()
            .all(|disparity| disparity.group_b == "overall")
    );
    // overall selection rate is 0.5; both groups sit 0.5 away from it
    assert!(
        report
            .disparities
            .iter()
            .all(|disparity| disparity.abs_difference == MetricValue::Defined(0.5))
    );
}

#[test]
fn small_groups_are_flagged_not_suppressed() {
    let mut rows = Vec::new();
    rows.extend(repeated(40, 1.0, 0.9, "a"));
    rows.extend(repeated(5, 1.0, 0.3, "b"));
    let dataset = Dataset::new(vec!["group".to_string()], rows).expect("dataset");

    let policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![SELECTION_RATE.to_string()],
    );
    let report = EvaluationEngine::new(policy).run(&dataset).expect("evaluation");

    let b_summary = report
        .groups
        .iter()
        .find(|group| group.id == "b")
        .expect("group b");
    assert!(b_summary.low_confidence);
    assert!(
        report
            .metrics
            .iter()
            .filter(|result| result.group == "b")
            .all(|result| result.low_confidence)
    );
    assert!(
        report
            .warnings
            .iter()
            .any(|warning| warning.code == "low_confidence_group" && warning.path == "b")
    );
}

#[test]
fn mitigation_equalizes_and_is_reflected_in_the_report() {
    let mut rows = Vec::new();
    rows.extend(repeated(15, 1.0, 0.9, "a"));
    rows.extend(repeated(15, 0.0, 0.2, "a"));
    rows.extend(repeated(15, 1.0, 0.3, "b"));
    rows.extend(repeated(15, 0.0, 0.1, "b"));
    let dataset = Dataset::new(vec!["group".to_string()], rows).expect("dataset");

    let mut policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![SELECTION_RATE.to_string(), "accuracy".to_string()],
    );
    policy.disparity.tolerance = 0.05;
    policy.mitigation = Some(MitigationConfig {
        target_metric: SELECTION_RATE.to_string(),
        utility_metric: "accuracy".to_string(),
        tolerance: None,
        timeout_ms: None,
        max_combinations: None,
    });

    let report = EvaluationEngine::new(policy).run(&dataset).expect("evaluation");

    assert_eq!(report.thresholds.threshold_for("a"), 0.9);
    assert_eq!(report.thresholds.threshold_for("b"), 0.3);

    let mitigation = report.mitigation.as_ref().expect("mitigation summary");
    assert_eq!(mitigation.baseline_disparity, MetricValue::Defined(0.5));
    assert_eq!(mitigation.achieved_disparity, MetricValue::Defined(0.0));
    assert_eq!(mitigation.utility, MetricValue::Defined(1.0));
    assert!(!mitigation.tolerance_unmet);
    assert!(!mitigation.search_truncated);

    // metric sections are computed under the mitigated thresholds
    let selection_rates: Vec<MetricValue> = report
        .metrics
        .iter()
        .filter(|result| result.metric == SELECTION_RATE)
        .map(|result| result.value)
        .collect();
    assert_eq!(
        selection_rates,
        vec![MetricValue::Defined(0.5), MetricValue::Defined(0.5)]
    );
    assert!(
        report
            .disparities
            .iter()
            .all(|disparity| disparity.status == DisparityStatus::Pass)
    );
}

#[test]
fn report_round_trips_and_is_byte_reproducible() {
    let mut policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![SELECTION_RATE.to_string(), "auc".to_string()],
    );
    policy.verbose_pairs = true;
    let engine = EvaluationEngine::new(policy);

    let first = engine.run(&polarized_dataset()).expect("first run");
    let second = engine.run(&polarized_dataset()).expect("second run");

    let first_json = first.to_json_pretty().expect("serialize");
    let second_json = second.to_json_pretty().expect("serialize");
    assert_eq!(first_json, second_json);
    assert_eq!(render_markdown(&first), render_markdown(&second));

    let back: fairgauge_eval::EvaluationReport =
        serde_json::from_str(&first_json).expect("deserialize");
    assert_eq!(back, first);
}

#[test]
fn custom_metrics_join_the_catalog() {
    let registry = MetricRegistry::with_catalog();
    registry
        .register(MetricDefinition::new(
            "score_mean",
            MetricKind::Score,
            Arc::new(|rows, _| {
                let weight: f64 = rows.iter().map(|row| row.weight).sum();
                let sum: f64 = rows.iter().map(|row| row.score * row.weight).sum();
                MetricValue::from_ratio(sum, weight)
            }),
        ))
        .expect("register custom metric");

    let policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec!["score_mean".to_string()],
    );
    let report = EvaluationEngine::with_registry(policy, registry)
        .run(&polarized_dataset())
        .expect("evaluation");

    let values: Vec<f64> = report
        .metrics
        .iter()
        .map(|result| result.value.as_f64().expect("defined"))
        .collect();
    assert!((values[0] - 0.9).abs() < 1e-9);
    assert!((values[1] - 0.3).abs() < 1e-9);
}

#[test]
fn unknown_metric_fails_before_any_computation() {
    let policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec!["not_a_metric".to_string()],
    );
    let err = EvaluationEngine::new(policy)
        .run(&polarized_dataset())
        .unwrap_err();
    assert!(err.to_string().contains("unknown metric"));
}
