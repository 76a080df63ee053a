use std::time::Duration;

use tracing::info;

use fairgauge_core::{
    AttributeValue, Dataset, Group, GroupKey, MetricValue, OVERALL_GROUP_ID, partition_rows,
    validate_dataset,
};
use fairgauge_metrics::{MetricError, MetricRegistry, MetricResult, evaluate};
use fairgauge_mitigate::{MitigationOptions, ThresholdOptimizer};
use fairgauge_policy::{ComparisonKind, FairnessPolicy};

use crate::disparity::evaluate_disparities;
use crate::errors::EvalError;
use crate::report::{
    EvaluationReport, GroupSummary, MitigationSummary, REPORT_VERSION, ReportWarning,
    sort_warnings,
};

/// Entry point for fairness evaluation.
///
/// Stateless across calls apart from the metric registry: every run derives
/// all of its state from the dataset it is given and discards it with the
/// returned report.
pub struct EvaluationEngine {
    policy: FairnessPolicy,
    registry: MetricRegistry,
}

impl EvaluationEngine {
    pub fn new(policy: FairnessPolicy) -> Self {
        Self::with_registry(policy, MetricRegistry::with_catalog())
    }

    pub fn with_registry(policy: FairnessPolicy, registry: MetricRegistry) -> Self {
        Self { policy, registry }
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Evaluate the dataset under the engine's policy.
    ///
    /// Structural and configuration errors fail before any computation;
    /// data-sparsity conditions degrade into flagged report fields instead.
    pub fn run(&self, dataset: &Dataset) -> Result<EvaluationReport, EvalError> {
        validate_dataset(dataset)?;

        let mut metric_names = self.policy.metrics.clone();
        metric_names.sort();
        metric_names.dedup();
        for name in &metric_names {
            if self.registry.get(name).is_none() {
                return Err(MetricError::UndefinedMetric(name.clone()).into());
            }
        }

        let groups = partition_rows(dataset, &self.policy.group_by, &self.policy.partition)?;
        info!(
            rows = dataset.len(),
            groups = groups.len(),
            metrics = metric_names.len(),
            "evaluation started"
        );

        let baseline_thresholds = self.policy.thresholds_or_default();
        let mut thresholds = baseline_thresholds.clone();
        let mut mitigation = None;

        if let Some(config) = &self.policy.mitigation {
            let tolerance = config.tolerance.unwrap_or(self.policy.disparity.tolerance);
            let baseline_results = evaluate(
                dataset,
                &groups,
                &baseline_thresholds,
                std::slice::from_ref(&config.target_metric),
                &self.registry,
            )?;
            let baseline_disparity =
                values_disparity(&baseline_results, self.policy.disparity.comparison);

            let optimizer = ThresholdOptimizer::new(MitigationOptions {
                tolerance,
                comparison: self.policy.disparity.comparison,
                timeout: config.timeout_ms.map(Duration::from_millis),
                max_combinations: config.max_combinations.unwrap_or(1_000_000),
            });
            let outcome = optimizer.run(
                dataset,
                &groups,
                &config.target_metric,
                &config.utility_metric,
                &self.registry,
            )?;

            thresholds = outcome.assignment.clone();
            mitigation = Some(MitigationSummary {
                target_metric: config.target_metric.clone(),
                utility_metric: config.utility_metric.clone(),
                tolerance,
                achieved: outcome.achieved,
                achieved_disparity: outcome.disparity,
                baseline_disparity,
                utility: outcome.utility,
                tolerance_unmet: outcome.tolerance_unmet,
                search_truncated: outcome.search_truncated,
                combinations_examined: outcome.combinations_examined,
            });
        }

        let metrics = evaluate(dataset, &groups, &thresholds, &metric_names, &self.registry)?;
        let whole = overall_group(dataset, self.policy.partition.min_group_size);
        let overall = evaluate(
            dataset,
            std::slice::from_ref(&whole),
            &thresholds,
            &metric_names,
            &self.registry,
        )?;

        let analysis = evaluate_disparities(
            &metrics,
            &overall,
            self.policy.disparity.mode,
            self.policy.disparity.comparison,
            self.policy.disparity.tolerance,
            self.policy.verbose_pairs,
        );

        let mut warnings = Vec::new();
        for group in &groups {
            if group.low_confidence {
                warnings.push(ReportWarning {
                    code: "low_confidence_group".to_string(),
                    path: group.key.id(),
                    message: format!(
                        "group has {} row(s), below the minimum of {}",
                        group.sample_size(),
                        self.policy.partition.min_group_size
                    ),
                    hint: Some("treat this group's metrics as low-confidence".to_string()),
                });
            }
        }
        for result in &metrics {
            if !result.value.is_defined() {
                warnings.push(ReportWarning {
                    code: "undefined_metric_value".to_string(),
                    path: format!("{}/{}", result.metric, result.group),
                    message: "metric has a zero denominator for this group".to_string(),
                    hint: None,
                });
            }
        }
        sort_warnings(&mut warnings);

        let group_summaries = groups
            .iter()
            .map(|group| GroupSummary {
                id: group.key.id(),
                sample_size: group.sample_size(),
                weight: group
                    .row_indices
                    .iter()
                    .map(|&idx| dataset.rows[idx].weight)
                    .sum(),
                low_confidence: group.low_confidence,
            })
            .collect();

        let report = EvaluationReport {
            report_version: REPORT_VERSION.to_string(),
            group_columns: self.policy.group_by.clone(),
            groups: group_summaries,
            metrics,
            overall,
            disparities: analysis.summary,
            disparity_pairs: analysis.pairs,
            thresholds,
            mitigation,
            warnings,
        };

        info!(
            disparities = report.disparities.len(),
            warnings = report.warnings.len(),
            "evaluation finished"
        );
        Ok(report)
    }
}

fn overall_group(dataset: &Dataset, min_group_size: usize) -> Group {
    Group {
        key: GroupKey {
            values: vec![AttributeValue::Text(OVERALL_GROUP_ID.to_string())],
        },
        row_indices: (0..dataset.len()).collect(),
        low_confidence: dataset.len() < min_group_size,
    }
}

fn values_disparity(results: &[MetricResult], comparison: ComparisonKind) -> MetricValue {
    let defined: Vec<f64> = results
        .iter()
        .filter_map(|result| result.value.as_f64())
        .collect();
    if defined.len() < 2 {
        return MetricValue::Undefined;
    }
    let min = defined.iter().copied().fold(f64::INFINITY, f64::min);
    let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    match comparison {
        ComparisonKind::Absolute => MetricValue::Defined(max - min),
        ComparisonKind::Ratio => {
            if max > 0.0 {
                MetricValue::Defined(min / max)
            } else if min == 0.0 && max == 0.0 {
                MetricValue::Defined(1.0)
            } else {
                MetricValue::Undefined
            }
        }
    }
}
