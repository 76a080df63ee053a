use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use fairgauge_core::{Dataset, EvaluationRow, Group, MetricValue, ThresholdAssignment};

use crate::errors::MetricError;
use crate::registry::{MetricDefinition, MetricRegistry};

/// Metric value for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricResult {
    pub metric: String,
    pub group: String,
    pub value: MetricValue,
    pub sample_size: u64,
    pub low_confidence: bool,
}

/// Evaluate the requested metrics for every group.
///
/// Unknown metric names fail before any computation. Zero-denominator
/// values surface as `Undefined` results instead of errors. Groups with no
/// rows produce no results. Output is sorted by metric name, then group
/// identifier, so parallel completion order could never change report bytes.
pub fn evaluate(
    dataset: &Dataset,
    groups: &[Group],
    thresholds: &ThresholdAssignment,
    metric_names: &[String],
    registry: &MetricRegistry,
) -> Result<Vec<MetricResult>, MetricError> {
    let mut definitions = Vec::with_capacity(metric_names.len());
    for name in metric_names {
        let definition = registry
            .get(name)
            .ok_or_else(|| MetricError::UndefinedMetric(name.clone()))?;
        definitions.push(definition);
    }

    let mut results = Vec::with_capacity(definitions.len() * groups.len());
    for group in groups {
        if group.row_indices.is_empty() {
            continue;
        }
        let rows: Vec<&EvaluationRow> = group
            .row_indices
            .iter()
            .map(|&idx| &dataset.rows[idx])
            .collect();
        let group_id = group.key.id();
        let threshold = thresholds.threshold_for(&group_id);
        for definition in &definitions {
            results.push(MetricResult {
                metric: definition.name.clone(),
                group: group_id.clone(),
                value: evaluate_metric_on_rows(definition, &rows, threshold),
                sample_size: group.sample_size(),
                low_confidence: group.low_confidence,
            });
        }
    }

    results.sort_by(|a, b| {
        (a.metric.clone(), a.group.clone()).cmp(&(b.metric.clone(), b.group.clone()))
    });
    Ok(results)
}

/// Evaluate one metric over an arbitrary row slice.
///
/// Score-type metrics ignore the threshold and receive `None`.
pub fn evaluate_metric_on_rows(
    definition: &MetricDefinition,
    rows: &[&EvaluationRow],
    threshold: f64,
) -> MetricValue {
    let threshold = definition.is_rate().then_some(threshold);
    (definition.compute)(rows, threshold)
}
