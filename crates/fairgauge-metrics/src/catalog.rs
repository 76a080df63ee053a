//! Built-in fairness metric catalog.

use std::cmp::Ordering;
use std::sync::Arc;

use fairgauge_core::{DEFAULT_THRESHOLD, EvaluationRow, MetricValue};

use crate::confusion::ConfusionMatrix;
use crate::registry::{MetricDefinition, MetricKind};

pub const SELECTION_RATE: &str = "selection_rate";
pub const TRUE_POSITIVE_RATE: &str = "true_positive_rate";
pub const FALSE_POSITIVE_RATE: &str = "false_positive_rate";
pub const FALSE_NEGATIVE_RATE: &str = "false_negative_rate";
pub const POSITIVE_PREDICTIVE_VALUE: &str = "positive_predictive_value";
pub const ACCURACY: &str = "accuracy";
pub const AUC: &str = "auc";

/// The fixed catalog every registry starts from.
pub fn catalog() -> Vec<MetricDefinition> {
    vec![
        rate_metric(SELECTION_RATE, ConfusionMatrix::selection_rate),
        rate_metric(TRUE_POSITIVE_RATE, ConfusionMatrix::true_positive_rate),
        rate_metric(FALSE_POSITIVE_RATE, ConfusionMatrix::false_positive_rate),
        rate_metric(FALSE_NEGATIVE_RATE, ConfusionMatrix::false_negative_rate),
        rate_metric(
            POSITIVE_PREDICTIVE_VALUE,
            ConfusionMatrix::positive_predictive_value,
        ),
        rate_metric(ACCURACY, ConfusionMatrix::accuracy),
        MetricDefinition::new(
            AUC,
            MetricKind::Score,
            Arc::new(|rows, _| area_under_curve(rows)),
        ),
    ]
}

fn rate_metric(name: &str, derive: fn(&ConfusionMatrix) -> MetricValue) -> MetricDefinition {
    MetricDefinition::new(
        name,
        MetricKind::Rate,
        Arc::new(move |rows, threshold| {
            let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
            derive(&ConfusionMatrix::from_rows(rows, threshold))
        }),
    )
}

/// Weighted Mann-Whitney AUC over prediction scores.
///
/// Tied scores contribute half a concordant pair. Undefined when either
/// class carries no weight.
pub fn area_under_curve(rows: &[&EvaluationRow]) -> MetricValue {
    let mut sorted: Vec<&EvaluationRow> = rows.to_vec();
    sorted.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

    let mut positive_weight = 0.0;
    let mut negative_weight = 0.0;
    for row in &sorted {
        if row.is_positive_label() {
            positive_weight += row.weight;
        } else {
            negative_weight += row.weight;
        }
    }
    if positive_weight <= 0.0 || negative_weight <= 0.0 {
        return MetricValue::Undefined;
    }

    let mut concordant = 0.0;
    let mut negatives_below = 0.0;
    let mut idx = 0;
    while idx < sorted.len() {
        let score = sorted[idx].score;
        let mut tied_positive = 0.0;
        let mut tied_negative = 0.0;
        while idx < sorted.len() && sorted[idx].score == score {
            if sorted[idx].is_positive_label() {
                tied_positive += sorted[idx].weight;
            } else {
                tied_negative += sorted[idx].weight;
            }
            idx += 1;
        }
        concordant += tied_positive * (negatives_below + 0.5 * tied_negative);
        negatives_below += tied_negative;
    }

    MetricValue::Defined(concordant / (positive_weight * negative_weight))
}
