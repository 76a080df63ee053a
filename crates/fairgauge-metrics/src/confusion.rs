use fairgauge_core::{EvaluationRow, MetricValue};

/// Sample-weighted 2x2 confusion matrix.
///
/// A score greater than or equal to the active threshold counts as a
/// positive prediction; ties at exactly the threshold are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfusionMatrix {
    pub true_positive: f64,
    pub false_positive: f64,
    pub true_negative: f64,
    pub false_negative: f64,
}

impl ConfusionMatrix {
    pub fn from_rows(rows: &[&EvaluationRow], threshold: f64) -> Self {
        let mut matrix = ConfusionMatrix::default();
        for row in rows {
            let predicted_positive = row.score >= threshold;
            match (row.is_positive_label(), predicted_positive) {
                (true, true) => matrix.true_positive += row.weight,
                (true, false) => matrix.false_negative += row.weight,
                (false, true) => matrix.false_positive += row.weight,
                (false, false) => matrix.true_negative += row.weight,
            }
        }
        matrix
    }

    pub fn total(&self) -> f64 {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Fraction of the group predicted positive.
    pub fn selection_rate(&self) -> MetricValue {
        MetricValue::from_ratio(self.true_positive + self.false_positive, self.total())
    }

    pub fn true_positive_rate(&self) -> MetricValue {
        MetricValue::from_ratio(
            self.true_positive,
            self.true_positive + self.false_negative,
        )
    }

    pub fn false_positive_rate(&self) -> MetricValue {
        MetricValue::from_ratio(
            self.false_positive,
            self.false_positive + self.true_negative,
        )
    }

    pub fn false_negative_rate(&self) -> MetricValue {
        MetricValue::from_ratio(
            self.false_negative,
            self.true_positive + self.false_negative,
        )
    }

    pub fn positive_predictive_value(&self) -> MetricValue {
        MetricValue::from_ratio(
            self.true_positive,
            self.true_positive + self.false_positive,
        )
    }

    pub fn accuracy(&self) -> MetricValue {
        MetricValue::from_ratio(self.true_positive + self.true_negative, self.total())
    }
}
