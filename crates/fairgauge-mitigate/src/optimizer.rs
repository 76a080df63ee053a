use std::cmp::Ordering;
use std::time::Instant;

use tracing::{info, warn};

use fairgauge_core::{
    DEFAULT_THRESHOLD, Dataset, EvaluationRow, Group, MetricValue, ThresholdAssignment,
};
use fairgauge_metrics::{MetricDefinition, MetricRegistry, MetricResult, evaluate_metric_on_rows};
use fairgauge_policy::ComparisonKind;

use crate::errors::MitigationError;
use crate::model::{MitigationOptions, MitigationOutcome};

/// Exact per-group threshold search.
///
/// A rate metric is a step function of the threshold that only changes at
/// observed score values, so the candidate set per group is the sorted
/// distinct scores plus the 0 and 1 endpoints. The Cartesian product of the
/// candidate sets is searched with per-(group, candidate) values
/// precomputed, so the inner loop is arithmetic only.
pub struct ThresholdOptimizer {
    options: MitigationOptions,
}

struct Candidate {
    threshold: f64,
    target: MetricValue,
    utility: MetricValue,
    deviation: f64,
}

struct GroupSearch {
    id: String,
    sample_size: u64,
    low_confidence: bool,
    weight: f64,
    candidates: Vec<Candidate>,
}

struct Scored {
    feasible: bool,
    defined_count: usize,
    badness: f64,
    utility: f64,
    deviation: f64,
}

impl ThresholdOptimizer {
    pub fn new(options: MitigationOptions) -> Self {
        Self { options }
    }

    /// Search per-group thresholds equalizing `target_metric`.
    ///
    /// Never fails for data reasons: an unsatisfiable tolerance comes back
    /// as `tolerance_unmet` and an exhausted budget as `search_truncated`,
    /// both with the best combination found.
    pub fn run(
        &self,
        dataset: &Dataset,
        groups: &[Group],
        target_metric: &str,
        utility_metric: &str,
        registry: &MetricRegistry,
    ) -> Result<MitigationOutcome, MitigationError> {
        let target = registry
            .get(target_metric)
            .ok_or_else(|| MitigationError::UnknownMetric(target_metric.to_string()))?;
        if !target.is_rate() {
            return Err(MitigationError::NotRateType(target_metric.to_string()));
        }
        let utility = registry
            .get(utility_metric)
            .ok_or_else(|| MitigationError::UnknownMetric(utility_metric.to_string()))?;

        let searches: Vec<GroupSearch> = groups
            .iter()
            .filter(|group| !group.row_indices.is_empty())
            .map(|group| build_group_search(dataset, group, &target, &utility))
            .collect();

        if searches.is_empty() {
            return Ok(MitigationOutcome {
                assignment: ThresholdAssignment::default(),
                achieved: Vec::new(),
                disparity: MetricValue::Undefined,
                utility: MetricValue::Undefined,
                tolerance_unmet: false,
                search_truncated: false,
                combinations_examined: 0,
            });
        }

        let space: u128 = searches
            .iter()
            .map(|search| search.candidates.len() as u128)
            .product();
        info!(
            target = target_metric,
            utility = utility_metric,
            groups = searches.len(),
            combinations = space.min(u64::MAX as u128) as u64,
            "threshold search started"
        );

        let deadline = self.options.timeout.map(|timeout| Instant::now() + timeout);
        let comparison = self.options.comparison;
        let tolerance = self.options.tolerance;

        let mut indices = vec![0usize; searches.len()];
        let mut best = score_combination(&searches, &indices, comparison, tolerance);
        let mut best_indices = indices.clone();
        let mut examined: u64 = 1;
        let mut truncated = false;

        loop {
            if !advance(&mut indices, &searches) {
                break;
            }
            if examined >= self.options.max_combinations {
                truncated = true;
                break;
            }
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                truncated = true;
                break;
            }

            let scored = score_combination(&searches, &indices, comparison, tolerance);
            examined += 1;
            if is_better(&scored, &best) {
                best = scored;
                best_indices = indices.clone();
            }
        }

        let mut assignment = ThresholdAssignment::default();
        let mut achieved = Vec::with_capacity(searches.len());
        for (search, &idx) in searches.iter().zip(&best_indices) {
            let candidate = &search.candidates[idx];
            assignment.set(search.id.clone(), candidate.threshold);
            achieved.push(MetricResult {
                metric: target_metric.to_string(),
                group: search.id.clone(),
                value: candidate.target,
                sample_size: search.sample_size,
                low_confidence: search.low_confidence,
            });
        }
        achieved.sort_by(|a, b| a.group.cmp(&b.group));

        let disparity = if best.defined_count < 2 {
            MetricValue::Undefined
        } else {
            match comparison {
                ComparisonKind::Absolute => MetricValue::Defined(best.badness),
                ComparisonKind::Ratio => MetricValue::Defined(1.0 - best.badness),
            }
        };
        let utility_value = if best.utility == f64::NEG_INFINITY {
            MetricValue::Undefined
        } else {
            MetricValue::Defined(best.utility)
        };
        let tolerance_unmet = !best.feasible;

        info!(
            examined,
            truncated, tolerance_unmet, "threshold search finished"
        );
        if truncated {
            warn!("threshold search truncated; returning best combination found so far");
        }
        if tolerance_unmet {
            warn!(
                tolerance,
                "no threshold combination satisfied the tolerance; returning minimum disparity"
            );
        }

        Ok(MitigationOutcome {
            assignment,
            achieved,
            disparity,
            utility: utility_value,
            tolerance_unmet,
            search_truncated: truncated,
            combinations_examined: examined,
        })
    }
}

fn build_group_search(
    dataset: &Dataset,
    group: &Group,
    target: &MetricDefinition,
    utility: &MetricDefinition,
) -> GroupSearch {
    let rows: Vec<&EvaluationRow> = group
        .row_indices
        .iter()
        .map(|&idx| &dataset.rows[idx])
        .collect();
    let weight: f64 = rows.iter().map(|row| row.weight).sum();

    let mut thresholds: Vec<f64> = rows.iter().map(|row| row.score).collect();
    thresholds.push(0.0);
    thresholds.push(1.0);
    thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    thresholds.dedup();

    let candidates = thresholds
        .into_iter()
        .map(|threshold| Candidate {
            threshold,
            target: evaluate_metric_on_rows(target, &rows, threshold),
            utility: evaluate_metric_on_rows(utility, &rows, threshold),
            deviation: (threshold - DEFAULT_THRESHOLD).abs(),
        })
        .collect();

    GroupSearch {
        id: group.key.id(),
        sample_size: group.sample_size(),
        low_confidence: group.low_confidence,
        weight,
        candidates,
    }
}

fn score_combination(
    searches: &[GroupSearch],
    indices: &[usize],
    comparison: ComparisonKind,
    tolerance: f64,
) -> Scored {
    let mut min_target = f64::INFINITY;
    let mut max_target = f64::NEG_INFINITY;
    let mut defined_count = 0usize;
    let mut utility_sum = 0.0;
    let mut utility_weight = 0.0;
    let mut deviation = 0.0;

    for (search, &idx) in searches.iter().zip(indices) {
        let candidate = &search.candidates[idx];
        deviation += candidate.deviation;
        if let Some(value) = candidate.target.as_f64() {
            defined_count += 1;
            min_target = min_target.min(value);
            max_target = max_target.max(value);
        }
        if let Some(value) = candidate.utility.as_f64() {
            utility_sum += value * search.weight;
            utility_weight += search.weight;
        }
    }

    let badness = if defined_count < 2 {
        f64::INFINITY
    } else {
        match comparison {
            ComparisonKind::Absolute => max_target - min_target,
            ComparisonKind::Ratio => 1.0 - pair_ratio(min_target, max_target),
        }
    };

    let within = match comparison {
        ComparisonKind::Absolute => max_target - min_target <= tolerance,
        ComparisonKind::Ratio => pair_ratio(min_target, max_target) >= tolerance,
    };
    let feasible = defined_count == searches.len() && (searches.len() < 2 || within);

    let utility = if utility_weight > 0.0 {
        utility_sum / utility_weight
    } else {
        f64::NEG_INFINITY
    };

    Scored {
        feasible,
        defined_count,
        badness,
        utility,
        deviation,
    }
}

fn pair_ratio(min: f64, max: f64) -> f64 {
    if max > 0.0 {
        min / max
    } else if min == 0.0 && max == 0.0 {
        1.0
    } else {
        0.0
    }
}

// Strict improvement only, so the first combination found wins ties and the
// search stays deterministic.
fn is_better(candidate: &Scored, current: &Scored) -> bool {
    if candidate.feasible != current.feasible {
        return candidate.feasible;
    }
    if candidate.feasible {
        if candidate.utility != current.utility {
            return candidate.utility > current.utility;
        }
        return candidate.deviation < current.deviation;
    }
    if candidate.defined_count != current.defined_count {
        return candidate.defined_count > current.defined_count;
    }
    if candidate.badness != current.badness {
        return candidate.badness < current.badness;
    }
    if candidate.utility != current.utility {
        return candidate.utility > current.utility;
    }
    candidate.deviation < current.deviation
}

fn advance(indices: &mut [usize], searches: &[GroupSearch]) -> bool {
    let mut pos = 0;
    while pos < indices.len() {
        indices[pos] += 1;
        if indices[pos] < searches[pos].candidates.len() {
            return true;
        }
        indices[pos] = 0;
        pos += 1;
    }
    false
}
