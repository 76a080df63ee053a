use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use fairgauge_core::{MetricValue, OVERALL_GROUP_ID};
use fairgauge_metrics::MetricResult;
use fairgauge_policy::{ComparisonKind, DisparityMode};

/// Pass/fail state of one disparity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisparityStatus {
    Pass,
    Fail,
    /// At least one compared value was undefined; never treated as a pass.
    Undefined,
}

/// Disparity of one metric between two groups, or between a group and the
/// dataset-wide value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DisparityResult {
    pub metric: String,
    pub group_a: String,
    pub group_b: String,
    pub abs_difference: MetricValue,
    /// min/max of the two values; two exact zeros compare as 1.0.
    pub ratio: MetricValue,
    pub comparison: ComparisonKind,
    pub tolerance: f64,
    pub status: DisparityStatus,
    pub low_confidence: bool,
    /// Groups whose metric value was undefined and therefore not comparable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undefined_groups: Vec<String>,
}

/// Extremal disparities per metric, plus the full pairwise list when the
/// policy asks for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DisparityAnalysis {
    pub summary: Vec<DisparityResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<DisparityResult>,
}

/// Compare metric values across groups against the configured tolerance.
///
/// Max-pairwise mode computes every pair internally but reports only the
/// worst one per metric; `verbose` exposes the full list. Comparisons that
/// touch an undefined value surface as `status: undefined`.
pub fn evaluate_disparities(
    metric_results: &[MetricResult],
    overall: &[MetricResult],
    mode: DisparityMode,
    comparison: ComparisonKind,
    tolerance: f64,
    verbose: bool,
) -> DisparityAnalysis {
    let mut by_metric: BTreeMap<&str, Vec<&MetricResult>> = BTreeMap::new();
    for result in metric_results {
        by_metric.entry(result.metric.as_str()).or_default().push(result);
    }

    let mut analysis = DisparityAnalysis::default();

    for (metric, results) in &by_metric {
        match mode {
            DisparityMode::MaxPairwise => {
                max_pairwise(metric, results, comparison, tolerance, verbose, &mut analysis);
            }
            DisparityMode::GroupVsOverall => {
                let overall_value = overall
                    .iter()
                    .find(|result| result.metric == *metric)
                    .map(|result| result.value)
                    .unwrap_or(MetricValue::Undefined);
                for result in results {
                    analysis.summary.push(build_pair(
                        metric,
                        result,
                        &MetricResult {
                            metric: (*metric).to_string(),
                            group: OVERALL_GROUP_ID.to_string(),
                            value: overall_value,
                            sample_size: 0,
                            low_confidence: false,
                        },
                        comparison,
                        tolerance,
                    ));
                }
            }
        }
    }

    sort_results(&mut analysis.summary);
    sort_results(&mut analysis.pairs);
    analysis
}

fn max_pairwise(
    metric: &str,
    results: &[&MetricResult],
    comparison: ComparisonKind,
    tolerance: f64,
    verbose: bool,
    analysis: &mut DisparityAnalysis,
) {
    if results.len() < 2 {
        return;
    }

    let mut worst: Option<DisparityResult> = None;
    let undefined_groups: Vec<String> = results
        .iter()
        .filter(|result| !result.value.is_defined())
        .map(|result| result.group.clone())
        .collect();

    for (idx, a) in results.iter().enumerate() {
        for b in &results[idx + 1..] {
            let pair = build_pair(metric, a, b, comparison, tolerance);
            let candidate_is_worse = match &worst {
                None => pair.status != DisparityStatus::Undefined,
                Some(current) => is_worse(&pair, current, comparison),
            };
            if candidate_is_worse {
                worst = Some(pair.clone());
            }
            if verbose {
                analysis.pairs.push(pair);
            }
        }
    }

    let entry = match worst {
        Some(mut entry) => {
            entry.undefined_groups = undefined_groups;
            entry
        }
        // Fewer than two defined values: surface the gap explicitly instead
        // of letting missing data read as fairness.
        None => DisparityResult {
            metric: metric.to_string(),
            group_a: results[0].group.clone(),
            group_b: results[1].group.clone(),
            abs_difference: MetricValue::Undefined,
            ratio: MetricValue::Undefined,
            comparison,
            tolerance,
            status: DisparityStatus::Undefined,
            low_confidence: results[0].low_confidence || results[1].low_confidence,
            undefined_groups,
        },
    };
    analysis.summary.push(entry);
}

fn build_pair(
    metric: &str,
    a: &MetricResult,
    b: &MetricResult,
    comparison: ComparisonKind,
    tolerance: f64,
) -> DisparityResult {
    let mut undefined_groups = Vec::new();
    if !a.value.is_defined() {
        undefined_groups.push(a.group.clone());
    }
    if !b.value.is_defined() {
        undefined_groups.push(b.group.clone());
    }

    let (abs_difference, ratio, status) = match (a.value.as_f64(), b.value.as_f64()) {
        (Some(left), Some(right)) => {
            let difference = (left - right).abs();
            let ratio = pair_ratio(left.min(right), left.max(right));
            let status = match comparison {
                ComparisonKind::Absolute => {
                    if difference <= tolerance {
                        DisparityStatus::Pass
                    } else {
                        DisparityStatus::Fail
                    }
                }
                ComparisonKind::Ratio => match ratio {
                    MetricValue::Defined(value) if value >= tolerance => DisparityStatus::Pass,
                    MetricValue::Defined(_) => DisparityStatus::Fail,
                    MetricValue::Undefined => DisparityStatus::Undefined,
                },
            };
            (MetricValue::Defined(difference), ratio, status)
        }
        _ => (
            MetricValue::Undefined,
            MetricValue::Undefined,
            DisparityStatus::Undefined,
        ),
    };

    DisparityResult {
        metric: metric.to_string(),
        group_a: a.group.clone(),
        group_b: b.group.clone(),
        abs_difference,
        ratio,
        comparison,
        tolerance,
        status,
        low_confidence: a.low_confidence || b.low_confidence,
        undefined_groups,
    }
}

fn pair_ratio(min: f64, max: f64) -> MetricValue {
    if max > 0.0 {
        MetricValue::Defined(min / max)
    } else if min == 0.0 && max == 0.0 {
        MetricValue::Defined(1.0)
    } else {
        MetricValue::Undefined
    }
}

// Worst pair under the active comparison: largest absolute gap, or smallest
// ratio. Undefined pairs never displace a defined one.
fn is_worse(candidate: &DisparityResult, current: &DisparityResult, comparison: ComparisonKind) -> bool {
    if candidate.status == DisparityStatus::Undefined {
        return false;
    }
    match comparison {
        ComparisonKind::Absolute => {
            match (candidate.abs_difference.as_f64(), current.abs_difference.as_f64()) {
                (Some(next), Some(best)) => next > best,
                (Some(_), None) => true,
                _ => false,
            }
        }
        ComparisonKind::Ratio => match (candidate.ratio.as_f64(), current.ratio.as_f64()) {
            (Some(next), Some(best)) => next < best,
            (Some(_), None) => true,
            _ => false,
        },
    }
}

fn sort_results(results: &mut [DisparityResult]) {
    results.sort_by(|a, b| {
        (a.metric.clone(), a.group_a.clone(), a.group_b.clone()).cmp(&(
            b.metric.clone(),
            b.group_a.clone(),
            b.group_b.clone(),
        ))
    });
}
