use fairgauge_core::{Dataset, EvaluationRow};
use fairgauge_eval::{EvaluationEngine, render_markdown};
use fairgauge_policy::{FairnessPolicy, MitigationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut rows = Vec::new();
    for group in ["a", "b"] {
        // group b's scores sit lower for the same labels, so the default
        // threshold under-selects it
        let shift = if group == "a" { 0.2 } else { -0.1 };
        for _ in 0..200 {
            let label = if rng.random_bool(0.4) { 1.0 } else { 0.0 };
            let noise: f64 = rng.random_range(-0.25..0.25);
            let score = (0.3 + 0.4 * label + shift + noise).clamp(0.0, 1.0);
            rows.push(EvaluationRow::new(label, score, vec![group.into()]));
        }
    }
    let dataset = Dataset::new(vec!["group".to_string()], rows)?;

    let mut policy = FairnessPolicy::new(
        vec!["group".to_string()],
        vec![
            "selection_rate".to_string(),
            "true_positive_rate".to_string(),
            "accuracy".to_string(),
            "auc".to_string(),
        ],
    );
    policy.disparity.tolerance = 0.05;
    policy.mitigation = Some(MitigationConfig {
        target_metric: "selection_rate".to_string(),
        utility_metric: "accuracy".to_string(),
        tolerance: Some(0.05),
        timeout_ms: Some(2_000),
        max_combinations: Some(250_000),
    });

    let report = EvaluationEngine::new(policy).run(&dataset)?;
    println!("{}", render_markdown(&report));
    Ok(())
}
