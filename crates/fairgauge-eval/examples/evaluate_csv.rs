use std::env;
use std::path::PathBuf;

use fairgauge_core::{AttributeValue, Dataset, EvaluationRow};
use fairgauge_eval::{EvaluationEngine, render_markdown};
use fairgauge_policy::FairnessPolicy;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut data_path: Option<PathBuf> = None;
    let mut policy_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => data_path = args.next().map(PathBuf::from),
            "--policy" => policy_path = args.next().map(PathBuf::from),
            _ => {
                if data_path.is_none() {
                    data_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let data_path = data_path.ok_or("missing --data path")?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&data_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let label_idx = headers
        .iter()
        .position(|h| h == "label")
        .ok_or("missing label column")?;
    let score_idx = headers
        .iter()
        .position(|h| h == "score")
        .ok_or("missing score column")?;
    let weight_idx = headers.iter().position(|h| h == "weight");

    let attribute_indices: Vec<usize> = (0..headers.len())
        .filter(|idx| *idx != label_idx && *idx != score_idx && Some(*idx) != weight_idx)
        .collect();
    let attribute_columns: Vec<String> = attribute_indices
        .iter()
        .map(|&idx| headers[idx].clone())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let label: f64 = record.get(label_idx).ok_or("missing label value")?.parse()?;
        let score: f64 = record.get(score_idx).ok_or("missing score value")?.parse()?;
        let attributes: Vec<AttributeValue> = attribute_indices
            .iter()
            .map(|&idx| AttributeValue::Text(record.get(idx).unwrap_or_default().to_string()))
            .collect();
        let mut row = EvaluationRow::new(label, score, attributes);
        if let Some(idx) = weight_idx
            && let Some(value) = record.get(idx)
            && !value.is_empty()
        {
            row = row.with_weight(value.parse()?);
        }
        rows.push(row);
    }
    let dataset = Dataset::new(attribute_columns.clone(), rows)?;

    let policy: FairnessPolicy = match policy_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => FairnessPolicy::new(
            attribute_columns,
            vec![
                "selection_rate".to_string(),
                "true_positive_rate".to_string(),
                "accuracy".to_string(),
            ],
        ),
    };

    let report = EvaluationEngine::new(policy).run(&dataset)?;
    println!("{}", report.to_json_pretty()?);
    println!();
    println!("{}", render_markdown(&report));
    Ok(())
}
