use crate::error::{Error, Result};
use crate::rows::Dataset;

/// Validate internal consistency of an evaluation dataset.
///
/// This checks:
/// - attribute arity per row matches the declared columns
/// - labels are exactly 0.0 or 1.0
/// - scores lie in [0, 1]
/// - weights are finite and positive
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    let arity = dataset.attribute_columns.len();

    for (idx, row) in dataset.rows.iter().enumerate() {
        if row.attributes.len() != arity {
            return Err(Error::InvalidDataset(format!(
                "row {} has {} attribute value(s), expected {}",
                idx,
                row.attributes.len(),
                arity
            )));
        }

        if row.label != 0.0 && row.label != 1.0 {
            return Err(Error::InvalidDataset(format!(
                "row {} has non-binary label {}",
                idx, row.label
            )));
        }

        if !row.score.is_finite() || !(0.0..=1.0).contains(&row.score) {
            return Err(Error::InvalidDataset(format!(
                "row {} has score {} outside [0, 1]",
                idx, row.score
            )));
        }

        if !row.weight.is_finite() || row.weight <= 0.0 {
            return Err(Error::InvalidDataset(format!(
                "row {} has non-positive weight {}",
                idx, row.weight
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::EvaluationRow;

    fn dataset_with(row: EvaluationRow) -> Dataset {
        Dataset {
            attribute_columns: vec!["sex".to_string()],
            rows: vec![row],
        }
    }

    #[test]
    fn valid_dataset_passes() {
        let dataset = dataset_with(EvaluationRow::new(1.0, 0.5, vec!["f".into()]));
        assert!(validate_dataset(&dataset).is_ok());
    }

    #[test]
    fn non_binary_label_fails() {
        let dataset = dataset_with(EvaluationRow::new(0.3, 0.5, vec!["f".into()]));
        let err = validate_dataset(&dataset).unwrap_err();
        assert!(err.to_string().contains("non-binary label"));
    }

    #[test]
    fn out_of_range_score_fails() {
        let dataset = dataset_with(EvaluationRow::new(1.0, 1.5, vec!["f".into()]));
        let err = validate_dataset(&dataset).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn non_positive_weight_fails() {
        let dataset =
            dataset_with(EvaluationRow::new(1.0, 0.5, vec!["f".into()]).with_weight(0.0));
        let err = validate_dataset(&dataset).unwrap_err();
        assert!(err.to_string().contains("non-positive weight"));
    }
}
