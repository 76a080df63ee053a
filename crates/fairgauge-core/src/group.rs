use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rows::{AttributeValue, Dataset};

/// Options for the group partitioner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PartitionOptions {
    /// Maximum number of distinct attribute combinations before failing.
    pub max_cardinality: usize,
    /// Groups smaller than this are flagged low-confidence, not suppressed.
    pub min_group_size: usize,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            max_cardinality: 100,
            min_group_size: 30,
        }
    }
}

/// Unique combination of sensitive-attribute values identifying a group.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct GroupKey {
    pub values: Vec<AttributeValue>,
}

impl GroupKey {
    /// Stable string identifier; multi-attribute keys join values with `|`.
    pub fn id(&self) -> String {
        self.values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A disjoint subset of the dataset sharing one attribute combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Group {
    pub key: GroupKey,
    /// Ordered indices into the dataset's row vector.
    pub row_indices: Vec<usize>,
    /// Set when the group is smaller than the configured minimum.
    pub low_confidence: bool,
}

impl Group {
    pub fn sample_size(&self) -> u64 {
        self.row_indices.len() as u64
    }
}

/// Partition dataset rows by one or more sensitive-attribute columns.
///
/// Pure function of the input: groups come back sorted by key, cover every
/// row exactly once, and never overlap. Fails with `InvalidAttribute` when a
/// column is unknown or the distinct-combination count exceeds
/// `max_cardinality`; no partial output is produced.
pub fn partition_rows(
    dataset: &Dataset,
    columns: &[String],
    options: &PartitionOptions,
) -> Result<Vec<Group>> {
    if columns.is_empty() {
        return Err(Error::InvalidAttribute(
            "at least one grouping column is required".to_string(),
        ));
    }

    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = dataset.column_index(column).ok_or_else(|| {
            Error::InvalidAttribute(format!("unknown attribute column '{column}'"))
        })?;
        indices.push(idx);
    }

    let mut members: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        let key = GroupKey {
            values: indices
                .iter()
                .map(|&idx| row.attributes[idx].clone())
                .collect(),
        };
        if !members.contains_key(&key) && members.len() == options.max_cardinality {
            return Err(Error::InvalidAttribute(format!(
                "attribute combination cardinality exceeds {} for columns [{}]",
                options.max_cardinality,
                columns.join(", ")
            )));
        }
        members.entry(key).or_default().push(row_idx);
    }

    Ok(members
        .into_iter()
        .map(|(key, row_indices)| {
            let low_confidence = row_indices.len() < options.min_group_size;
            Group {
                key,
                row_indices,
                low_confidence,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::EvaluationRow;

    fn dataset(attributes: Vec<(&str, &str)>) -> Dataset {
        let rows = attributes
            .into_iter()
            .map(|(sex, region)| EvaluationRow::new(1.0, 0.5, vec![sex.into(), region.into()]))
            .collect();
        Dataset::new(vec!["sex".to_string(), "region".to_string()], rows).expect("dataset")
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let dataset = dataset(vec![
            ("f", "eu"),
            ("m", "eu"),
            ("f", "us"),
            ("m", "eu"),
            ("f", "eu"),
        ]);
        let groups = partition_rows(
            &dataset,
            &["sex".to_string()],
            &PartitionOptions::default(),
        )
        .expect("partition");

        let mut seen: Vec<usize> = groups
            .iter()
            .flat_map(|group| group.row_indices.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.id(), "f");
        assert_eq!(groups[1].key.id(), "m");
    }

    #[test]
    fn multi_column_keys_join_with_pipe() {
        let dataset = dataset(vec![("f", "eu"), ("f", "us")]);
        let groups = partition_rows(
            &dataset,
            &["sex".to_string(), "region".to_string()],
            &PartitionOptions::default(),
        )
        .expect("partition");
        assert_eq!(groups[0].key.id(), "f|eu");
        assert_eq!(groups[1].key.id(), "f|us");
    }

    #[test]
    fn unknown_column_fails() {
        let dataset = dataset(vec![("f", "eu")]);
        let err = partition_rows(
            &dataset,
            &["age".to_string()],
            &PartitionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute(_)));
    }

    #[test]
    fn cardinality_cap_fails_fast() {
        let rows = (0..5)
            .map(|idx| EvaluationRow::new(0.0, 0.1, vec![AttributeValue::Int(idx)]))
            .collect();
        let dataset = Dataset::new(vec!["bucket".to_string()], rows).expect("dataset");
        let options = PartitionOptions {
            max_cardinality: 3,
            ..PartitionOptions::default()
        };
        let err = partition_rows(&dataset, &["bucket".to_string()], &options).unwrap_err();
        assert!(err.to_string().contains("cardinality"));
    }

    #[test]
    fn small_groups_are_flagged_low_confidence() {
        let dataset = dataset(vec![("f", "eu"), ("f", "eu"), ("m", "eu")]);
        let options = PartitionOptions {
            min_group_size: 2,
            ..PartitionOptions::default()
        };
        let groups =
            partition_rows(&dataset, &["sex".to_string()], &options).expect("partition");
        assert!(!groups[0].low_confidence);
        assert!(groups[1].low_confidence);
    }
}
