use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Value of a sensitive attribute.
///
/// Attribute domains must be finite and hashable; continuous attributes are
/// expected to be binned by the caller before evaluation. The ordering is
/// total so group enumeration stays deterministic.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Int(value) => write!(f, "{value}"),
            AttributeValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// One scored subject: true label, predicted score, sample weight, and the
/// sensitive-attribute values aligned with `Dataset::attribute_columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationRow {
    /// True label; must be exactly 0.0 or 1.0.
    pub label: f64,
    /// Predicted score in [0, 1].
    pub score: f64,
    /// Sample weight; finite and positive.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Attribute values, one per dataset attribute column.
    pub attributes: Vec<AttributeValue>,
}

fn default_weight() -> f64 {
    1.0
}

impl EvaluationRow {
    pub fn new(label: f64, score: f64, attributes: Vec<AttributeValue>) -> Self {
        Self {
            label,
            score,
            weight: 1.0,
            attributes,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_positive_label(&self) -> bool {
        self.label == 1.0
    }
}

/// Immutable evaluation input: attribute column names plus scored rows.
///
/// The core accepts this as an opaque row sequence; loading predictions into
/// it is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    /// Names of the sensitive-attribute columns.
    pub attribute_columns: Vec<String>,
    /// Scored rows, one per subject.
    pub rows: Vec<EvaluationRow>,
}

impl Dataset {
    /// Build a dataset, checking that every row carries one attribute value
    /// per declared column.
    pub fn new(attribute_columns: Vec<String>, rows: Vec<EvaluationRow>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.attributes.len() != attribute_columns.len() {
                return Err(Error::InvalidDataset(format!(
                    "row {} has {} attribute value(s), expected {}",
                    idx,
                    row.attributes.len(),
                    attribute_columns.len()
                )));
            }
        }
        Ok(Self {
            attribute_columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.attribute_columns
            .iter()
            .position(|column| column == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_rejects_arity_mismatch() {
        let rows = vec![EvaluationRow::new(1.0, 0.9, vec!["a".into(), "b".into()])];
        let err = Dataset::new(vec!["sex".to_string()], rows).unwrap_err();
        assert!(err.to_string().contains("attribute value(s)"));
    }

    #[test]
    fn attribute_values_order_deterministically() {
        let mut values = vec![
            AttributeValue::Text("b".to_string()),
            AttributeValue::Int(2),
            AttributeValue::Text("a".to_string()),
            AttributeValue::Bool(true),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                AttributeValue::Bool(true),
                AttributeValue::Int(2),
                AttributeValue::Text("a".to_string()),
                AttributeValue::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn row_weight_defaults_to_one() {
        let row: EvaluationRow =
            serde_json::from_str(r#"{"label":1.0,"score":0.5,"attributes":["x"]}"#)
                .expect("deserialize");
        assert_eq!(row.weight, 1.0);
    }
}
