//! Core contracts and helpers for Fairgauge.
//!
//! This crate defines the canonical dataset types, the group partitioner,
//! and the undefined-aware metric value shared across evaluation crates.

pub mod error;
pub mod group;
pub mod rows;
pub mod thresholds;
pub mod validation;
pub mod value;

pub use error::{Error, Result};
pub use group::{Group, GroupKey, PartitionOptions, partition_rows};
pub use rows::{AttributeValue, Dataset, EvaluationRow};
pub use thresholds::{DEFAULT_THRESHOLD, ThresholdAssignment};
pub use validation::validate_dataset;
pub use value::MetricValue;

/// Group identifier reserved for dataset-wide results.
pub const OVERALL_GROUP_ID: &str = "overall";
