//! Fairness policy contracts and validation.
//!
//! A policy is the single configuration document for an evaluation: which
//! attributes to group by, which metrics to compute, how disparities are
//! judged, and whether threshold mitigation runs.

pub mod errors;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PolicyError, ValidationIssue, ValidationReport};
pub use model::{
    ComparisonKind, DisparityConfig, DisparityMode, FairnessPolicy, MitigationConfig,
    POLICY_VERSION,
};
pub use schema::policy_json_schema;
pub use validate::{
    ValidatedPolicy, validate_policy, validate_policy_against_dataset, validate_policy_json,
    validate_policy_semantics,
};
