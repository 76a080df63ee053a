use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::FairnessPolicy;

/// Emit the JSON Schema for `policy.json`.
pub fn policy_json_schema() -> RootSchema {
    schema_for!(FairnessPolicy)
}
