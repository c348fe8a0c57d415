//! Policy type model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Externally assigned policy type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTypeId(pub i64);

impl fmt::Display for PolicyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Policy type document as submitted by the client and stored verbatim
///
/// `create_schema` is a JSON Schema describing instances of this type. It is
/// kept as an opaque value and never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTypeSchema {
    pub policy_type_id: PolicyTypeId,
    pub name: String,
    pub description: String,
    pub create_schema: serde_json::Value,
}

/// Status summary returned by `GET /policytypes/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTypeStatus {
    pub policy_type_id: PolicyTypeId,
    pub num_instances: usize,
}
