//! Key and value encoding for policy types in the shared namespace
//!
//! Layout of the A1 namespace:
//!
//! ```text
//! a1.policy_type.<type_id>                            -> PolicyTypeSchema (JSON)
//! a1.policy_instance.<type_id>.<instance_id>          -> instance body
//! a1.policy_inst_metadata.<type_id>.<instance_id>     -> instance metadata
//! a1.policy_handler.<type_id>.<instance_id>.<handler> -> handler status
//! ```
//!
//! Only the first family is written by this service.

use crate::models::{PolicyTypeId, PolicyTypeSchema};

pub const TYPE_PREFIX: &str = "a1.policy_type.";
pub const INSTANCE_PREFIX: &str = "a1.policy_instance.";

/// Storage key of a policy type
pub fn type_key(id: PolicyTypeId) -> String {
    format!("{}{}", TYPE_PREFIX, id)
}

/// Extract the policy type id from a key, or `None` for any other key family
pub fn decode_type_id(key: &str) -> Option<PolicyTypeId> {
    key.trim()
        .strip_prefix(TYPE_PREFIX)
        .and_then(|rest| rest.parse::<i64>().ok())
        .map(PolicyTypeId)
}

/// Common prefix of every instance key belonging to a policy type
pub fn instance_prefix(id: PolicyTypeId) -> String {
    format!("{}{}.", INSTANCE_PREFIX, id)
}

/// Serialize a policy type for storage
pub fn encode_stored_value(schema: &PolicyTypeSchema) -> Result<String, serde_json::Error> {
    serde_json::to_string(schema)
}

/// Parse a stored policy type
///
/// Values written by older writers may hold the document as a quoted JSON
/// string; one level of quoting is removed before parsing. An empty or `null`
/// value is an absent entry and yields `None`.
pub fn decode_stored_value(raw: &str) -> Result<Option<PolicyTypeSchema>, serde_json::Error> {
    let raw = raw.trim();
    let unquoted: String;
    let doc = if raw.starts_with('"') {
        unquoted = serde_json::from_str(raw)?;
        unquoted.trim()
    } else {
        raw
    };

    if doc.is_empty() || doc == "null" {
        return Ok(None);
    }
    serde_json::from_str(doc).map(Some)
}
