//! Declarative description of the event envelope.
//!
//! This is a JSON Schema document for tooling, documentation and code
//! generation in other languages. The validator does not read it; the two are
//! kept in agreement by tests.

use std::sync::OnceLock;

use serde_json::{json, Value};

/// Fields every event must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["id", "type", "metadata"];

/// Fields every event's metadata must carry.
pub const REQUIRED_METADATA_FIELDS: [&str; 2] = ["cid", "pid"];

/// The envelope schema.
pub fn super_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "type": { "type": "string" },
                "metadata": {
                    "type": "object",
                    "properties": {
                        "cid": { "type": "string", "format": "uuid" },
                        "tid": { "type": "string", "format": "uuid" },
                        "pid": { "type": "string", "format": "uuid" },
                        "uid": { "type": "string", "format": "uuid" },
                        "token": { "type": "string" }
                    },
                    "required": REQUIRED_METADATA_FIELDS
                },
                "data": { "type": "object" }
            },
            "required": REQUIRED_FIELDS
        })
    })
}
