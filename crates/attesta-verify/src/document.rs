//! Structural JSON Schema for serialized proofs.
//!
//! Checked before a proof document is deserialized, so a malformed upload is
//! reported with every missing or mistyped field at once.

use serde_json::{json, Value};

/// The JSON Schema a serialized `Proof` must satisfy.
pub fn proof_json_schema() -> Value {
    json!({
        "type": "object",
        "required": [
            "report_id", "issuer", "applicant", "issued_at",
            "final_event_hash", "verify_url", "schema", "snapshots"
        ],
        "properties": {
            "report_id": { "type": "string" },
            "issuer": { "type": "string" },
            "applicant": { "type": "string" },
            "issued_at": { "type": "string" },
            "final_event_hash": { "type": "string" },
            "verify_url": { "type": "string" },
            "schema": {
                "type": "object",
                "required": ["schema_id", "version", "attributes"],
                "properties": {
                    "schema_id": { "type": "string" },
                    "version": { "type": "integer", "minimum": 0 },
                    "attributes": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["name", "source"],
                            "properties": {
                                "name": { "type": "string" },
                                "source": {
                                    "enum": ["timestamp", "prompt", "revised_prompt", "parameter", "artifact"]
                                },
                                "required": { "type": "boolean" }
                            }
                        }
                    }
                }
            },
            "snapshots": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": [
                        "version_index", "timestamp_utc", "prompt", "model",
                        "attribute_hashes", "step_hash", "artifact_reference"
                    ],
                    "properties": {
                        "version_index": { "type": "integer", "minimum": 1 },
                        "timestamp_utc": { "type": "string" },
                        "prompt": { "type": "string" },
                        "revised_prompt": { "type": "string" },
                        "model": { "type": "string" },
                        "attribute_hashes": {
                            "type": "object",
                            "additionalProperties": { "type": "string" }
                        },
                        "step_hash": { "type": "string" },
                        "artifact_reference": { "type": "string" }
                    }
                }
            }
        }
    })
}
