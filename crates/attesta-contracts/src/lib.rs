//! # attesta-contracts
//!
//! Shared types, schemas, and contracts for the ATTESTA provenance runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod generation;
pub mod proof;
pub mod schema;
pub mod session;
pub mod snapshot;
pub mod verify;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use error::AttestaError;
    use generation::ParamValue;
    use schema::{AttributeSchema, AttributeSource, AttributeSpec};
    use session::SessionId;
    use snapshot::Snapshot;
    use verify::{Discrepancy, DiscrepancyScope};

    fn sample_snapshot() -> Snapshot {
        let mut parameters = BTreeMap::new();
        parameters.insert("seed".to_string(), ParamValue::Number(42));
        parameters.insert("size".to_string(), ParamValue::Text("1x1".to_string()));
        Snapshot {
            version_index: 1,
            timestamp_utc: "2026-01-01T00:00:00+00:00".to_string(),
            prompt: "a lighthouse".to_string(),
            revised_prompt: None,
            parameters,
            model: "mock".to_string(),
            attribute_hashes: BTreeMap::new(),
            step_hash: "0".repeat(64),
            artifact_reference: "artifact-1".to_string(),
        }
    }

    // ── AttributeSchema ──────────────────────────────────────────────────────

    #[test]
    fn builtin_schemas_validate() {
        AttributeSchema::openai_images().validate().unwrap();
        AttributeSchema::flux().validate().unwrap();
        assert_eq!(AttributeSchema::openai_images().attributes.len(), 5);
        assert_eq!(AttributeSchema::flux().attributes.len(), 6);
    }

    #[test]
    fn schema_rejects_duplicate_names() {
        let mut schema = AttributeSchema::flux();
        schema
            .attributes
            .push(AttributeSpec::required("seed", AttributeSource::Parameter));

        let err = schema.validate().unwrap_err();
        assert!(matches!(err, AttestaError::Config { .. }));
        assert!(err.to_string().contains("'seed' more than once"));
    }

    #[test]
    fn schema_rejects_second_artifact_source() {
        let mut schema = AttributeSchema::openai_images();
        schema
            .attributes
            .push(AttributeSpec::required("image", AttributeSource::Artifact));

        assert!(schema.validate().is_err());
    }

    #[test]
    fn schema_rejects_reserved_parameter_name() {
        let schema = AttributeSchema {
            schema_id: "bad".to_string(),
            version: 1,
            attributes: vec![AttributeSpec::required("model", AttributeSource::Parameter)],
        };

        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("collides with a snapshot field"));
    }

    #[test]
    fn schema_required_defaults_to_true_when_deserialized() {
        let json = r#"{"schema_id":"s","version":2,"attributes":[{"name":"file","source":"artifact"}]}"#;
        let schema: AttributeSchema = serde_json::from_str(json).unwrap();
        assert!(schema.attributes[0].required);
        assert_eq!(schema.label(), "s@v2");
    }

    // ── Snapshot serialization ───────────────────────────────────────────────

    #[test]
    fn snapshot_parameters_are_flattened() {
        let value = serde_json::to_value(sample_snapshot()).unwrap();

        assert_eq!(value["seed"], serde_json::json!(42));
        assert_eq!(value["size"], serde_json::json!("1x1"));
        assert!(value.get("parameters").is_none());
        assert!(
            value.get("revised_prompt").is_none(),
            "absent revised_prompt must not be serialized"
        );
    }

    #[test]
    fn snapshot_deserializes_flattened_parameters() {
        let json = serde_json::to_string(&sample_snapshot()).unwrap();
        let decoded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.parameters.get("seed"), Some(&ParamValue::Number(42)));
        assert_eq!(decoded, sample_snapshot());
    }

    #[test]
    fn param_value_display_is_canonical() {
        assert_eq!(ParamValue::Number(1024).to_string(), "1024");
        assert_eq!(ParamValue::Text(" 1x1 ".to_string()).to_string(), " 1x1 ");
    }

    // ── SessionId ────────────────────────────────────────────────────────────

    #[test]
    fn session_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<SessionId> = (0..100).map(|_| SessionId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    // ── Discrepancy ──────────────────────────────────────────────────────────

    #[test]
    fn discrepancy_scope_serializes_with_tag() {
        let d = Discrepancy {
            scope: DiscrepancyScope::Attribute {
                version_index: 2,
                attribute: "prompt".to_string(),
            },
            expected: "a".repeat(64),
            actual: "b".repeat(64),
        };
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["scope"], "attribute");
        assert_eq!(value["version_index"], 2);
        assert_eq!(value["attribute"], "prompt");
        assert_eq!(d.scope.to_string(), "snapshot 2 attribute 'prompt'");
    }

    // ── AttestaError display messages ────────────────────────────────────────

    #[test]
    fn error_validation_display() {
        let err = AttestaError::Validation {
            reason: "applicant name is required".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("validation error"));
        assert!(msg.contains("applicant name is required"));
    }

    #[test]
    fn error_input_display_names_attribute() {
        let err = AttestaError::Input {
            attribute: "size".to_string(),
        };
        assert!(err.to_string().contains("'size'"));
    }

    #[test]
    fn error_persistence_display() {
        let err = AttestaError::Persistence {
            reason: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("persistence failed"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn error_session_not_found_display() {
        let err = AttestaError::SessionNotFound {
            session_id: "abc".to_string(),
        };
        assert!(err.to_string().contains("session 'abc' not found"));
    }
}
