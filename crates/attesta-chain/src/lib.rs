//! # attesta-chain
//!
//! SHA-256 evidentiary hash chain and session lifecycle for the ATTESTA
//! runtime.
//!
//! ## Overview
//!
//! Every generation event is hashed attribute by attribute, the attribute
//! hashes are composed into a step hash, and the session's step hashes are
//! aggregated, in order, into one final event hash.  Changing any recorded
//! attribute, or the order of events, changes the final event hash.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use attesta_chain::{InMemorySessionStore, ProofBuilder};
//! use attesta_contracts::{schema::AttributeSchema, snapshot::EventInput};
//!
//! let store = InMemorySessionStore::new();
//! let id = store.open(AttributeSchema::openai_images())?;
//! store.record(&id, EventInput::new("a lighthouse", bytes).with_param("size", "1024x1024"))?;
//! let snapshots = store.finalize(&id, "Jane Applicant")?;
//!
//! let builder = ProofBuilder::new("Example Issuer", "https://example.test/verify?hash={hash}")?;
//! let proof = builder.build(&store.schema(&id)?, snapshots, "Jane Applicant")?;
//! ```

pub mod chain;
pub mod memory;
pub mod proof;
pub mod session;

pub use chain::{
    aggregate, check_parameters, compose, hash_attribute, hash_attributes, step_digest,
    AttributeValue,
};
pub use memory::InMemorySessionStore;
pub use proof::{render_verify_url, ProofBuilder, HASH_PLACEHOLDER};
pub use session::{PreparedEvent, Session};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc, thread};

    use attesta_contracts::{
        error::AttestaError,
        generation::ParamValue,
        schema::{AttributeSchema, AttributeSource, AttributeSpec},
        session::SessionState,
        snapshot::EventInput,
    };

    use super::{
        aggregate,
        chain::{is_hex_digest, sha256_hex},
        check_parameters, compose, hash_attribute, AttributeValue, InMemorySessionStore,
        ProofBuilder, Session,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// `{timestamp, prompt, size, file}`, all required.
    fn sized_schema() -> AttributeSchema {
        AttributeSchema {
            schema_id: "sized".to_string(),
            version: 1,
            attributes: vec![
                AttributeSpec::required("timestamp", AttributeSource::Timestamp),
                AttributeSpec::required("prompt", AttributeSource::Prompt),
                AttributeSpec::required("size", AttributeSource::Parameter),
                AttributeSpec::required("file", AttributeSource::Artifact),
            ],
        }
    }

    fn sized_event(prompt: &str, timestamp: &str, artifact: &[u8]) -> EventInput {
        EventInput::new(prompt, artifact.to_vec())
            .with_timestamp(timestamp)
            .with_param("size", "1x1")
            .with_model("mock")
    }

    fn hashes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ── Attribute hasher ──────────────────────────────────────────────────────

    #[test]
    fn test_hash_attribute_known_vector() {
        assert_eq!(
            hash_attribute(&AttributeValue::Text("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_attribute_deterministic_lowercase_hex() {
        for value in [
            AttributeValue::Text("a lighthouse at dusk"),
            AttributeValue::Number(1024),
            AttributeValue::Bytes(&[0u8, 159, 146, 150]),
        ] {
            let first = hash_attribute(&value);
            assert_eq!(first, hash_attribute(&value), "hash must be stable");
            assert!(is_hex_digest(&first), "digest must be 64 lowercase hex chars: {first}");
        }
    }

    /// Numbers hash as their base-10 text; text is never trimmed.
    #[test]
    fn test_hash_attribute_canonicalization() {
        assert_eq!(
            hash_attribute(&AttributeValue::Number(42)),
            hash_attribute(&AttributeValue::Text("42"))
        );
        assert_ne!(
            hash_attribute(&AttributeValue::Text("cat")),
            hash_attribute(&AttributeValue::Text("cat "))
        );
        assert_eq!(
            hash_attribute(&AttributeValue::Bytes(b"raw")),
            hash_attribute(&AttributeValue::Text("raw"))
        );
    }

    // ── Step hash composer ────────────────────────────────────────────────────

    #[test]
    fn test_compose_key_order_invariant() {
        let schema = AttributeSchema {
            schema_id: "ab".to_string(),
            version: 1,
            attributes: vec![
                AttributeSpec::required("a", AttributeSource::Prompt),
                AttributeSpec::required("b", AttributeSource::Timestamp),
            ],
        };
        let x = "1".repeat(64);
        let y = "2".repeat(64);

        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), x.clone());
        forward.insert("b".to_string(), y.clone());
        let mut backward = BTreeMap::new();
        backward.insert("b".to_string(), y);
        backward.insert("a".to_string(), x);

        assert_eq!(
            compose(&schema, &forward).unwrap(),
            compose(&schema, &backward).unwrap()
        );
    }

    #[test]
    fn test_compose_rejects_missing_and_extra_attributes() {
        let schema = sized_schema();
        let d = "0".repeat(64);
        let d = d.as_str();

        let missing = hashes(&[("timestamp", d), ("prompt", d), ("size", d)]);
        let err = compose(&schema, &missing).unwrap_err();
        assert!(matches!(err, AttestaError::Schema { .. }));
        assert!(err.to_string().contains("'file'"), "error must name the attribute: {err}");

        let extra = hashes(&[
            ("timestamp", d),
            ("prompt", d),
            ("size", d),
            ("file", d),
            ("seed", d),
        ]);
        let err = compose(&schema, &extra).unwrap_err();
        assert!(err.to_string().contains("'seed'"), "error must name the attribute: {err}");
    }

    /// The preimage is compact JSON with `<name>_hash` keys in name order.
    #[test]
    fn test_compose_canonical_preimage() {
        let schema = sized_schema();
        let set = hashes(&[("timestamp", "t"), ("prompt", "p"), ("size", "s"), ("file", "f")]);

        let expected =
            sha256_hex(br#"{"file_hash":"f","prompt_hash":"p","size_hash":"s","timestamp_hash":"t"}"#);
        assert_eq!(compose(&schema, &set).unwrap(), expected);
    }

    // ── Event hash aggregator ─────────────────────────────────────────────────

    #[test]
    fn test_aggregate_position_sensitive() {
        let h1 = "a".repeat(64);
        let h2 = "b".repeat(64);
        assert_ne!(aggregate(&[&h1, &h2]), aggregate(&[&h2, &h1]));
    }

    #[test]
    fn test_aggregate_canonical_array() {
        let expected = sha256_hex(br#"["x","y"]"#);
        assert_eq!(aggregate(&["x", "y"]), expected);
    }

    // ── Session lifecycle ─────────────────────────────────────────────────────

    #[test]
    fn test_version_index_monotonic() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();

        for n in 0..5 {
            store
                .record(&id, sized_event(&format!("p{n}"), "T", &[n as u8 + 1]))
                .unwrap();
        }

        let indices: Vec<u64> = store
            .snapshots(&id)
            .unwrap()
            .iter()
            .map(|s| s.version_index)
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    /// Many threads recording into one session still yield `1..=N`.
    #[test]
    fn test_concurrent_record_contiguous() {
        let store = Arc::new(InMemorySessionStore::new());
        let id = store.open(sized_schema()).unwrap();

        thread::scope(|scope| {
            for worker in 0..8u8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for n in 0..10u8 {
                        store
                            .record(&id, sized_event(&format!("w{worker}-{n}"), "T", &[worker, n]))
                            .unwrap();
                    }
                });
            }
        });

        let snapshots = store.snapshots(&id).unwrap();
        assert_eq!(snapshots.len(), 80);
        for (position, snapshot) in snapshots.iter().enumerate() {
            assert_eq!(snapshot.version_index, position as u64 + 1);
        }
    }

    #[test]
    fn test_finalize_requires_snapshots() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();

        let err = store.finalize(&id, "Applicant").unwrap_err();
        assert!(matches!(err, AttestaError::Validation { .. }));
        assert_eq!(store.state(&id).unwrap(), SessionState::Open);
    }

    #[test]
    fn test_finalize_requires_applicant() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();

        let err = store.finalize(&id, "").unwrap_err();
        assert!(matches!(err, AttestaError::Validation { .. }));
        assert_eq!(store.state(&id).unwrap(), SessionState::Open);
    }

    #[test]
    fn test_finalize_succeeds_exactly_once() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();

        let snapshots = store.finalize(&id, "Applicant").unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(store.state(&id).unwrap(), SessionState::Finalized);

        assert!(store.finalize(&id, "Applicant").is_err());
        let err = store.record(&id, sized_event("B", "T2", b"b2")).unwrap_err();
        assert!(matches!(err, AttestaError::Validation { .. }));
        assert_eq!(store.snapshots(&id).unwrap().len(), 1);
    }

    /// A failed record appends nothing and leaves later indices contiguous.
    #[test]
    fn test_record_failure_is_atomic() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();

        let no_size = EventInput::new("B", b"b2".to_vec()).with_timestamp("T2");
        let err = store.record(&id, no_size).unwrap_err();
        assert!(matches!(err, AttestaError::Input { ref attribute } if attribute == "size"));

        let empty_prompt = sized_event("", "T2", b"b2");
        assert!(matches!(
            store.record(&id, empty_prompt).unwrap_err(),
            AttestaError::Validation { .. }
        ));

        let undeclared = sized_event("B", "T2", b"b2").with_param("seed", 7u64);
        assert!(matches!(
            store.record(&id, undeclared).unwrap_err(),
            AttestaError::Schema { .. }
        ));

        let no_artifact = sized_event("B", "T2", b"");
        assert!(matches!(
            store.record(&id, no_artifact).unwrap_err(),
            AttestaError::Input { ref attribute } if attribute == "file"
        ));

        let next = store.record(&id, sized_event("B", "T2", b"b2")).unwrap();
        assert_eq!(next.version_index, 2);
    }

    #[test]
    fn test_reset_returns_to_empty_open_session() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();
        store.finalize(&id, "Applicant").unwrap();

        store.reset(&id).unwrap();
        assert_eq!(store.state(&id).unwrap(), SessionState::Open);
        assert!(store.snapshots(&id).unwrap().is_empty());

        let snapshot = store.record(&id, sized_event("B", "T2", b"b2")).unwrap();
        assert_eq!(snapshot.version_index, 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = InMemorySessionStore::new();
        let first = store.open(sized_schema()).unwrap();
        let second = store.open(AttributeSchema::flux()).unwrap();

        store.record(&first, sized_event("A", "T1", b"b1")).unwrap();
        store.finalize(&first, "Applicant").unwrap();

        let flux_event = EventInput::new("B", b"b2".to_vec())
            .with_param("seed", 7u64)
            .with_param("width", 512u32)
            .with_param("height", 512u32);
        let snapshot = store.record(&second, flux_event).unwrap();
        assert_eq!(snapshot.version_index, 1);
        assert_eq!(store.state(&second).unwrap(), SessionState::Open);

        store.close(&first).unwrap();
        assert!(matches!(
            store.record(&first, sized_event("C", "T3", b"b3")).unwrap_err(),
            AttestaError::SessionNotFound { .. }
        ));
        assert_eq!(store.len(), 1);
    }

    /// An absent revised prompt falls back to the prompt and is still hashed.
    #[test]
    fn test_revised_prompt_falls_back_to_prompt() {
        let schema = Arc::new(AttributeSchema::openai_images());
        let mut session = Session::open(Arc::clone(&schema)).unwrap();

        let snapshot = session
            .record(EventInput::new("a fox", b"png".to_vec()).with_param("size", "1024x1024"))
            .unwrap();

        assert_eq!(snapshot.revised_prompt.as_deref(), Some("a fox"));
        assert_eq!(
            snapshot.attribute_hashes["revised_prompt"],
            snapshot.attribute_hashes["prompt"]
        );
        assert_eq!(snapshot.attribute_hashes.len(), 5);
    }

    /// Text is hashed exactly as authored, so whitespace-only prompts and
    /// applicants are values, not absences.
    #[test]
    fn test_whitespace_text_is_kept_verbatim() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();

        let snapshot = store.record(&id, sized_event("  ", "T1", b"b1")).unwrap();
        assert_eq!(snapshot.prompt, "  ");
        assert_eq!(snapshot.attribute_hashes["prompt"], sha256_hex(b"  "));

        let snapshots = store.finalize(&id, " ").unwrap();
        let proof = ProofBuilder::new("Issuer", "https://verify.test/{hash}")
            .unwrap()
            .build(&sized_schema(), snapshots, " ")
            .unwrap();
        assert_eq!(proof.applicant, " ");
    }

    /// Request parameters are checked against the schema; parameters the
    /// backend supplies itself may be missing.
    #[test]
    fn test_check_parameters() {
        let schema = AttributeSchema::flux();
        let seed_only: BTreeMap<String, ParamValue> =
            [("seed".to_string(), ParamValue::Number(7))].into_iter().collect();

        let err = check_parameters(&schema, &seed_only, &[]).unwrap_err();
        assert!(
            matches!(err, AttestaError::Input { ref attribute } if attribute == "width"),
            "first missing required parameter must be named: {err}"
        );
        check_parameters(&schema, &seed_only, &["width", "height"]).unwrap();

        let mut extra = seed_only.clone();
        extra.insert("size".to_string(), ParamValue::Text("1x1".to_string()));
        let err = check_parameters(&schema, &extra, &["width", "height"]).unwrap_err();
        assert!(matches!(err, AttestaError::Schema { .. }));
        assert!(err.to_string().contains("'size'"));
    }

    #[test]
    fn test_session_open_rejects_invalid_schema() {
        let schema = AttributeSchema {
            schema_id: String::new(),
            version: 1,
            attributes: vec![],
        };
        assert!(matches!(
            Session::open(Arc::new(schema)).unwrap_err(),
            AttestaError::Config { .. }
        ));
    }

    // ── End-to-end chain ──────────────────────────────────────────────────────

    /// Two events produce step hashes over `<name>_hash` objects and a final
    /// hash over the ordered step-hash array; reordering changes the result.
    #[test]
    fn test_two_event_chain_end_to_end() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();
        store.record(&id, sized_event("B", "T2", b"b2")).unwrap();
        let snapshots = store.finalize(&id, "Applicant").unwrap();

        let expected_step = |prompt: &str, ts: &str, bytes: &[u8]| {
            sha256_hex(
                format!(
                    r#"{{"file_hash":"{}","prompt_hash":"{}","size_hash":"{}","timestamp_hash":"{}"}}"#,
                    sha256_hex(bytes),
                    sha256_hex(prompt.as_bytes()),
                    sha256_hex(b"1x1"),
                    sha256_hex(ts.as_bytes()),
                )
                .as_bytes(),
            )
        };
        let step_1 = expected_step("A", "T1", b"b1");
        let step_2 = expected_step("B", "T2", b"b2");
        assert_eq!(snapshots[0].step_hash, step_1);
        assert_eq!(snapshots[1].step_hash, step_2);

        let builder = ProofBuilder::new("Issuer", "https://verify.test/?hash={hash}").unwrap();
        let proof = builder
            .build(&store.schema(&id).unwrap(), snapshots, "Applicant")
            .unwrap();

        let expected_final = sha256_hex(format!(r#"["{step_1}","{step_2}"]"#).as_bytes());
        assert_eq!(proof.final_event_hash, expected_final);
        assert_eq!(
            proof.verify_url,
            format!("https://verify.test/?hash={expected_final}")
        );

        // Same events recorded in the opposite order.
        let reordered = store.open(sized_schema()).unwrap();
        store.record(&reordered, sized_event("B", "T2", b"b2")).unwrap();
        store.record(&reordered, sized_event("A", "T1", b"b1")).unwrap();
        let snapshots = store.finalize(&reordered, "Applicant").unwrap();
        let other = builder
            .build(&store.schema(&reordered).unwrap(), snapshots, "Applicant")
            .unwrap();
        assert_ne!(other.final_event_hash, proof.final_event_hash);
    }

    // ── Proof builder ─────────────────────────────────────────────────────────

    #[test]
    fn test_builder_requires_placeholder() {
        let err = ProofBuilder::new("Issuer", "https://verify.test/").unwrap_err();
        assert!(matches!(err, AttestaError::Config { .. }));
    }

    #[test]
    fn test_builder_rejects_gapped_indices() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();
        store.record(&id, sized_event("B", "T2", b"b2")).unwrap();
        let mut snapshots = store.finalize(&id, "Applicant").unwrap();
        snapshots.remove(0);

        let builder = ProofBuilder::new("Issuer", "https://verify.test/?hash={hash}").unwrap();
        let err = builder
            .build(&sized_schema(), snapshots, "Applicant")
            .unwrap_err();
        assert!(matches!(err, AttestaError::Validation { .. }));
    }

    /// Two builds of the same snapshots differ only in report id and time.
    #[test]
    fn test_builder_deterministic_except_identity() {
        let store = InMemorySessionStore::new();
        let id = store.open(sized_schema()).unwrap();
        store.record(&id, sized_event("A", "T1", b"b1")).unwrap();
        let snapshots = store.finalize(&id, "Applicant").unwrap();

        let builder = ProofBuilder::new("Issuer", "https://verify.test/?hash={hash}").unwrap();
        let a = builder.build(&sized_schema(), snapshots.clone(), "Applicant").unwrap();
        let b = builder.build(&sized_schema(), snapshots, "Applicant").unwrap();

        assert_eq!(a.final_event_hash, b.final_event_hash);
        assert_eq!(a.snapshots, b.snapshots);
        assert_ne!(a.report_id, b.report_id);
        assert_eq!(a.report_id.get_version_num(), 4);
    }
}
