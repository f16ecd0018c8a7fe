//! Proof verifier for the ATTESTA runtime.
//!
//! `ProofVerifier` recomputes a proof's hash chain from its recorded data.
//! Verification runs in three passes:
//!
//! 1. **Attributes** — every attribute hash is recomputed from the snapshot's
//!    stored values.  The artifact hash is recomputed only when an artifact
//!    loader is registered and can supply the bytes.
//! 2. **Steps** — every step hash is recomputed from the stored attribute
//!    hash set.
//! 3. **Aggregate** — the final event hash is recomputed from the stored step
//!    hashes in snapshot order.
//!
//! All discrepancies are collected before returning.  A discrepancy is data,
//! never an error; only structurally malformed input yields
//! `AttestaError::MalformedProof`.

use tracing::{debug, info, warn};

use attesta_chain::{
    aggregate,
    chain::{hash_attribute, parameter_value, recorded_value},
    step_digest,
};
use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    proof::Proof,
    schema::AttributeSource,
    snapshot::Snapshot,
    verify::{Discrepancy, DiscrepancyScope, VerificationReport},
};

use crate::document::proof_json_schema;

/// Resolves an `artifact_reference` to the artifact's raw bytes.
///
/// Returns `None` when the bytes are not available, in which case the
/// artifact attribute is reported as unchecked rather than mismatched.
pub type ArtifactLoader = Box<dyn Fn(&str) -> Option<Vec<u8>> + Send + Sync>;

/// The ATTESTA proof verifier.
///
/// Holds no mutable state, so one verifier may check any number of proofs
/// concurrently.
#[derive(Default)]
pub struct ProofVerifier {
    artifact_loader: Option<ArtifactLoader>,
}

impl ProofVerifier {
    /// Create a verifier that does not recompute artifact hashes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader so artifact hashes are recomputed from raw bytes.
    pub fn with_artifacts(mut self, loader: ArtifactLoader) -> Self {
        self.artifact_loader = Some(loader);
        self
    }

    /// Validate a serialized proof structurally, then verify it.
    ///
    /// Returns `AttestaError::MalformedProof` listing every JSON Schema
    /// violation, or the deserialization failure.
    pub fn verify_json(&self, document: &serde_json::Value) -> AttestaResult<VerificationReport> {
        let validator = jsonschema::validator_for(&proof_json_schema()).map_err(|e| {
            AttestaError::MalformedProof {
                reason: format!("invalid proof JSON Schema: {e}"),
            }
        })?;

        let violations: Vec<String> = validator
            .iter_errors(document)
            .map(|error| format!("JSON Schema violation at {}: {}", error.instance_path, error))
            .collect();
        if !violations.is_empty() {
            warn!(violations = violations.len(), "proof document failed structural validation");
            return Err(AttestaError::MalformedProof {
                reason: violations.join("; "),
            });
        }

        let proof: Proof =
            serde_json::from_value(document.clone()).map_err(|e| AttestaError::MalformedProof {
                reason: format!("proof document does not deserialize: {e}"),
            })?;
        self.verify(&proof)
    }

    /// Verify a proof.
    ///
    /// Returns `AttestaError::MalformedProof` if the embedded schema is
    /// inconsistent, there are no snapshots, or `version_index` values are not
    /// exactly `1..=N`.
    pub fn verify(&self, proof: &Proof) -> AttestaResult<VerificationReport> {
        Self::check_structure(proof)?;

        let mut mismatches = Vec::new();
        let mut unchecked = Vec::new();

        for snapshot in &proof.snapshots {
            self.check_attributes(proof, snapshot, &mut mismatches, &mut unchecked);

            // ── Step hash ────────────────────────────────────────────────────
            let recomputed = step_digest(&snapshot.attribute_hashes);
            if recomputed != snapshot.step_hash {
                mismatches.push(Discrepancy {
                    scope: DiscrepancyScope::Step {
                        version_index: snapshot.version_index,
                    },
                    expected: recomputed,
                    actual: snapshot.step_hash.clone(),
                });
            }
        }

        // ── Aggregate ────────────────────────────────────────────────────────
        let recomputed = aggregate(&proof.step_hashes());
        if recomputed != proof.final_event_hash {
            mismatches.push(Discrepancy {
                scope: DiscrepancyScope::Aggregate,
                expected: recomputed,
                actual: proof.final_event_hash.clone(),
            });
        }

        for mismatch in &mismatches {
            warn!(
                report_id = %proof.report_id,
                scope = %mismatch.scope,
                expected = %mismatch.expected,
                actual = %mismatch.actual,
                "integrity mismatch"
            );
        }

        let report = VerificationReport::from_mismatches(mismatches, unchecked);
        info!(
            report_id = %proof.report_id,
            ok = report.ok,
            mismatches = report.mismatches.len(),
            unchecked = report.unchecked.len(),
            "proof verified"
        );
        Ok(report)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn check_structure(proof: &Proof) -> AttestaResult<()> {
        proof.schema.validate().map_err(|e| AttestaError::MalformedProof {
            reason: format!("embedded schema is invalid: {e}"),
        })?;

        if proof.snapshots.is_empty() {
            return Err(AttestaError::MalformedProof {
                reason: "proof has no snapshots".to_string(),
            });
        }

        for (position, snapshot) in proof.snapshots.iter().enumerate() {
            let expected = position as u64 + 1;
            if snapshot.version_index != expected {
                return Err(AttestaError::MalformedProof {
                    reason: format!(
                        "snapshot at position {} has version_index {}, expected {}",
                        position, snapshot.version_index, expected
                    ),
                });
            }
        }
        Ok(())
    }

    /// Compare every stored attribute hash of `snapshot` with the value
    /// recomputed from its recorded data.
    fn check_attributes(
        &self,
        proof: &Proof,
        snapshot: &Snapshot,
        mismatches: &mut Vec<Discrepancy>,
        unchecked: &mut Vec<DiscrepancyScope>,
    ) {
        let hashes_artifact = proof
            .schema
            .attributes
            .iter()
            .any(|a| a.source == AttributeSource::Artifact);
        let artifact = match &self.artifact_loader {
            Some(loader) if hashes_artifact => loader(&snapshot.artifact_reference),
            _ => None,
        };

        let scope = |attribute: &str| DiscrepancyScope::Attribute {
            version_index: snapshot.version_index,
            attribute: attribute.to_string(),
        };

        for spec in &proof.schema.attributes {
            let recomputed =
                recorded_value(spec, snapshot, artifact.as_deref()).map(|v| hash_attribute(&v));

            match (snapshot.attribute_hashes.get(&spec.name), recomputed) {
                (Some(stored), Some(recomputed)) => {
                    if *stored != recomputed {
                        mismatches.push(Discrepancy {
                            scope: scope(&spec.name),
                            expected: recomputed,
                            actual: stored.clone(),
                        });
                    }
                }
                (Some(_), None) if spec.source == AttributeSource::Artifact => {
                    debug!(
                        version_index = snapshot.version_index,
                        attribute = %spec.name,
                        "artifact bytes unavailable; attribute not recomputed"
                    );
                    unchecked.push(scope(&spec.name));
                }
                (Some(stored), None) => mismatches.push(Discrepancy {
                    scope: scope(&spec.name),
                    expected: String::new(),
                    actual: stored.clone(),
                }),
                (None, recomputed) => {
                    if spec.required || recomputed.is_some() {
                        mismatches.push(Discrepancy {
                            scope: scope(&spec.name),
                            expected: recomputed.unwrap_or_default(),
                            actual: String::new(),
                        });
                    }
                }
            }
        }

        for (name, stored) in &snapshot.attribute_hashes {
            if proof.schema.attribute(name).is_none() {
                mismatches.push(Discrepancy {
                    scope: scope(name),
                    expected: String::new(),
                    actual: stored.clone(),
                });
            }
        }

        // A parameter the schema does not declare was never hashed.
        for (name, value) in &snapshot.parameters {
            if proof.schema.parameters().all(|p| &p.name != name) {
                mismatches.push(Discrepancy {
                    scope: scope(name),
                    expected: String::new(),
                    actual: hash_attribute(&parameter_value(value)),
                });
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
