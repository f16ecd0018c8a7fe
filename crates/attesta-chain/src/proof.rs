//! Proof document builder.
//!
//! Turns a finalized, ordered snapshot list into a `Proof`: aggregates the
//! step hashes into the final event hash, mints a report id and issue time,
//! and renders the verification URL.  Building has no side effects;
//! persisting the result is the caller's concern.

use chrono::Utc;
use tracing::info;

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    proof::Proof,
    schema::AttributeSchema,
    snapshot::Snapshot,
};

use crate::chain::aggregate;

/// Placeholder substituted with the final event hash in a verify URL template.
pub const HASH_PLACEHOLDER: &str = "{hash}";

/// Substitute `final_event_hash` into `template`.
pub fn render_verify_url(template: &str, final_event_hash: &str) -> String {
    template.replace(HASH_PLACEHOLDER, final_event_hash)
}

/// Builds proofs for one issuer and verification endpoint.
#[derive(Debug, Clone)]
pub struct ProofBuilder {
    issuer: String,
    verify_url_template: String,
}

impl ProofBuilder {
    /// Returns `AttestaError::Config` if the issuer is empty or the template
    /// lacks the `{hash}` placeholder.
    pub fn new(issuer: impl Into<String>, verify_url_template: impl Into<String>) -> AttestaResult<Self> {
        let issuer = issuer.into();
        let verify_url_template = verify_url_template.into();

        if issuer.trim().is_empty() {
            return Err(AttestaError::Config {
                reason: "issuer must not be empty".to_string(),
            });
        }
        if !verify_url_template.contains(HASH_PLACEHOLDER) {
            return Err(AttestaError::Config {
                reason: format!(
                    "verify URL template '{}' has no {} placeholder",
                    verify_url_template, HASH_PLACEHOLDER
                ),
            });
        }

        Ok(Self {
            issuer,
            verify_url_template,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Assemble a proof from finalized snapshots.
    ///
    /// The result is deterministic for a given snapshot list except for
    /// `report_id` and `issued_at`.
    ///
    /// Returns `AttestaError::Validation` when `applicant` is empty, the list
    /// is empty, or `version_index` values are not exactly `1..=N`.
    pub fn build(
        &self,
        schema: &AttributeSchema,
        snapshots: Vec<Snapshot>,
        applicant: &str,
    ) -> AttestaResult<Proof> {
        if applicant.is_empty() {
            return Err(AttestaError::Validation {
                reason: "applicant name is required".to_string(),
            });
        }
        if snapshots.is_empty() {
            return Err(AttestaError::Validation {
                reason: "cannot build a proof without snapshots".to_string(),
            });
        }
        for (position, snapshot) in snapshots.iter().enumerate() {
            let expected = position as u64 + 1;
            if snapshot.version_index != expected {
                return Err(AttestaError::Validation {
                    reason: format!(
                        "snapshot at position {} has version_index {}, expected {}",
                        position, snapshot.version_index, expected
                    ),
                });
            }
        }

        let step_hashes: Vec<&str> = snapshots.iter().map(|s| s.step_hash.as_str()).collect();
        let final_event_hash = aggregate(&step_hashes);
        let verify_url = render_verify_url(&self.verify_url_template, &final_event_hash);

        let proof = Proof {
            report_id: uuid::Uuid::new_v4(),
            issuer: self.issuer.clone(),
            applicant: applicant.to_string(),
            issued_at: Utc::now(),
            final_event_hash,
            verify_url,
            schema: schema.clone(),
            snapshots,
        };

        info!(
            report_id = %proof.report_id,
            snapshot_count = proof.snapshots.len(),
            final_event_hash = %proof.final_event_hash,
            "proof built"
        );
        Ok(proof)
    }
}
