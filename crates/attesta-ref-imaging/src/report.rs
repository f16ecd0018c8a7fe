//! Plain-text report renderer.
//!
//! Lays a proof out in three parts: a cover with issuer, applicant and report
//! id; one detail block per snapshot in stored order, listing every recorded
//! value next to its hash; and a conclusion carrying the final event hash and
//! the verification URL.

use std::fmt::Write;

use attesta_chain::chain::sha256_hex;
use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    proof::Proof,
};
use attesta_core::traits::ReportRenderer;

const RULE: &str = "------------------------------------------------------------------------";

/// Renders proofs as UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, proof: &Proof, artifacts: &[Vec<u8>]) -> AttestaResult<Vec<u8>> {
        if artifacts.len() != proof.snapshots.len() {
            return Err(AttestaError::Render {
                reason: format!(
                    "{} artifacts supplied for {} snapshots",
                    artifacts.len(),
                    proof.snapshots.len()
                ),
            });
        }
        let text = render_text(proof, artifacts).map_err(|e| AttestaError::Render {
            reason: format!("failed to format report: {e}"),
        })?;
        Ok(text.into_bytes())
    }

    fn extension(&self) -> &str {
        "txt"
    }
}

fn render_text(proof: &Proof, artifacts: &[Vec<u8>]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    // ── Cover ────────────────────────────────────────────────────────────────
    writeln!(out, "GENERATION PROVENANCE REPORT")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Issuer:      {}", proof.issuer)?;
    writeln!(out, "Applicant:   {}", proof.applicant)?;
    writeln!(out, "Report ID:   {}", proof.report_id)?;
    writeln!(out, "Issued at:   {}", proof.issued_at.to_rfc3339())?;
    writeln!(out, "Schema:      {}", proof.schema.label())?;
    writeln!(out, "Events:      {}", proof.snapshots.len())?;
    writeln!(out)?;

    // ── Details ──────────────────────────────────────────────────────────────
    for (snapshot, artifact) in proof.snapshots.iter().zip(artifacts) {
        writeln!(out, "Version {}", snapshot.version_index)?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "  Timestamp (UTC):  {}", snapshot.timestamp_utc)?;
        writeln!(out, "  Model:            {}", snapshot.model)?;
        writeln!(out, "  Prompt:           {}", snapshot.prompt)?;
        if let Some(revised) = &snapshot.revised_prompt {
            writeln!(out, "  Revised prompt:   {revised}")?;
        }
        for (name, value) in &snapshot.parameters {
            writeln!(out, "  {:<17} {}", format!("{name}:"), value)?;
        }
        writeln!(
            out,
            "  Artifact:         {} ({} bytes, sha256 {})",
            snapshot.artifact_reference,
            artifact.len(),
            sha256_hex(artifact)
        )?;
        writeln!(out, "  Attribute hashes:")?;
        for (name, digest) in &snapshot.attribute_hashes {
            writeln!(out, "    {name:<16} {digest}")?;
        }
        writeln!(out, "  Step hash:        {}", snapshot.step_hash)?;
        writeln!(out)?;
    }

    // ── Conclusion ───────────────────────────────────────────────────────────
    writeln!(out, "Conclusion")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Final event hash:  {}", proof.final_event_hash)?;
    writeln!(out, "Verify at:         {}", proof.verify_url)?;
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use attesta_chain::{InMemorySessionStore, ProofBuilder};
    use attesta_contracts::{schema::AttributeSchema, snapshot::EventInput};

    use super::*;

    fn two_event_proof() -> (Proof, Vec<Vec<u8>>) {
        let sessions = InMemorySessionStore::new();
        let id = sessions.open(AttributeSchema::openai_images()).unwrap();
        let artifacts = vec![b"first".to_vec(), b"second".to_vec()];
        for (prompt, bytes) in ["a fox", "a fox at night"].iter().zip(&artifacts) {
            sessions
                .record(
                    &id,
                    EventInput::new(*prompt, bytes.clone())
                        .with_param("size", "1024x1024")
                        .with_model("mock"),
                )
                .unwrap();
        }
        let snapshots = sessions.finalize(&id, "Applicant").unwrap();
        let proof = ProofBuilder::new("Example Labs", "https://verify.test/?hash={hash}")
            .unwrap()
            .build(&AttributeSchema::openai_images(), snapshots, "Applicant")
            .unwrap();
        (proof, artifacts)
    }

    /// The final hash and verify URL appear verbatim; snapshots appear in
    /// stored order.
    #[test]
    fn test_report_embeds_hash_and_url() {
        let (proof, artifacts) = two_event_proof();
        let text = String::from_utf8(TextReportRenderer.render(&proof, &artifacts).unwrap()).unwrap();

        assert!(text.contains(&proof.final_event_hash));
        assert!(text.contains(&proof.verify_url));
        assert!(text.contains("Applicant:   Applicant"));

        let first = text.find("Version 1").expect("version 1 rendered");
        let second = text.find("Version 2").expect("version 2 rendered");
        assert!(first < second, "snapshots must render in stored order");
        assert!(text.contains(&proof.snapshots[1].step_hash));
    }

    #[test]
    fn test_report_rejects_artifact_count_mismatch() {
        let (proof, mut artifacts) = two_event_proof();
        artifacts.pop();

        let err = TextReportRenderer.render(&proof, &artifacts).unwrap_err();
        assert!(matches!(err, AttestaError::Render { .. }));
    }
}
