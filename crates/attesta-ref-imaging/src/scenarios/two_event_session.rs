//! Scenario 1: Two-Event Session
//!
//! The end-to-end flow of an iterative editing session: two generations are
//! previewed and recorded, the session is finalized once, and the resulting
//! proof is verified and rendered.
//!
//! Pipeline walk-through for the demo run:
//!   1. Open a session under the `openai-images` schema
//!   2. Generate twice; each artifact is stored and its snapshot hashed
//!   3. Finalize with an applicant name; the proof is built and persisted
//!   4. Verify the proof, recomputing artifact hashes from stored bytes
//!   5. Render the plain-text report

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    generation::GenerationRequest,
    proof::Proof,
    schema::AttributeSchema,
};
use attesta_verify::ProofVerifier;

use crate::mock_data::{refinement_prompts, MockImageProvider};

use super::{memory_executor, print_chain};

/// Applicant recorded on the demo proof.
pub const APPLICANT: &str = "Demo Studio Ltd.";

/// Run the session and return the finalized proof.
pub fn record_session() -> AttestaResult<Proof> {
    let (executor, _store) = memory_executor(Box::new(MockImageProvider::new()))?;
    let session = executor.open(AttributeSchema::openai_images())?;

    for prompt in refinement_prompts().iter().take(2) {
        executor.generate(
            &session,
            GenerationRequest::new(*prompt).with_param("size", "1024x1024"),
        )?;
    }

    let proof = executor.finalize(&session, APPLICANT)?;
    Ok(Proof::clone(&proof))
}

/// Run Scenario 1: Two-Event Session.
pub fn run_scenario() -> AttestaResult<()> {
    println!("=== Scenario 1: Two-Event Session ===");
    println!();

    let (executor, store) = memory_executor(Box::new(MockImageProvider::new()))?;
    let schema = AttributeSchema::openai_images();
    println!("  Schema: {}", schema.label());

    let session = executor.open(schema)?;
    println!("  Session: {}", session);
    println!();

    for prompt in refinement_prompts().iter().take(2) {
        let snapshot = executor.generate(
            &session,
            GenerationRequest::new(*prompt).with_param("size", "1024x1024"),
        )?;
        println!("  Recorded v{}: \"{}\"", snapshot.version_index, snapshot.prompt);
        if let Some(revised) = &snapshot.revised_prompt {
            println!("    revised:  \"{}\"", revised);
        }
        println!("    step:     {}", snapshot.step_hash);
    }
    println!();

    let proof = executor.finalize(&session, APPLICANT)?;
    println!("  Finalized for {} (report {})", proof.applicant, proof.report_id);
    print_chain(&proof);
    println!("  Proofs persisted: {}", store.proofs().len());
    println!();

    let report = ProofVerifier::new()
        .with_artifacts(store.artifact_loader())
        .verify(&proof)?;
    println!(
        "  Verification:      {} ({} mismatch(es), {} unchecked)",
        if report.ok { "VERIFIED" } else { "FAILED" },
        report.mismatches.len(),
        report.unchecked.len()
    );

    let document = executor.render_report(&session)?;
    let text = String::from_utf8(document).map_err(|e| AttestaError::Render {
        reason: format!("report is not UTF-8: {e}"),
    })?;
    println!("  Report:            {} lines of text", text.lines().count());
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
