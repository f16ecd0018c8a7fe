//! Scenario 4: Failure Recovery
//!
//! Failures outside the hash chain never corrupt it.
//!
//!   1. A provider that times out leaves the session untouched; the next
//!      successful event still becomes v1.
//!   2. A proof store that rejects the write does not lose the proof: it stays
//!      retrievable as the session's latest proof and is persisted on retry.
//!   3. Resetting the session discards its snapshots and proof, and the next
//!      event starts again at v1.

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    generation::GenerationRequest,
    schema::AttributeSchema,
};

use crate::mock_data::{MockImageProvider, UnavailableProvider};

use super::memory_executor;

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest::new(prompt).with_param("size", "512x512")
}

/// Run Scenario 4: Failure Recovery.
pub fn run_scenario() -> AttestaResult<()> {
    println!("=== Scenario 4: Failure Recovery ===");
    println!();

    // ── 4a: provider failure ──────────────────────────────────────────────────

    let (failing, _) = memory_executor(Box::new(UnavailableProvider))?;
    let session = failing.open(AttributeSchema::openai_images())?;
    match failing.generate(&session, request("a paper crane")) {
        Err(e) => println!("  4a. Provider failed:        {}", e),
        Ok(_) => println!("  4a. Provider unexpectedly succeeded"),
    }
    println!(
        "      Snapshots recorded:     {}",
        failing.sessions().snapshots(&session)?.len()
    );
    println!();

    // ── 4b: proof persistence failure ─────────────────────────────────────────

    let (executor, store) = memory_executor(Box::new(MockImageProvider::new()))?;
    let session = executor.open(AttributeSchema::openai_images())?;
    executor.generate(&session, request("a paper crane"))?;

    store.reject_proofs(true);
    match executor.finalize(&session, "Origami Co.") {
        Err(AttestaError::Persistence { reason }) => {
            println!("  4b. Proof write failed:     {}", reason)
        }
        Err(e) => return Err(e),
        Ok(_) => println!("  4b. Proof write unexpectedly succeeded"),
    }
    let retained = executor
        .latest_proof(&session)
        .ok_or_else(|| AttestaError::Validation {
            reason: "proof was lost after a failed write".to_string(),
        })?;
    println!("      Latest proof retained:  {}", retained.report_id);

    store.reject_proofs(false);
    let reference = executor.persist_latest(&session)?;
    println!("      Retried write:          {}", reference);
    println!();

    // ── 4c: reset ─────────────────────────────────────────────────────────────

    executor.reset(&session)?;
    let snapshot = executor.generate(&session, request("a paper crane, folded from gold foil"))?;
    println!(
        "  4c. After reset:            v{} recorded, latest proof {}",
        snapshot.version_index,
        if executor.latest_proof(&session).is_some() { "present" } else { "cleared" }
    );
    println!();
    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}
