//! Scenario 3: Concurrent Sessions
//!
//! Several users edit at once.  Each thread drives its own session through
//! one shared executor while a second batch of threads records into a single
//! shared session.  Every session ends with contiguous version indices and a
//! proof that verifies.

use std::{sync::Arc, thread};

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    generation::GenerationRequest,
    proof::Proof,
    schema::AttributeSchema,
};
use attesta_core::{traits::ProofStore, Executor};
use attesta_verify::ProofVerifier;

use crate::mock_data::MockFluxProvider;

use super::memory_executor;

/// Independent sessions driven in parallel.
pub const SESSIONS: usize = 4;

/// Events recorded per thread.
pub const EVENTS_PER_THREAD: usize = 3;

fn join_error(_: Box<dyn std::any::Any + Send>) -> AttestaError {
    AttestaError::Validation {
        reason: "session worker thread panicked".to_string(),
    }
}

/// Drive `SESSIONS` sessions in parallel, one thread each.
pub fn run_independent(executor: &Executor) -> AttestaResult<Vec<Arc<Proof>>> {
    thread::scope(|s| {
        let workers: Vec<_> = (0..SESSIONS)
            .map(|user| {
                s.spawn(move || -> AttestaResult<Arc<Proof>> {
                    let session = executor.open(AttributeSchema::flux())?;
                    for step in 0..EVENTS_PER_THREAD {
                        let request = GenerationRequest::new(format!(
                            "user {user} draft {step}: a koi pond in autumn"
                        ))
                        .with_param("width", 768u64);
                        executor.generate(&session, request)?;
                    }
                    executor.finalize(&session, &format!("User {user}"))
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|w| w.join().map_err(join_error).and_then(|result| result))
            .collect()
    })
}

/// Record from `SESSIONS` threads into one shared session.
pub fn run_shared(executor: &Executor) -> AttestaResult<Arc<Proof>> {
    let session = executor.open(AttributeSchema::flux())?;

    thread::scope(|s| {
        let workers: Vec<_> = (0..SESSIONS)
            .map(|user| {
                let session = &session;
                s.spawn(move || -> AttestaResult<()> {
                    for step in 0..EVENTS_PER_THREAD {
                        let request = GenerationRequest::new(format!("shared board, user {user} tile {step}"))
                            .with_param("seed", (user * 100 + step) as u64);
                        executor.generate(session, request)?;
                    }
                    Ok(())
                })
            })
            .collect();

        workers
            .into_iter()
            .try_for_each(|w| w.join().map_err(join_error).and_then(|result| result))
    })?;

    executor.finalize(&session, "Shared Board")
}

/// Run Scenario 3: Concurrent Sessions.
pub fn run_scenario() -> AttestaResult<()> {
    println!("=== Scenario 3: Concurrent Sessions ===");
    println!();

    let (executor, store) = memory_executor(Box::new(MockFluxProvider::new()))?;
    let verifier = ProofVerifier::new()
        .with_artifacts(Box::new(move |reference| store.load_artifact(reference).ok()));

    println!("  {} sessions x {} events, one thread per session", SESSIONS, EVENTS_PER_THREAD);
    for proof in run_independent(&executor)? {
        let report = verifier.verify(&proof)?;
        println!(
            "    {:<8} v1..v{}  {}  {}",
            proof.applicant,
            proof.snapshots.len(),
            &proof.final_event_hash[..16],
            if report.ok { "VERIFIED" } else { "FAILED" }
        );
    }
    println!();

    println!("  1 session, {} threads x {} events", SESSIONS, EVENTS_PER_THREAD);
    let proof = run_shared(&executor)?;
    let report = verifier.verify(&proof)?;
    println!(
        "    {:<12} v1..v{}  {}  {}",
        proof.applicant,
        proof.snapshots.len(),
        &proof.final_event_hash[..16],
        if report.ok { "VERIFIED" } else { "FAILED" }
    );
    println!();
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(proof: &Proof) {
        for (position, snapshot) in proof.snapshots.iter().enumerate() {
            assert_eq!(
                snapshot.version_index,
                position as u64 + 1,
                "version indices must be contiguous in {}",
                proof.applicant
            );
        }
    }

    #[test]
    fn test_independent_sessions_do_not_interleave() {
        let (executor, _store) = memory_executor(Box::new(MockFluxProvider::new())).unwrap();
        let proofs = run_independent(&executor).unwrap();

        assert_eq!(proofs.len(), SESSIONS);
        for proof in &proofs {
            assert_eq!(proof.snapshots.len(), EVENTS_PER_THREAD);
            assert_contiguous(proof);
            let owner = proof.applicant.trim_start_matches("User ");
            assert!(
                proof
                    .snapshots
                    .iter()
                    .all(|s| s.prompt.starts_with(&format!("user {owner} "))),
                "session of {} holds another user's event",
                proof.applicant
            );
        }
    }

    #[test]
    fn test_shared_session_is_contiguous_and_verifies() {
        let (executor, store) = memory_executor(Box::new(MockFluxProvider::new())).unwrap();
        let proof = run_shared(&executor).unwrap();

        assert_eq!(proof.snapshots.len(), SESSIONS * EVENTS_PER_THREAD);
        assert_contiguous(&proof);

        let report = ProofVerifier::new()
            .with_artifacts(store.artifact_loader())
            .verify(&proof)
            .unwrap();
        assert!(report.ok, "mismatches: {:?}", report.mismatches);
        assert!(report.unchecked.is_empty());
    }

    #[test]
    fn test_run_scenario() {
        run_scenario().unwrap();
    }
}
