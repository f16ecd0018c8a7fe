//! Imaging reference runtime demo scenarios.
//!
//! Each scenario is a self-contained module that wires real ATTESTA
//! components (session store, executor, proof builder, verifier) to the mock
//! providers and stores, and demonstrates one property of the hash chain.

pub mod concurrent_sessions;
pub mod failure_recovery;
pub mod tamper_detection;
pub mod two_event_session;

use std::sync::Arc;

use attesta_config::AttestaConfig;
use attesta_contracts::{error::AttestaResult, proof::Proof};
use attesta_core::{traits::GenerationProvider, Executor};

use crate::{report::TextReportRenderer, store::MemoryProofStore};

/// Build an executor around `provider` with an inspectable in-memory store
/// and the default configuration.
pub(crate) fn memory_executor(
    provider: Box<dyn GenerationProvider>,
) -> AttestaResult<(Executor, Arc<MemoryProofStore>)> {
    let store = Arc::new(MemoryProofStore::new());
    let builder = AttestaConfig::default().proof_builder()?;
    let executor = Executor::new(
        provider,
        Box::new(Arc::clone(&store)),
        Box::new(TextReportRenderer::new()),
        builder,
    );
    Ok((executor, store))
}

/// Print the hashes of every snapshot of `proof`.
pub(crate) fn print_chain(proof: &Proof) {
    for snapshot in &proof.snapshots {
        println!(
            "  v{}  step {}  ({} attributes)",
            snapshot.version_index,
            snapshot.step_hash,
            snapshot.attribute_hashes.len()
        );
    }
    println!("  final event hash:  {}", proof.final_event_hash);
    println!("  verify URL:        {}", proof.verify_url);
}
