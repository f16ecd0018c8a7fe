//! Collaborator trait definitions for the ATTESTA pipeline.
//!
//! The hash chain itself is pure; everything that touches the outside world
//! sits behind one of these traits:
//!
//! - `GenerationProvider` — untrusted image source (may call a remote API)
//! - `ProofStore`         — durable sink for proofs and artifact bytes
//! - `ReportRenderer`     — produces a human-readable document from a proof
//!
//! The executor wires them around the session store and proof builder.

use std::sync::Arc;

use attesta_contracts::{
    error::AttestaResult,
    generation::{GeneratedArtifact, GenerationRequest},
    proof::Proof,
};

/// An image generation backend.
///
/// Implementations own their polling, timeouts and credentials.  Any failure
/// must surface as `AttestaError::Provider`; the executor never retries.
/// Error messages must not include API keys or other secrets.
pub trait GenerationProvider: Send + Sync {
    /// Produce one artifact for `request`.
    fn generate(&self, request: &GenerationRequest) -> AttestaResult<GeneratedArtifact>;

    /// Name of the backend, recorded as the snapshot's `model` when the
    /// artifact does not name one.
    fn model(&self) -> &str;

    /// Parameters the backend fills in itself when a request omits them,
    /// e.g. a derived seed.  Required parameters outside this list must be
    /// present in the request.
    fn supplied_parameters(&self) -> &[&str] {
        &[]
    }
}

/// Durable storage for artifact bytes and finalized proofs.
///
/// Failures surface as `AttestaError::Persistence`.  A failed proof write
/// never invalidates the in-memory proof.
pub trait ProofStore: Send + Sync {
    /// Store artifact bytes and return an opaque reference to them.
    fn persist_artifact(&self, bytes: &[u8]) -> AttestaResult<String>;

    /// Load artifact bytes previously stored under `reference`.
    fn load_artifact(&self, reference: &str) -> AttestaResult<Vec<u8>>;

    /// Store a finalized proof and return an opaque reference to it.
    fn persist_proof(&self, proof: &Proof) -> AttestaResult<String>;
}

/// A shared store, so callers keep a handle after giving one to the executor.
impl<T: ProofStore + ?Sized> ProofStore for Arc<T> {
    fn persist_artifact(&self, bytes: &[u8]) -> AttestaResult<String> {
        (**self).persist_artifact(bytes)
    }

    fn load_artifact(&self, reference: &str) -> AttestaResult<Vec<u8>> {
        (**self).load_artifact(reference)
    }

    fn persist_proof(&self, proof: &Proof) -> AttestaResult<String> {
        (**self).persist_proof(proof)
    }
}

/// Turns a proof and its artifacts into a human-readable document.
///
/// Implementations must embed `final_event_hash` and `verify_url` verbatim
/// and render snapshots in stored order.
pub trait ReportRenderer: Send + Sync {
    /// `artifacts[i]` holds the bytes for `proof.snapshots[i]`.
    fn render(&self, proof: &Proof, artifacts: &[Vec<u8>]) -> AttestaResult<Vec<u8>>;

    /// File extension for rendered documents, e.g. `"txt"`.
    fn extension(&self) -> &str;
}
