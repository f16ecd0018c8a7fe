//! # attesta-verify
//!
//! Proof verification for the ATTESTA runtime.
//!
//! This crate provides [`engine::ProofVerifier`], which checks a proof
//! document in two phases:
//!
//! 1. **Structural** — JSON Schema validation of the serialized document via
//!    the `jsonschema` crate ([`ProofVerifier::verify_json`] only).
//! 2. **Integrity** — every attribute hash, step hash and the final event
//!    hash is recomputed and compared with the stored value.
//!
//! Every discrepancy is reported with its location, so a tampered proof says
//! exactly which snapshot and attribute no longer match.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use attesta_verify::ProofVerifier;
//!
//! let verifier = ProofVerifier::new().with_artifacts(Box::new(|reference| {
//!     std::fs::read(reference).ok()
//! }));
//! let report = verifier.verify(&proof)?;
//! for mismatch in &report.mismatches {
//!     println!("{}: expected {} got {}", mismatch.scope, mismatch.expected, mismatch.actual);
//! }
//! ```

pub mod document;
pub mod engine;

pub use engine::{ArtifactLoader, ProofVerifier};
