//! # attesta-ref-imaging
//!
//! Imaging reference runtime for the ATTESTA provenance chain.
//!
//! Provides deterministic mock generation backends, in-memory and filesystem
//! proof stores, a plain-text report renderer, and four scenarios:
//!
//! 1. **Two-Event Session** — generate, finalize, verify and render.
//! 2. **Tamper Detection** — edited proofs fail with localized mismatches.
//! 3. **Concurrent Sessions** — parallel sessions and a shared session keep
//!    contiguous version indices.
//! 4. **Failure Recovery** — provider and storage failures leave the chain
//!    intact.
//!
//! No external API calls are made.

pub mod mock_data;
pub mod report;
pub mod scenarios;
pub mod store;
