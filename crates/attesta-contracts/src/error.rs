//! Runtime error types for the ATTESTA provenance pipeline.
//!
//! All fallible operations in ATTESTA return `AttestaResult<T>`.  Error
//! variants name the attribute, snapshot index, or session involved so a
//! caller can act on them, but never carry credentials or raw artifact bytes.

use thiserror::Error;

/// The unified error type for the ATTESTA runtime.
#[derive(Debug, Error)]
pub enum AttestaError {
    /// A required input was missing or empty, or a lifecycle precondition
    /// (open session, at least one snapshot, non-empty applicant) was unmet.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// A schema-required attribute had no value to hash.
    #[error("required attribute '{attribute}' has no value")]
    Input { attribute: String },

    /// An attribute hash set does not match the session's declared schema.
    #[error("schema mismatch: {reason}")]
    Schema { reason: String },

    /// The external generation provider failed or timed out.
    #[error("generation provider failed: {reason}")]
    Provider { reason: String },

    /// A durable write of a proof or artifact failed.
    ///
    /// An already-built in-memory proof stays valid when this is returned.
    #[error("persistence failed: {reason}")]
    Persistence { reason: String },

    /// A proof document is structurally unusable for verification.
    #[error("malformed proof: {reason}")]
    MalformedProof { reason: String },

    /// No session is registered under the given identifier.
    #[error("session '{session_id}' not found")]
    SessionNotFound { session_id: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The report renderer could not produce a document.
    #[error("report rendering failed: {reason}")]
    Render { reason: String },
}

/// Convenience alias used throughout the ATTESTA crates.
pub type AttestaResult<T> = Result<T, AttestaError>;
