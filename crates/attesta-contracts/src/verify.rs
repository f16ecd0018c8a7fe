//! Verification report types.
//!
//! A verifier never raises an error for a hash mismatch.  Mismatches are
//! collected as `Discrepancy` values so a caller sees exactly which snapshot,
//! attribute, or aggregate diverged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where in a proof a recomputed digest diverged from the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum DiscrepancyScope {
    /// One attribute hash of one snapshot.
    Attribute { version_index: u64, attribute: String },
    /// The step hash of one snapshot.
    Step { version_index: u64 },
    /// The final event hash over all step hashes.
    Aggregate,
}

impl fmt::Display for DiscrepancyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyScope::Attribute { version_index, attribute } => {
                write!(f, "snapshot {version_index} attribute '{attribute}'")
            }
            DiscrepancyScope::Step { version_index } => write!(f, "snapshot {version_index} step hash"),
            DiscrepancyScope::Aggregate => f.write_str("aggregate"),
        }
    }
}

/// A single divergence between recorded and recomputed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    #[serde(flatten)]
    pub scope: DiscrepancyScope,
    /// The digest recomputed from recorded data.  Empty when an attribute is
    /// present in the proof but not declared by its schema.
    pub expected: String,
    /// The digest stored in the proof.  Empty when a declared attribute is
    /// missing from the proof.  For a recorded parameter the schema does not
    /// declare, the digest of its recorded value.
    pub actual: String,
}

/// The result of verifying one proof.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if no discrepancy was found.
    pub ok: bool,
    /// Every discrepancy found, in snapshot order with the aggregate last.
    pub mismatches: Vec<Discrepancy>,
    /// Attribute hashes that could not be recomputed because the underlying
    /// data (typically artifact bytes) was not available to the verifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unchecked: Vec<DiscrepancyScope>,
}

impl VerificationReport {
    pub fn from_mismatches(mismatches: Vec<Discrepancy>, unchecked: Vec<DiscrepancyScope>) -> Self {
        Self {
            ok: mismatches.is_empty(),
            mismatches,
            unchecked,
        }
    }
}
