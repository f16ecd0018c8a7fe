//! The finalized proof document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{schema::AttributeSchema, snapshot::Snapshot};

/// The immutable record binding a session's snapshots to one final event
/// hash.
///
/// Produced once per successful finalize.  The embedded `schema` makes the
/// document self-describing so it can be verified offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Freshly minted UUID v4.
    pub report_id: uuid::Uuid,

    pub issuer: String,

    pub applicant: String,

    /// Wall-clock time (UTC) the proof was built.
    pub issued_at: DateTime<Utc>,

    /// SHA-256 over the ordered step hashes of `snapshots`.
    pub final_event_hash: String,

    /// Verification URL with `final_event_hash` substituted in.
    pub verify_url: String,

    /// The attribute schema every snapshot was recorded under.
    pub schema: AttributeSchema,

    /// All snapshots in session order (`version_index` 1 first).
    pub snapshots: Vec<Snapshot>,
}

impl Proof {
    /// The stored step hashes in snapshot order.
    pub fn step_hashes(&self) -> Vec<&str> {
        self.snapshots.iter().map(|s| s.step_hash.as_str()).collect()
    }
}
