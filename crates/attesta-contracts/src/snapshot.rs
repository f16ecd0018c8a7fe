//! Snapshot and event-input types.
//!
//! An `EventInput` is everything known about one completed generation event
//! before it is hashed.  A `Snapshot` is the immutable record appended to the
//! session once every attribute hash and the step hash have been computed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::generation::ParamValue;

/// Map from attribute name to its 64-char lowercase hex SHA-256 digest.
pub type AttributeHashSet = BTreeMap<String, String>;

/// The raw material of one generation event, handed to the session manager.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    /// Capture time.  When `None` the session manager stamps the current UTC
    /// time.  When supplied it is hashed exactly as given.
    pub timestamp_utc: Option<String>,
    pub prompt: String,
    pub revised_prompt: Option<String>,
    pub parameters: BTreeMap<String, ParamValue>,
    pub model: String,
    /// Raw artifact bytes.  Hashed, never stored in the snapshot.
    pub artifact: Vec<u8>,
    /// Opaque handle to where the artifact bytes are kept.
    pub artifact_reference: String,
}

impl EventInput {
    pub fn new(prompt: impl Into<String>, artifact: Vec<u8>) -> Self {
        Self {
            prompt: prompt.into(),
            artifact,
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp_utc: impl Into<String>) -> Self {
        self.timestamp_utc = Some(timestamp_utc.into());
        self
    }

    pub fn with_revised_prompt(mut self, revised_prompt: impl Into<String>) -> Self {
        self.revised_prompt = Some(revised_prompt.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_artifact_reference(mut self, reference: impl Into<String>) -> Self {
        self.artifact_reference = reference.into();
        self
    }
}

/// The immutable record of one generation event plus its hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 1-based position in the session, equal to insertion order.
    pub version_index: u64,

    /// ISO-8601 UTC capture time, hashed verbatim.
    pub timestamp_utc: String,

    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,

    /// Schema-specific provider parameters, flattened next to the fixed
    /// fields (`"size": "1024x1024"` or `"seed": 7, "width": 512, ...`).
    #[serde(flatten)]
    pub parameters: BTreeMap<String, ParamValue>,

    /// Identifies the generation backend used.
    pub model: String,

    pub attribute_hashes: AttributeHashSet,

    /// Digest of `attribute_hashes`; see `attesta_chain::compose`.
    pub step_hash: String,

    /// Opaque handle to the artifact bytes.  Not a hash input.
    pub artifact_reference: String,
}
