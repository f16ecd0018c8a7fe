//! Generation request and artifact types exchanged with the image provider.
//!
//! ATTESTA does not prescribe how images are produced.  A provider receives a
//! `GenerationRequest` and returns a `GeneratedArtifact`; the runtime hashes
//! whatever comes back.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A provider parameter value such as `size = "1024x1024"` or `seed = 42`.
///
/// Serialized untagged so a snapshot reads `"seed": 42, "size": "1x1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(u64),
    Text(String),
}

impl fmt::Display for ParamValue {
    /// Canonical text form: base-10 for numbers, verbatim for text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Number(u64::from(n))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

/// What the caller asks the provider to generate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Provider parameters keyed by name (`size`, or `seed`/`width`/`height`).
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// What a provider hands back for one successful request.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    /// Raw artifact bytes exactly as downloaded.  These bytes, not any
    /// re-encoding of them, feed the artifact attribute hash.
    pub bytes: Vec<u8>,
    pub revised_prompt: Option<String>,
    /// Identifies the generation backend, e.g. `"dall-e-3"`.
    pub model: String,
    /// Parameters the provider actually applied, merged over the request's
    /// (e.g. a seed the provider picked when none was supplied).
    pub applied_parameters: BTreeMap<String, ParamValue>,
}
