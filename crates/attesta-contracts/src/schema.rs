//! Declared attribute schemas.
//!
//! A schema names the attributes that are hashed for every generation event
//! in a session and says where each attribute's value comes from.  Exactly one
//! schema applies per session; it is supplied when the session is opened and
//! cannot change afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AttestaError, AttestaResult};

/// Where the value of an attribute is taken from when an event is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeSource {
    /// The snapshot's `timestamp_utc` string.
    Timestamp,
    /// The prompt as authored by the user.
    Prompt,
    /// The provider's rewritten prompt.  Falls back to the prompt when the
    /// provider returned none.
    RevisedPrompt,
    /// A provider parameter of the same name (`size`, `seed`, ...).
    Parameter,
    /// The raw bytes of the generated artifact.
    Artifact,
}

/// One named attribute in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Stable attribute name, used as the key in `attribute_hashes`.
    pub name: String,
    pub source: AttributeSource,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl AttributeSpec {
    pub fn required(name: impl Into<String>, source: AttributeSource) -> Self {
        Self {
            name: name.into(),
            source,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, source: AttributeSource) -> Self {
        Self {
            name: name.into(),
            source,
            required: false,
        }
    }
}

/// A versioned declaration of the attribute set hashed for each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Unique identifier, e.g. `"openai-images"`.
    pub schema_id: String,
    pub version: u32,
    /// Declared attributes.  Declaration order is informational only; hashing
    /// always orders attributes by name.
    pub attributes: Vec<AttributeSpec>,
}

/// Snapshot field names that a parameter attribute may not reuse, because
/// parameters are flattened next to them in the serialized snapshot.
pub const RESERVED_PARAMETER_NAMES: &[&str] = &[
    "version_index",
    "timestamp_utc",
    "prompt",
    "revised_prompt",
    "model",
    "attribute_hashes",
    "step_hash",
    "artifact_reference",
];

impl AttributeSchema {
    /// The five-attribute schema used with OpenAI-style image endpoints:
    /// `{timestamp, prompt, revised_prompt, size, file}`.
    pub fn openai_images() -> Self {
        Self {
            schema_id: "openai-images".to_string(),
            version: 1,
            attributes: vec![
                AttributeSpec::required("timestamp", AttributeSource::Timestamp),
                AttributeSpec::required("prompt", AttributeSource::Prompt),
                AttributeSpec::optional("revised_prompt", AttributeSource::RevisedPrompt),
                AttributeSpec::required("size", AttributeSource::Parameter),
                AttributeSpec::required("file", AttributeSource::Artifact),
            ],
        }
    }

    /// The six-attribute schema used with FLUX-style endpoints:
    /// `{timestamp, prompt, seed, width, height, file}`.
    pub fn flux() -> Self {
        Self {
            schema_id: "flux".to_string(),
            version: 1,
            attributes: vec![
                AttributeSpec::required("timestamp", AttributeSource::Timestamp),
                AttributeSpec::required("prompt", AttributeSource::Prompt),
                AttributeSpec::required("seed", AttributeSource::Parameter),
                AttributeSpec::required("width", AttributeSource::Parameter),
                AttributeSpec::required("height", AttributeSource::Parameter),
                AttributeSpec::required("file", AttributeSource::Artifact),
            ],
        }
    }

    /// Look up a declared attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Iterate over the declared parameter attributes.
    pub fn parameters(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes
            .iter()
            .filter(|a| a.source == AttributeSource::Parameter)
    }

    /// `"schema_id@vN"`, used in log fields and messages.
    pub fn label(&self) -> String {
        format!("{}@v{}", self.schema_id, self.version)
    }

    /// Check that the schema is internally consistent.
    ///
    /// Returns `AttestaError::Config` when the id or attribute list is empty,
    /// a name is duplicated, a non-parameter source appears more than once, or
    /// a parameter reuses a reserved snapshot field name.
    pub fn validate(&self) -> AttestaResult<()> {
        if self.schema_id.trim().is_empty() {
            return Err(AttestaError::Config {
                reason: "schema_id must not be empty".to_string(),
            });
        }
        if self.attributes.is_empty() {
            return Err(AttestaError::Config {
                reason: format!("schema '{}' declares no attributes", self.label()),
            });
        }

        let mut names = HashSet::new();
        let mut sources = HashSet::new();
        for attr in &self.attributes {
            if attr.name.is_empty() {
                return Err(AttestaError::Config {
                    reason: format!("schema '{}' has an attribute with an empty name", self.label()),
                });
            }
            if !names.insert(attr.name.as_str()) {
                return Err(AttestaError::Config {
                    reason: format!(
                        "schema '{}' declares attribute '{}' more than once",
                        self.label(),
                        attr.name
                    ),
                });
            }
            if attr.source == AttributeSource::Parameter {
                if RESERVED_PARAMETER_NAMES.contains(&attr.name.as_str()) {
                    return Err(AttestaError::Config {
                        reason: format!(
                            "schema '{}' parameter '{}' collides with a snapshot field",
                            self.label(),
                            attr.name
                        ),
                    });
                }
            } else if !sources.insert(attr.source) {
                return Err(AttestaError::Config {
                    reason: format!(
                        "schema '{}' declares more than one {:?} attribute",
                        self.label(),
                        attr.source
                    ),
                });
            }
        }
        Ok(())
    }
}
