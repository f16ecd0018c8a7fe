//! Configuration types.
//!
//! An `AttestaConfig` is deserialized from TOML.  Every field has a default,
//! so an empty document yields the built-in configuration.  The two built-in
//! schemas (`openai-images`, `flux`) are always available; a `[[schemas]]`
//! table with the same `schema_id` replaces the built-in one.
//!
//! Example:
//! ```toml
//! issuer = "WesmartAI Inc."
//! verify_url_template = "https://wesmart.ai/verify?hash={hash}"
//! default_schema = "openai-images"
//!
//! [storage]
//! output_dir = "static"
//!
//! [[schemas]]
//! schema_id = "sdxl"
//! version = 1
//! attributes = [
//!     { name = "timestamp", source = "timestamp" },
//!     { name = "prompt", source = "prompt" },
//!     { name = "steps", source = "parameter" },
//!     { name = "file", source = "artifact" },
//! ]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use attesta_contracts::schema::AttributeSchema;

pub const DEFAULT_ISSUER: &str = "WesmartAI Inc.";
pub const DEFAULT_VERIFY_URL_TEMPLATE: &str = "https://wesmart.ai/verify?hash={hash}";
pub const DEFAULT_SCHEMA: &str = "openai-images";

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

fn default_verify_url_template() -> String {
    DEFAULT_VERIFY_URL_TEMPLATE.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("static")
}

/// Where the filesystem store writes artifacts, proofs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// The top-level structure deserialized from a TOML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestaConfig {
    /// Issuing organization written into every proof.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Verification URL; `{hash}` is replaced by the final event hash.
    #[serde(default = "default_verify_url_template")]
    pub verify_url_template: String,

    /// `schema_id` used when a session is opened without naming one.
    #[serde(default = "default_schema")]
    pub default_schema: String,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Additional or overriding schema declarations.
    #[serde(default)]
    pub schemas: Vec<AttributeSchema>,
}

impl Default for AttestaConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            verify_url_template: default_verify_url_template(),
            default_schema: default_schema(),
            storage: StorageConfig::default(),
            schemas: Vec::new(),
        }
    }
}
