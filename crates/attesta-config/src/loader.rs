//! Loading, validating and querying an `AttestaConfig`.

use std::{collections::HashSet, path::Path};

use tracing::{debug, info};

use attesta_chain::ProofBuilder;
use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    schema::AttributeSchema,
};

use crate::config::AttestaConfig;

impl AttestaConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AttestaError::Config` if the TOML is malformed, does not match
    /// the expected structure, or fails `validate`.
    pub fn from_toml_str(s: &str) -> AttestaResult<Self> {
        let config: AttestaConfig = toml::from_str(s).map_err(|e| AttestaError::Config {
            reason: format!("failed to parse configuration TOML: {}", e),
        })?;
        config.validate()?;
        debug!(
            issuer = %config.issuer,
            default_schema = %config.default_schema,
            declared_schemas = config.schemas.len(),
            "configuration parsed"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> AttestaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AttestaError::Config {
            reason: format!("failed to read configuration file '{}': {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check the issuer, the URL template, every declared schema and that
    /// `default_schema` resolves.
    pub fn validate(&self) -> AttestaResult<()> {
        // ProofBuilder::new enforces a non-empty issuer and the {hash}
        // placeholder.
        ProofBuilder::new(self.issuer.as_str(), self.verify_url_template.as_str())?;

        let mut ids = HashSet::new();
        for schema in &self.schemas {
            schema.validate()?;
            if !ids.insert(schema.schema_id.as_str()) {
                return Err(AttestaError::Config {
                    reason: format!("schema '{}' is declared more than once", schema.schema_id),
                });
            }
        }

        if self.schema(&self.default_schema).is_none() {
            return Err(AttestaError::Config {
                reason: format!("default schema '{}' is not declared", self.default_schema),
            });
        }
        Ok(())
    }

    /// Resolve a schema by id: declared schemas first, then built-ins.
    pub fn schema(&self, schema_id: &str) -> Option<AttributeSchema> {
        self.schemas
            .iter()
            .find(|s| s.schema_id == schema_id)
            .cloned()
            .or_else(|| {
                [AttributeSchema::openai_images(), AttributeSchema::flux()]
                    .into_iter()
                    .find(|s| s.schema_id == schema_id)
            })
    }

    /// Resolve `schema_id`, returning `AttestaError::Config` when unknown.
    pub fn require_schema(&self, schema_id: &str) -> AttestaResult<AttributeSchema> {
        self.schema(schema_id).ok_or_else(|| AttestaError::Config {
            reason: format!("unknown schema '{}'", schema_id),
        })
    }

    /// The schema named by `default_schema`.
    pub fn default_schema(&self) -> AttestaResult<AttributeSchema> {
        self.require_schema(&self.default_schema)
    }

    /// A `ProofBuilder` for this configuration's issuer and verify URL.
    pub fn proof_builder(&self) -> AttestaResult<ProofBuilder> {
        ProofBuilder::new(self.issuer.as_str(), self.verify_url_template.as_str())
    }
}
