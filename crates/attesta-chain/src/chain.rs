//! Hash-chain primitives: attribute hashing, step composition, aggregation.
//!
//! Three layers, each a pure function:
//!
//!   1. `hash_attribute` — SHA-256 over one canonicalized attribute value.
//!   2. `compose`        — SHA-256 over the canonical JSON object of one
//!      event's attribute hashes, keys ordered by attribute name.
//!   3. `aggregate`      — SHA-256 over the canonical JSON array of all step
//!      hashes, in snapshot order.
//!
//! Canonical JSON is `serde_json` compact output: no whitespace, UTF-8.
//! Step preimage entries are keyed `"<attribute>_hash"`, e.g.
//! `{"file_hash":"…","prompt_hash":"…","size_hash":"…","timestamp_hash":"…"}`.
//! All digests are lowercase 64-character hex.

use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};

use std::collections::BTreeMap;

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    generation::ParamValue,
    schema::{AttributeSchema, AttributeSource, AttributeSpec},
    snapshot::{AttributeHashSet, Snapshot},
};

/// A canonicalizable attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// Hashed as its UTF-8 bytes exactly as authored.
    Text(&'a str),
    /// Hashed as the UTF-8 bytes of its base-10 form.
    Number(u64),
    /// Hashed as raw bytes, never a re-encoded form.
    Bytes(&'a [u8]),
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Return true when `s` is a 64-character lowercase hex digest.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Hash one attribute value.
pub fn hash_attribute(value: &AttributeValue<'_>) -> String {
    match value {
        AttributeValue::Text(s) => sha256_hex(s.as_bytes()),
        AttributeValue::Number(n) => sha256_hex(n.to_string().as_bytes()),
        AttributeValue::Bytes(b) => sha256_hex(b),
    }
}

/// Resolve the value an attribute takes for a snapshot.
///
/// `artifact` supplies the raw bytes for the artifact attribute; it is passed
/// separately because snapshots only hold a reference to them.  Empty bytes
/// count as absent.
pub fn recorded_value<'a>(
    spec: &AttributeSpec,
    snapshot: &'a Snapshot,
    artifact: Option<&'a [u8]>,
) -> Option<AttributeValue<'a>> {
    match spec.source {
        AttributeSource::Timestamp => Some(AttributeValue::Text(&snapshot.timestamp_utc)),
        AttributeSource::Prompt => Some(AttributeValue::Text(&snapshot.prompt)),
        AttributeSource::RevisedPrompt => snapshot.revised_prompt.as_deref().map(AttributeValue::Text),
        AttributeSource::Parameter => snapshot.parameters.get(&spec.name).map(parameter_value),
        AttributeSource::Artifact => artifact.filter(|b| !b.is_empty()).map(AttributeValue::Bytes),
    }
}

/// The hashable form of a parameter value.
pub fn parameter_value(value: &ParamValue) -> AttributeValue<'_> {
    match value {
        ParamValue::Number(n) => AttributeValue::Number(*n),
        ParamValue::Text(s) => AttributeValue::Text(s),
    }
}

/// Hash every schema attribute of `snapshot`.
///
/// Returns `AttestaError::Input` naming the first required attribute that has
/// no value.  Absent optional attributes are left out of the set.
pub fn hash_attributes(
    schema: &AttributeSchema,
    snapshot: &Snapshot,
    artifact: Option<&[u8]>,
) -> AttestaResult<AttributeHashSet> {
    let mut hashes = AttributeHashSet::new();
    for spec in &schema.attributes {
        match recorded_value(spec, snapshot, artifact) {
            Some(value) => {
                hashes.insert(spec.name.clone(), hash_attribute(&value));
            }
            None if spec.required => {
                return Err(AttestaError::Input {
                    attribute: spec.name.clone(),
                });
            }
            None => {}
        }
    }
    Ok(hashes)
}

/// Check that `hashes` carries every required attribute of `schema` and
/// nothing the schema does not declare.
pub fn check_key_set(schema: &AttributeSchema, hashes: &AttributeHashSet) -> AttestaResult<()> {
    if let Some(missing) = schema
        .attributes
        .iter()
        .find(|a| a.required && !hashes.contains_key(&a.name))
    {
        return Err(AttestaError::Schema {
            reason: format!(
                "attribute '{}' required by schema '{}' is missing",
                missing.name,
                schema.label()
            ),
        });
    }
    if let Some(extra) = hashes.keys().find(|k| schema.attribute(k).is_none()) {
        return Err(AttestaError::Schema {
            reason: format!(
                "attribute '{}' is not declared by schema '{}'",
                extra,
                schema.label()
            ),
        });
    }
    Ok(())
}

/// Check that every parameter name in `parameters` is declared by `schema`
/// as a parameter attribute.
///
/// Returns `AttestaError::Schema` naming the first undeclared parameter.
pub fn check_declared_parameters(
    schema: &AttributeSchema,
    parameters: &BTreeMap<String, ParamValue>,
) -> AttestaResult<()> {
    match parameters
        .keys()
        .find(|name| schema.parameters().all(|p| &p.name != *name))
    {
        Some(name) => Err(AttestaError::Schema {
            reason: format!(
                "parameter '{}' is not declared by schema '{}'",
                name,
                schema.label()
            ),
        }),
        None => Ok(()),
    }
}

/// Check request parameters before anything is generated.
///
/// `supplied` names parameters the generation backend fills in itself, so
/// they may be missing from the request.
///
/// Returns `AttestaError::Schema` for an undeclared parameter and
/// `AttestaError::Input` for a required parameter that is neither in the
/// request nor supplied.
pub fn check_parameters(
    schema: &AttributeSchema,
    parameters: &BTreeMap<String, ParamValue>,
    supplied: &[&str],
) -> AttestaResult<()> {
    check_declared_parameters(schema, parameters)?;
    if let Some(missing) = schema.parameters().find(|p| {
        p.required && !parameters.contains_key(&p.name) && !supplied.contains(&p.name.as_str())
    }) {
        return Err(AttestaError::Input {
            attribute: missing.name.clone(),
        });
    }
    Ok(())
}

/// The step-hash preimage: a JSON object of `"<name>_hash": digest` entries
/// emitted in attribute-name order.
struct StepPreimage<'a>(&'a AttributeHashSet);

impl Serialize for StepPreimage<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, digest) in self.0 {
            map.serialize_entry(&format!("{name}_hash"), digest)?;
        }
        map.end()
    }
}

/// Digest an attribute hash set without checking it against a schema.
///
/// `AttributeHashSet` is a `BTreeMap`, so iteration is byte-wise ordered by
/// attribute name whatever order the entries were inserted in.
///
/// # Panics
///
/// Panics if the preimage cannot be serialized to JSON, which cannot happen
/// for a map of strings.
pub fn step_digest(hashes: &AttributeHashSet) -> String {
    let preimage = serde_json::to_vec(&StepPreimage(hashes))
        .expect("string map must always be serializable to JSON");
    sha256_hex(&preimage)
}

/// Compose one event's attribute hashes into its step hash.
///
/// Returns `AttestaError::Schema` if the key set does not match `schema`.
pub fn compose(schema: &AttributeSchema, hashes: &AttributeHashSet) -> AttestaResult<String> {
    check_key_set(schema, hashes)?;
    Ok(step_digest(hashes))
}

/// Aggregate ordered step hashes into the final event hash.
///
/// The array keeps its order, so swapping two distinct step hashes changes
/// the result.
///
/// # Panics
///
/// Panics if the array cannot be serialized to JSON, which cannot happen for
/// a slice of strings.
pub fn aggregate<S: AsRef<str>>(step_hashes: &[S]) -> String {
    let ordered: Vec<&str> = step_hashes.iter().map(AsRef::as_ref).collect();
    let preimage =
        serde_json::to_vec(&ordered).expect("string array must always be serializable to JSON");
    sha256_hex(&preimage)
}
