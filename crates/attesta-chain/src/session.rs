//! The single-session state machine.
//!
//! `Session` holds the ordered snapshots and lifecycle state of one working
//! session.  It is not synchronized itself; `InMemorySessionStore` wraps each
//! session in a `Mutex` so that `append`, `finalize` and `reset` serialize.
//!
//! Recording is split in two so hashing can run outside the lock:
//!
//! 1. `prepare` (pure, no lock) validates the input and computes every
//!    attribute hash and the step hash.
//! 2. `append` (under the lock) checks the lifecycle state and assigns the
//!    next `version_index`.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    schema::{AttributeSchema, AttributeSource},
    session::SessionState,
    snapshot::{EventInput, Snapshot},
};

use crate::chain::{check_declared_parameters, compose, hash_attributes};

/// A fully hashed event waiting for its `version_index`.
///
/// Nothing about a step hash depends on the index, so a prepared event can be
/// appended at whatever position the lock hands it.
#[derive(Debug, Clone)]
pub struct PreparedEvent {
    snapshot: Snapshot,
}

impl PreparedEvent {
    pub fn step_hash(&self) -> &str {
        &self.snapshot.step_hash
    }
}

/// Current UTC time in ISO-8601 with microseconds and an explicit offset,
/// e.g. `2026-10-17T08:30:00.123456+00:00`.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// One working session: a schema, a lifecycle state and ordered snapshots.
#[derive(Debug)]
pub struct Session {
    schema: Arc<AttributeSchema>,
    state: SessionState,
    snapshots: Vec<Snapshot>,
}

impl Session {
    /// Open a fresh session under `schema`.
    ///
    /// Returns `AttestaError::Config` if the schema is inconsistent.
    pub fn open(schema: Arc<AttributeSchema>) -> AttestaResult<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            state: SessionState::Open,
            snapshots: Vec::new(),
        })
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Validate `input` and compute its attribute hashes and step hash.
    ///
    /// # Errors
    ///
    /// - `Validation` when the prompt is empty.
    /// - `Schema` when the input carries a parameter the schema does not
    ///   declare (it would be stored without being hashed).
    /// - `Input` when a required attribute has no value.
    pub fn prepare(schema: &AttributeSchema, input: EventInput) -> AttestaResult<PreparedEvent> {
        if input.prompt.is_empty() {
            return Err(AttestaError::Validation {
                reason: "prompt is required".to_string(),
            });
        }

        check_declared_parameters(schema, &input.parameters)?;

        let declares_revised = schema
            .attributes
            .iter()
            .any(|a| a.source == AttributeSource::RevisedPrompt);
        let revised_prompt = if declares_revised {
            Some(input.revised_prompt.unwrap_or_else(|| input.prompt.clone()))
        } else {
            if input.revised_prompt.is_some() {
                debug!(schema = %schema.label(), "schema has no revised_prompt attribute; dropping it");
            }
            None
        };

        let mut snapshot = Snapshot {
            version_index: 0,
            timestamp_utc: input.timestamp_utc.unwrap_or_else(utc_timestamp),
            prompt: input.prompt,
            revised_prompt,
            parameters: input.parameters,
            model: input.model,
            attribute_hashes: Default::default(),
            step_hash: String::new(),
            artifact_reference: input.artifact_reference,
        };

        let attribute_hashes = hash_attributes(schema, &snapshot, Some(&input.artifact))?;
        snapshot.step_hash = compose(schema, &attribute_hashes)?;
        snapshot.attribute_hashes = attribute_hashes;

        Ok(PreparedEvent { snapshot })
    }

    /// Append a prepared event as the next snapshot.
    ///
    /// Returns `AttestaError::Validation` if the session is finalized; the
    /// snapshot list is untouched in that case.
    pub fn append(&mut self, prepared: PreparedEvent) -> AttestaResult<Snapshot> {
        if self.state != SessionState::Open {
            return Err(AttestaError::Validation {
                reason: "session is finalized; no further snapshots may be recorded".to_string(),
            });
        }

        let mut snapshot = prepared.snapshot;
        snapshot.version_index = self.snapshots.len() as u64 + 1;
        self.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    /// Prepare and append in one call.
    pub fn record(&mut self, input: EventInput) -> AttestaResult<Snapshot> {
        let prepared = Self::prepare(&self.schema, input)?;
        self.append(prepared)
    }

    /// Transition to `Finalized` and return the ordered snapshots.
    ///
    /// Requires an open session with at least one snapshot and a non-empty
    /// applicant.  On failure the session is unchanged.
    pub fn finalize(&mut self, applicant: &str) -> AttestaResult<Vec<Snapshot>> {
        if applicant.is_empty() {
            return Err(AttestaError::Validation {
                reason: "applicant name is required".to_string(),
            });
        }
        if self.state != SessionState::Open {
            return Err(AttestaError::Validation {
                reason: "session is already finalized".to_string(),
            });
        }
        if self.snapshots.is_empty() {
            return Err(AttestaError::Validation {
                reason: "session has no snapshots to finalize".to_string(),
            });
        }

        self.state = SessionState::Finalized;
        Ok(self.snapshots.clone())
    }

    /// Discard every snapshot and return to `Open`.  The schema is kept.
    pub fn reset(&mut self) {
        self.snapshots.clear();
        self.state = SessionState::Open;
    }
}
