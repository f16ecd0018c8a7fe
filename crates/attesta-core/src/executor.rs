//! The ATTESTA executor: the session-scoped generate → record → prove runner.
//!
//! The executor enforces the ATTESTA pipeline:
//!
//!   Provider → Persist artifact → Hash + Record → Finalize → Build proof → Persist proof
//!
//! The invariant is that session state only changes once every fallible
//! outside call for an event has succeeded.  A provider or artifact-store
//! failure returns an error before the session store is touched, so no
//! snapshot is ever appended for an event that did not fully complete.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::{debug, info, warn};

use attesta_chain::{check_parameters, InMemorySessionStore, ProofBuilder};
use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    generation::GenerationRequest,
    proof::Proof,
    schema::AttributeSchema,
    session::{SessionId, SessionState},
    snapshot::{EventInput, Snapshot},
};

use crate::traits::{GenerationProvider, ProofStore, ReportRenderer};

/// The central executor that drives any number of provenance sessions.
///
/// Owns the collaborators (provider, store, renderer), the session store and
/// the proof builder, and keeps the latest proof of every session in memory.
pub struct Executor {
    provider: Box<dyn GenerationProvider>,
    store: Box<dyn ProofStore>,
    renderer: Box<dyn ReportRenderer>,
    sessions: InMemorySessionStore,
    builder: ProofBuilder,
    proofs: RwLock<HashMap<SessionId, Arc<Proof>>>,
}

impl Executor {
    /// Create a new executor with the given collaborators and proof builder.
    pub fn new(
        provider: Box<dyn GenerationProvider>,
        store: Box<dyn ProofStore>,
        renderer: Box<dyn ReportRenderer>,
        builder: ProofBuilder,
    ) -> Self {
        Self {
            provider,
            store,
            renderer,
            sessions: InMemorySessionStore::new(),
            builder,
            proofs: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying session store, for inspection.
    pub fn sessions(&self) -> &InMemorySessionStore {
        &self.sessions
    }

    /// Open a new session whose events are hashed under `schema`.
    pub fn open(&self, schema: AttributeSchema) -> AttestaResult<SessionId> {
        self.sessions.open(schema)
    }

    /// Run one generation request and record its result.
    ///
    /// # Pipeline
    ///
    /// 1. Reject an empty prompt, a non-open session, or parameters that do
    ///    not fit the session schema up front
    /// 2. Call `provider.generate()`; failure → `Provider`
    /// 3. Persist the artifact bytes; failure → `Persistence`
    /// 4. Hash and append the snapshot
    ///
    /// Steps 1–3 never touch the session; step 4 is atomic.
    pub fn generate(&self, id: &SessionId, request: GenerationRequest) -> AttestaResult<Snapshot> {
        if request.prompt.is_empty() {
            return Err(AttestaError::Validation {
                reason: "prompt is required".to_string(),
            });
        }
        if self.sessions.state(id)? != SessionState::Open {
            return Err(AttestaError::Validation {
                reason: format!("session '{}' is finalized; reset it to generate again", id),
            });
        }

        let schema = self.sessions.schema(id)?;
        check_parameters(&schema, &request.parameters, self.provider.supplied_parameters()).map_err(
            |e| {
                warn!(session_id = %id, error = %e, "request rejected before generation");
                e
            },
        )?;

        debug!(session_id = %id, model = %self.provider.model(), "requesting generation");

        let artifact = self.provider.generate(&request).map_err(|e| {
            warn!(session_id = %id, error = %e, "generation provider failed");
            e
        })?;

        let reference = self.store.persist_artifact(&artifact.bytes).map_err(|e| {
            warn!(session_id = %id, error = %e, "artifact persistence failed");
            e
        })?;

        let mut parameters = request.parameters;
        parameters.extend(artifact.applied_parameters);

        let model = if artifact.model.is_empty() {
            self.provider.model().to_string()
        } else {
            artifact.model
        };

        let input = EventInput {
            timestamp_utc: None,
            prompt: request.prompt,
            revised_prompt: artifact.revised_prompt,
            parameters,
            model,
            artifact: artifact.bytes,
            artifact_reference: reference,
        };

        self.sessions.record(id, input)
    }

    /// Record an event whose artifact was produced outside the executor.
    pub fn record(&self, id: &SessionId, input: EventInput) -> AttestaResult<Snapshot> {
        self.sessions.record(id, input)
    }

    /// Finalize the session, build its proof and persist it.
    ///
    /// The proof becomes the session's latest proof before persistence is
    /// attempted.  If persistence fails, `AttestaError::Persistence` is
    /// returned but the proof stays available through `latest_proof` and can
    /// be written again with `persist_latest`.
    pub fn finalize(&self, id: &SessionId, applicant: &str) -> AttestaResult<Arc<Proof>> {
        let schema = self.sessions.schema(id)?;
        let snapshots = self.sessions.finalize(id, applicant)?;
        let proof = Arc::new(self.builder.build(&schema, snapshots, applicant)?);

        self.proofs
            .write()
            .map_err(|e| AttestaError::Validation {
                reason: format!("proof registry lock poisoned: {}", e),
            })?
            .insert(*id, Arc::clone(&proof));

        match self.store.persist_proof(&proof) {
            Ok(reference) => {
                info!(
                    session_id = %id,
                    report_id = %proof.report_id,
                    reference = %reference,
                    "proof persisted"
                );
                Ok(proof)
            }
            Err(e) => {
                warn!(
                    session_id = %id,
                    report_id = %proof.report_id,
                    error = %e,
                    "proof built but not persisted"
                );
                Err(e)
            }
        }
    }

    /// The most recent proof built for the session, if any.
    pub fn latest_proof(&self, id: &SessionId) -> Option<Arc<Proof>> {
        self.proofs.read().ok()?.get(id).cloned()
    }

    /// Retry persistence of the session's latest proof.
    pub fn persist_latest(&self, id: &SessionId) -> AttestaResult<String> {
        let proof = self.require_proof(id)?;
        self.store.persist_proof(&proof)
    }

    /// Render the session's latest proof, with its artifacts, as a report.
    ///
    /// Returns `AttestaError::Validation` if the session has no proof yet.
    pub fn render_report(&self, id: &SessionId) -> AttestaResult<Vec<u8>> {
        let proof = self.require_proof(id)?;
        let artifacts = proof
            .snapshots
            .iter()
            .map(|s| self.store.load_artifact(&s.artifact_reference))
            .collect::<AttestaResult<Vec<_>>>()?;

        let document = self.renderer.render(&proof, &artifacts)?;
        info!(
            session_id = %id,
            report_id = %proof.report_id,
            bytes = document.len(),
            extension = %self.renderer.extension(),
            "report rendered"
        );
        Ok(document)
    }

    /// Discard the session's snapshots and latest proof, keeping its schema.
    pub fn reset(&self, id: &SessionId) -> AttestaResult<()> {
        self.sessions.reset(id)?;
        if let Ok(mut proofs) = self.proofs.write() {
            proofs.remove(id);
        }
        Ok(())
    }

    /// Remove the session and its latest proof entirely.
    pub fn close(&self, id: &SessionId) -> AttestaResult<()> {
        self.sessions.close(id)?;
        if let Ok(mut proofs) = self.proofs.write() {
            proofs.remove(id);
        }
        Ok(())
    }

    fn require_proof(&self, id: &SessionId) -> AttestaResult<Arc<Proof>> {
        self.latest_proof(id).ok_or_else(|| AttestaError::Validation {
            reason: format!("session '{}' has no proof; finalize it first", id),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
