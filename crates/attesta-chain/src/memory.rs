//! In-memory session store.
//!
//! `InMemorySessionStore` keeps any number of independent sessions keyed by
//! `SessionId`.  Each session sits behind its own `Mutex`, giving a
//! single-writer discipline per session: `record`, `finalize` and `reset`
//! on the same session serialize, while different sessions never contend.
//!
//! Attribute hashing for `record` runs before the session lock is taken, so
//! concurrent submitters only hold the lock for the index assignment.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

use tracing::{debug, info, warn};

use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    schema::AttributeSchema,
    session::{SessionId, SessionState},
    snapshot::{EventInput, Snapshot},
};

use crate::session::Session;

// ── Internal per-session slot ─────────────────────────────────────────────────

/// One registered session.  The schema is copied out of the lock so that
/// `prepare` can hash without holding it.
struct SessionSlot {
    schema: Arc<AttributeSchema>,
    session: Mutex<Session>,
}

impl SessionSlot {
    fn lock(&self, id: &SessionId) -> AttestaResult<MutexGuard<'_, Session>> {
        self.session.lock().map_err(|e| AttestaError::Validation {
            reason: format!("session '{}' lock poisoned: {}", id, e),
        })
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A thread-safe registry of open and finalized sessions.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &SessionId) -> AttestaResult<Arc<SessionSlot>> {
        let sessions = self.sessions.read().map_err(|e| AttestaError::Validation {
            reason: format!("session registry lock poisoned: {}", e),
        })?;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| AttestaError::SessionNotFound {
                session_id: id.to_string(),
            })
    }

    /// Open a fresh session under `schema` and return its id.
    ///
    /// The schema is fixed for the lifetime of the session.
    pub fn open(&self, schema: AttributeSchema) -> AttestaResult<SessionId> {
        let schema = Arc::new(schema);
        let session = Session::open(Arc::clone(&schema))?;
        let id = SessionId::new();

        let mut sessions = self.sessions.write().map_err(|e| AttestaError::Validation {
            reason: format!("session registry lock poisoned: {}", e),
        })?;
        sessions.insert(
            id,
            Arc::new(SessionSlot {
                schema: Arc::clone(&schema),
                session: Mutex::new(session),
            }),
        );

        info!(session_id = %id, schema = %schema.label(), "session opened");
        Ok(id)
    }

    /// Hash `input` and append it as the session's next snapshot.
    ///
    /// On any failure nothing is appended and the session is unchanged.
    pub fn record(&self, id: &SessionId, input: EventInput) -> AttestaResult<Snapshot> {
        let slot = self.slot(id)?;

        let prepared = Session::prepare(&slot.schema, input).map_err(|e| {
            warn!(session_id = %id, error = %e, "event rejected before append");
            e
        })?;

        let mut session = slot.lock(id)?;
        let snapshot = session.append(prepared)?;

        debug!(
            session_id = %id,
            version_index = snapshot.version_index,
            step_hash = %snapshot.step_hash,
            "snapshot recorded"
        );
        Ok(snapshot)
    }

    /// Finalize the session and return its ordered snapshots.
    pub fn finalize(&self, id: &SessionId, applicant: &str) -> AttestaResult<Vec<Snapshot>> {
        let slot = self.slot(id)?;
        let mut session = slot.lock(id)?;
        let snapshots = session.finalize(applicant)?;

        info!(
            session_id = %id,
            snapshot_count = snapshots.len(),
            "session finalized"
        );
        Ok(snapshots)
    }

    /// Discard every snapshot of the session and return it to `Open`.
    pub fn reset(&self, id: &SessionId) -> AttestaResult<()> {
        let slot = self.slot(id)?;
        let mut session = slot.lock(id)?;
        session.reset();

        info!(session_id = %id, "session reset");
        Ok(())
    }

    /// Remove the session from the store.
    pub fn close(&self, id: &SessionId) -> AttestaResult<()> {
        let mut sessions = self.sessions.write().map_err(|e| AttestaError::Validation {
            reason: format!("session registry lock poisoned: {}", e),
        })?;
        sessions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AttestaError::SessionNotFound {
                session_id: id.to_string(),
            })
    }

    /// The schema the session was opened with.
    pub fn schema(&self, id: &SessionId) -> AttestaResult<Arc<AttributeSchema>> {
        Ok(Arc::clone(&self.slot(id)?.schema))
    }

    pub fn state(&self, id: &SessionId) -> AttestaResult<SessionState> {
        let slot = self.slot(id)?;
        let session = slot.lock(id)?;
        Ok(session.state())
    }

    /// A copy of the session's snapshots in order.
    pub fn snapshots(&self, id: &SessionId) -> AttestaResult<Vec<Snapshot>> {
        let slot = self.slot(id)?;
        let session = slot.lock(id)?;
        Ok(session.snapshots().to_vec())
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
