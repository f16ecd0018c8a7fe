//! Proof and artifact stores for the reference runtime.
//!
//! Artifacts are content-addressed: the reference returned for a blob is
//! derived from its SHA-256 digest, so storing the same bytes twice yields the
//! same reference.  Proofs are written as pretty-printed JSON named
//! `proof_event_{report_id}.json`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};

use tracing::{debug, info};

use attesta_chain::chain::sha256_hex;
use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    proof::Proof,
};
use attesta_core::traits::ProofStore;
use attesta_verify::ArtifactLoader;

/// File name a proof is persisted under.
pub fn proof_file_name(proof: &Proof) -> String {
    format!("proof_event_{}.json", proof.report_id)
}

/// Content-addressed reference for artifact bytes.
pub fn artifact_reference(bytes: &[u8]) -> String {
    format!("{}.png", sha256_hex(bytes))
}

fn persistence(reason: impl Into<String>) -> AttestaError {
    AttestaError::Persistence {
        reason: reason.into(),
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

/// Keeps everything in process memory.  Proof persistence can be made to fail
/// on demand to exercise recovery paths.
#[derive(Default)]
pub struct MemoryProofStore {
    artifacts: RwLock<HashMap<String, Vec<u8>>>,
    proofs: RwLock<Vec<Proof>>,
    reject_proofs: AtomicBool,
}

impl MemoryProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, `persist_proof` fails with `AttestaError::Persistence`.
    pub fn reject_proofs(&self, reject: bool) {
        self.reject_proofs.store(reject, Ordering::SeqCst);
    }

    /// Every proof persisted so far, in write order.
    pub fn proofs(&self) -> Vec<Proof> {
        self.proofs.read().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.read().map(|a| a.len()).unwrap_or_default()
    }

    /// Snapshot of the stored artifacts as a verifier artifact loader.
    pub fn artifact_loader(&self) -> ArtifactLoader {
        let artifacts = self.artifacts.read().map(|a| a.clone()).unwrap_or_default();
        Box::new(move |reference| artifacts.get(reference).cloned())
    }
}

impl ProofStore for MemoryProofStore {
    fn persist_artifact(&self, bytes: &[u8]) -> AttestaResult<String> {
        let reference = artifact_reference(bytes);
        self.artifacts
            .write()
            .map_err(|e| persistence(format!("artifact store lock poisoned: {e}")))?
            .entry(reference.clone())
            .or_insert_with(|| bytes.to_vec());
        debug!(reference = %reference, bytes = bytes.len(), "artifact stored in memory");
        Ok(reference)
    }

    fn load_artifact(&self, reference: &str) -> AttestaResult<Vec<u8>> {
        self.artifacts
            .read()
            .map_err(|e| persistence(format!("artifact store lock poisoned: {e}")))?
            .get(reference)
            .cloned()
            .ok_or_else(|| persistence(format!("no artifact stored under '{reference}'")))
    }

    fn persist_proof(&self, proof: &Proof) -> AttestaResult<String> {
        if self.reject_proofs.load(Ordering::SeqCst) {
            return Err(persistence("proof store is rejecting writes"));
        }
        self.proofs
            .write()
            .map_err(|e| persistence(format!("proof store lock poisoned: {e}")))?
            .push(proof.clone());
        Ok(proof_file_name(proof))
    }
}

// ── Filesystem store ──────────────────────────────────────────────────────────

/// Writes artifacts, proofs and rendered reports into one output directory.
pub struct FileProofStore {
    dir: PathBuf,
}

impl FileProofStore {
    /// Open (creating if needed) the output directory.
    pub fn new(dir: impl Into<PathBuf>) -> AttestaResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| persistence(format!("failed to create '{}': {e}", dir.display())))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a rendered report as `report_{report_id}.{extension}`.
    pub fn persist_report(&self, proof: &Proof, document: &[u8], extension: &str) -> AttestaResult<PathBuf> {
        let path = self.dir.join(format!("report_{}.{}", proof.report_id, extension));
        fs::write(&path, document)
            .map_err(|e| persistence(format!("failed to write '{}': {e}", path.display())))?;
        info!(path = %path.display(), bytes = document.len(), "report written");
        Ok(path)
    }

    /// A verifier artifact loader reading from this store's directory.
    pub fn artifact_loader(&self) -> ArtifactLoader {
        artifact_dir_loader(self.dir.clone())
    }

    /// Resolve a reference inside the output directory.  References are bare
    /// file names; anything that could escape the directory is rejected.
    fn resolve(&self, reference: &str) -> AttestaResult<PathBuf> {
        resolve_in(&self.dir, reference)
    }
}

fn resolve_in(dir: &Path, reference: &str) -> AttestaResult<PathBuf> {
    let is_bare_name = !reference.is_empty()
        && reference != "."
        && reference != ".."
        && !reference.contains(['/', '\\']);
    if !is_bare_name {
        return Err(persistence(format!("invalid artifact reference '{reference}'")));
    }
    Ok(dir.join(reference))
}

/// A verifier artifact loader for artifacts stored as files in `dir`.
pub fn artifact_dir_loader(dir: PathBuf) -> ArtifactLoader {
    Box::new(move |reference| {
        let path = resolve_in(&dir, reference).ok()?;
        fs::read(path).ok()
    })
}

/// Read a persisted proof file as a JSON document, ready for
/// `ProofVerifier::verify_json`.
pub fn read_proof_document(path: &Path) -> AttestaResult<serde_json::Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| persistence(format!("failed to read '{}': {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| AttestaError::MalformedProof {
        reason: format!("'{}' is not valid JSON: {e}", path.display()),
    })
}

impl ProofStore for FileProofStore {
    fn persist_artifact(&self, bytes: &[u8]) -> AttestaResult<String> {
        let reference = artifact_reference(bytes);
        let path = self.resolve(&reference)?;
        if !path.exists() {
            fs::write(&path, bytes)
                .map_err(|e| persistence(format!("failed to write '{}': {e}", path.display())))?;
        }
        debug!(reference = %reference, bytes = bytes.len(), "artifact written");
        Ok(reference)
    }

    fn load_artifact(&self, reference: &str) -> AttestaResult<Vec<u8>> {
        let path = self.resolve(reference)?;
        fs::read(&path).map_err(|e| persistence(format!("failed to read '{}': {e}", path.display())))
    }

    fn persist_proof(&self, proof: &Proof) -> AttestaResult<String> {
        let name = proof_file_name(proof);
        let path = self.dir.join(&name);
        let json = serde_json::to_string_pretty(proof)
            .map_err(|e| persistence(format!("failed to serialize proof: {e}")))?;
        fs::write(&path, json)
            .map_err(|e| persistence(format!("failed to write '{}': {e}", path.display())))?;
        info!(report_id = %proof.report_id, path = %path.display(), "proof written");
        Ok(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
