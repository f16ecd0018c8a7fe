//! Simulated image generation backends for the ATTESTA reference runtime.
//!
//! Nothing here contacts a real service.  Every provider is deterministic:
//! the same request always yields the same bytes, so scenario output and test
//! expectations are stable.

use attesta_chain::chain::sha256_hex;
use attesta_contracts::{
    error::{AttestaError, AttestaResult},
    generation::{GeneratedArtifact, GenerationRequest, ParamValue},
};
use attesta_core::traits::GenerationProvider;

/// Size used by the OpenAI-style provider when the request names none.
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Edge length used by the FLUX-style provider when width or height is absent.
pub const DEFAULT_EDGE: u64 = 1024;

// ── OpenAI-style provider (mock) ──────────────────────────────────────────────

/// Stand-in for an OpenAI-style image endpoint.
///
/// Rewrites the prompt the way hosted endpoints do and echoes the requested
/// `size` back as an applied parameter.
pub struct MockImageProvider {
    model: String,
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-image-1".to_string(),
        }
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationProvider for MockImageProvider {
    fn generate(&self, request: &GenerationRequest) -> AttestaResult<GeneratedArtifact> {
        let size = request
            .parameters
            .get("size")
            .map(ParamValue::to_string)
            .unwrap_or_else(|| DEFAULT_SIZE.to_string());

        let bytes = format!("MOCK-PNG {}\nsize={}\n{}", self.model, size, request.prompt).into_bytes();

        Ok(GeneratedArtifact {
            bytes,
            revised_prompt: Some(revise_prompt(&request.prompt)),
            model: self.model.clone(),
            applied_parameters: [("size".to_string(), ParamValue::Text(size))].into_iter().collect(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// The rewrite applied by the OpenAI-style mock.
pub fn revise_prompt(prompt: &str) -> String {
    format!("{}, photographed in soft natural light", prompt.trim())
}

// ── FLUX-style provider (mock) ────────────────────────────────────────────────

/// Stand-in for a FLUX-style endpoint.
///
/// Returns the seed, width and height it used.  When the request carries no
/// seed one is derived from the prompt; the seed only makes output
/// reproducible and plays no part in the hash chain's integrity.
pub struct MockFluxProvider {
    model: String,
}

impl MockFluxProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-flux-pro".to_string(),
        }
    }
}

impl Default for MockFluxProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationProvider for MockFluxProvider {
    fn generate(&self, request: &GenerationRequest) -> AttestaResult<GeneratedArtifact> {
        let seed = match request.parameters.get("seed") {
            Some(seed) => seed.clone(),
            None => ParamValue::Number(derive_seed(&request.prompt)?),
        };
        let width = request
            .parameters
            .get("width")
            .cloned()
            .unwrap_or(ParamValue::Number(DEFAULT_EDGE));
        let height = request
            .parameters
            .get("height")
            .cloned()
            .unwrap_or(ParamValue::Number(DEFAULT_EDGE));

        let bytes = format!(
            "MOCK-FLUX {}\nseed={} {}x{}\n{}",
            self.model, seed, width, height, request.prompt
        )
        .into_bytes();

        Ok(GeneratedArtifact {
            bytes,
            revised_prompt: None,
            model: self.model.clone(),
            applied_parameters: [
                ("seed".to_string(), seed),
                ("width".to_string(), width),
                ("height".to_string(), height),
            ]
            .into_iter()
            .collect(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn supplied_parameters(&self) -> &[&str] {
        &["seed", "width", "height"]
    }
}

/// Derive a 32-bit seed from the prompt text.
pub fn derive_seed(prompt: &str) -> AttestaResult<u64> {
    let digest = sha256_hex(prompt.as_bytes());
    u64::from_str_radix(&digest[..8], 16).map_err(|e| AttestaError::Provider {
        reason: format!("could not derive seed: {e}"),
    })
}

// ── Unavailable provider (mock) ───────────────────────────────────────────────

/// A backend that always fails, as a timed-out or rate-limited endpoint would.
pub struct UnavailableProvider;

impl GenerationProvider for UnavailableProvider {
    fn generate(&self, _request: &GenerationRequest) -> AttestaResult<GeneratedArtifact> {
        Err(AttestaError::Provider {
            reason: "image endpoint did not return a result before the deadline".to_string(),
        })
    }

    fn model(&self) -> &str {
        "unavailable"
    }
}

// ── Prompts (mock) ────────────────────────────────────────────────────────────

/// A short iterative editing session: each prompt refines the previous one.
pub fn refinement_prompts() -> [&'static str; 3] {
    [
        "a lighthouse on a basalt cliff at dawn",
        "a lighthouse on a basalt cliff at dawn, storm clouds gathering",
        "a lighthouse on a basalt cliff at dawn, storm clouds gathering, one gull in flight",
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
