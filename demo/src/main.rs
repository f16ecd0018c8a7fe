//! ATTESTA Imaging Reference Runtime — Demo CLI
//!
//! Runs the reference scenarios, records a session to disk, or verifies a
//! persisted proof file.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- two-event
//!   cargo run -p demo -- tamper
//!   cargo run -p demo -- concurrent
//!   cargo run -p demo -- recovery
//!   cargo run -p demo -- record --applicant "Demo Studio Ltd." --prompt "a fox"
//!   cargo run -p demo -- verify --proof static/proof_event_<id>.json

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use attesta_config::AttestaConfig;
use attesta_contracts::{
    error::AttestaResult,
    generation::GenerationRequest,
    schema::AttributeSchema,
};
use attesta_core::{traits::GenerationProvider, Executor};
use attesta_ref_imaging::{
    mock_data::{refinement_prompts, MockFluxProvider, MockImageProvider},
    report::TextReportRenderer,
    scenarios::{concurrent_sessions, failure_recovery, tamper_detection, two_event_session},
    store::{artifact_dir_loader, read_proof_document, FileProofStore},
};
use attesta_verify::ProofVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// ATTESTA — tamper-evident provenance for generated images.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "ATTESTA imaging reference runtime demo",
    long_about = "Runs ATTESTA demo scenarios showing session recording, proof building,\n\
                  tamper detection, concurrency and failure recovery, and verifies proof files."
)]
struct Cli {
    /// Configuration file (TOML).  Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four scenarios in sequence.
    RunAll,
    /// Scenario 1: two-event session (generate, finalize, verify, render).
    TwoEvent,
    /// Scenario 2: tamper detection with localized mismatches.
    Tamper,
    /// Scenario 3: concurrent sessions through one executor.
    Concurrent,
    /// Scenario 4: provider and storage failure recovery.
    Recovery,
    /// Record a session with the mock provider and write proof, artifacts and
    /// report to the output directory.
    Record {
        /// Applicant named on the proof.
        #[arg(long)]
        applicant: String,
        /// Prompt for one generation event; repeat for several events.
        #[arg(long = "prompt")]
        prompts: Vec<String>,
        /// Schema id; defaults to the configured default schema.
        #[arg(long)]
        schema: Option<String>,
        /// Requested size for schemas that record one.
        #[arg(long, default_value = "1024x1024")]
        size: String,
        /// Output directory; defaults to the configured storage directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Verify a persisted proof file.
    Verify {
        /// Path to a `proof_event_*.json` file.
        #[arg(long)]
        proof: PathBuf,
        /// Directory holding the artifacts; defaults to the proof's directory.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::RunAll => run_all(),
        Command::TwoEvent => two_event_session::run_scenario(),
        Command::Tamper => tamper_detection::run_scenario(),
        Command::Concurrent => concurrent_sessions::run_scenario(),
        Command::Recovery => failure_recovery::run_scenario(),
        Command::Record {
            applicant,
            prompts,
            schema,
            size,
            out,
        } => run_record(&config, &applicant, prompts, schema.as_deref(), &size, out),
        Command::Verify { proof, artifacts } => run_verify(&proof, artifacts),
    });

    match result {
        Ok(()) => {
            println!("Done.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> AttestaResult<AttestaConfig> {
    match path {
        Some(path) => AttestaConfig::from_file(path),
        None => Ok(AttestaConfig::default()),
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> AttestaResult<()> {
    two_event_session::run_scenario()?;
    tamper_detection::run_scenario()?;
    concurrent_sessions::run_scenario()?;
    failure_recovery::run_scenario()?;
    Ok(())
}

// ── Record ────────────────────────────────────────────────────────────────────

fn provider_for(schema: &AttributeSchema) -> Box<dyn GenerationProvider> {
    if schema.attribute("seed").is_some() {
        Box::new(MockFluxProvider::new())
    } else {
        Box::new(MockImageProvider::new())
    }
}

fn run_record(
    config: &AttestaConfig,
    applicant: &str,
    prompts: Vec<String>,
    schema_id: Option<&str>,
    size: &str,
    out: Option<PathBuf>,
) -> AttestaResult<()> {
    let schema = match schema_id {
        Some(id) => config.require_schema(id)?,
        None => config.default_schema()?,
    };
    let prompts = if prompts.is_empty() {
        refinement_prompts().iter().map(|p| p.to_string()).collect()
    } else {
        prompts
    };
    let dir = out.unwrap_or_else(|| config.storage.output_dir.clone());
    let records_size = schema.attribute("size").is_some();

    let executor = Executor::new(
        provider_for(&schema),
        Box::new(FileProofStore::new(&dir)?),
        Box::new(TextReportRenderer::new()),
        config.proof_builder()?,
    );

    println!("  Schema: {}  Output: {}", schema.label(), dir.display());
    let session = executor.open(schema)?;
    info!(session_id = %session, "recording session");

    for prompt in prompts {
        let mut request = GenerationRequest::new(prompt);
        if records_size {
            request = request.with_param("size", size);
        }
        let snapshot = executor.generate(&session, request)?;
        println!("  v{}  {}  {}", snapshot.version_index, snapshot.step_hash, snapshot.artifact_reference);
    }

    let proof = executor.finalize(&session, applicant)?;
    let report = executor.render_report(&session)?;
    let report_path = FileProofStore::new(&dir)?.persist_report(&proof, &report, "txt")?;

    println!();
    println!("  Final event hash: {}", proof.final_event_hash);
    println!("  Verify URL:       {}", proof.verify_url);
    println!("  Proof:            {}", dir.join(format!("proof_event_{}.json", proof.report_id)).display());
    println!("  Report:           {}", report_path.display());
    println!();
    Ok(())
}

// ── Verify ────────────────────────────────────────────────────────────────────

fn run_verify(proof_path: &Path, artifacts: Option<PathBuf>) -> AttestaResult<()> {
    let document = read_proof_document(proof_path)?;
    let artifact_dir = artifacts.unwrap_or_else(|| {
        proof_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let report = ProofVerifier::new()
        .with_artifacts(artifact_dir_loader(artifact_dir))
        .verify_json(&document)?;

    println!("  Proof: {}", proof_path.display());
    println!(
        "  Result: {} ({} mismatch(es), {} unchecked)",
        if report.ok { "VERIFIED" } else { "FAILED" },
        report.mismatches.len(),
        report.unchecked.len()
    );
    for mismatch in &report.mismatches {
        println!("    - {}", mismatch.scope);
        println!("        expected {}", mismatch.expected);
        println!("        actual   {}", mismatch.actual);
    }
    for scope in &report.unchecked {
        println!("    ? {} (artifact unavailable)", scope);
    }
    println!();

    if !report.ok {
        std::process::exit(2);
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("ATTESTA — Tamper-evident Generation Provenance");
    println!("Imaging Reference Demo");
    println!("==============================================");
    println!();
    println!("Hash chain per session:");
    println!("  [1] Attribute hashes: SHA-256 of each recorded value (prompt, parameters, image bytes)");
    println!("  [2] Step hash: SHA-256 of the canonical JSON object of one event's attribute hashes");
    println!("  [3] Final event hash: SHA-256 of the canonical JSON array of all step hashes");
    println!("  [4] Any edit to a recorded value or hash breaks the chain at a precise location");
    println!();
}
