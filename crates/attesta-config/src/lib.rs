//! # attesta-config
//!
//! TOML-driven configuration for the ATTESTA runtime.
//!
//! ## Overview
//!
//! This crate provides [`AttestaConfig`]: the proof issuer, the verification
//! URL template, storage location and the registry of attribute schemas a
//! session may be opened with.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use attesta_config::AttestaConfig;
//!
//! let config = AttestaConfig::from_file(Path::new("config/attesta.toml"))?;
//! let builder = config.proof_builder()?;
//! let schema = config.default_schema()?;
//! ```

pub mod config;
pub mod loader;

pub use config::{AttestaConfig, StorageConfig};

/// The reference configuration shipped with the workspace.
pub const REFERENCE_CONFIG: &str = include_str!("../config/attesta.toml");

// ── Tests ─────────────────────────────────────────────────────────────────────
