//! # attesta-core
//!
//! The session executor for ATTESTA provenance sessions.
//!
//! This crate provides:
//! - The three collaborator traits (`GenerationProvider`, `ProofStore`,
//!   `ReportRenderer`)
//! - The `Executor` that wires them around the session store and proof
//!   builder in the correct order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use attesta_core::{Executor, traits::{GenerationProvider, ProofStore, ReportRenderer}};
//! ```

pub mod executor;
pub mod traits;

pub use executor::Executor;
