//! `goldenear` — a golden-master regression harness for transcription CLIs.
//!
//! This crate provides:
//! - Approximate structural comparison of JSON artifacts (float tolerance)
//! - Reference ("expected output") resolution, creation, and lifecycle policy
//! - File-tree diffing with explicit missing/extra-file detection
//! - Subprocess invocation of the tool under test
//! - End-to-end scenario orchestration
//!
//! The transcription tool itself is an external collaborator reached only
//! through its command line and the files it writes; the harness never links
//! against a model or decodes audio beyond WAV header inspection.

// High-level API (most consumers should start here).
pub mod config;
pub mod scenario;

// Reference lifecycle and run-wide policy.
pub mod policy;
pub mod store;

// Comparison engine.
pub mod approx;
pub mod compare;

// External tool invocation.
pub mod process;

// Input probing.
pub mod device;
pub mod wav;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;

pub use error::{Error, Result};
