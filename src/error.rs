use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Goldenear's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Goldenear's crate-wide error type.
///
/// Every variant is a hard test-case failure. The distinction between a
/// failure and a warning is made by the run-wide [`Policy`](crate::policy::Policy),
/// never by the variant itself.
///
/// This is intentionally decoupled from `anyhow` so downstream test suites
/// aren't forced to adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// A file or directory that must exist does not.
    #[error("missing file: {}", path.display())]
    MissingInput { path: PathBuf },

    /// The external tool exited non-zero (or died to a signal).
    ///
    /// Carries the captured stderr so the failure is diagnosable without
    /// re-running the tool.
    #[error("command `{command}` failed ({status}):\n{stderr}")]
    ProcessExecution {
        command: String,
        status: String,
        stderr: String,
    },

    /// A generated artifact differs from its reference.
    ///
    /// `report` lists every discrepancy (missing file, extra file, or
    /// per-field mismatch) with enough detail to localize it.
    #[error("{} does not match its reference:\n{report}", artifact.display())]
    ComparisonMismatch { artifact: PathBuf, report: String },

    /// References were created during a strict run.
    ///
    /// A reference may only legitimately come into existence under an
    /// explicit regeneration policy; under the strict default this is a
    /// failure even when every comparison passed.
    #[error("created references under strict policy: {}", references.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    UnexpectedReferenceCreation { references: Vec<PathBuf> },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
