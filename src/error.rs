// src/error.rs
use thiserror::Error;

/// Failure taxonomy of the normalization pipeline.
///
/// Per-document and per-area failures are contained where they occur
/// (logged, counted, skipped); only `NoInputAvailable` propagates out of a
/// run, so callers can tell "no warnings active" apart from "could not run".
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input archive contained no documents")]
    NoInputAvailable,

    #[error("malformed CAP document {name}: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("malformed polygon text: {0}")]
    MalformedGeometry(String),
}
