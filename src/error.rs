//! Error types for the grant2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GrantMdError`] — **Fatal**: the run cannot proceed at all (missing
//!   input, unreadable element JSON, GROBID failure, nothing to ingest).
//!   Returned as `Err(GrantMdError)` from the top-level entry points.
//!
//! * [`DocSkip`] — **Non-fatal**: a single document in a batch produced no
//!   usable output (no "Specific Aims" heading, empty body after reflow).
//!   Logged as a warning with the file name and stage; the batch continues.
//!   Only a batch that yields zero outputs overall escalates to
//!   [`GrantMdError::EmptyBatch`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the grant2md library.
///
/// Per-document skips use [`DocSkip`] and never abort a batch.
#[derive(Debug, Error)]
pub enum GrantMdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The element JSON dump could not be read or deserialized.
    #[error("Failed to read element JSON '{path}': {detail}")]
    InvalidElementJson { path: PathBuf, detail: String },

    /// A reviewed-Markdown directory contained no `*.md` files at all.
    #[error("No reviewed markdown files found in '{dir}'")]
    NoReviewedFiles { dir: PathBuf },

    /// An element directory contained no `*.json` files at all.
    #[error("No element JSON files found in '{dir}'")]
    NoElementFiles { dir: PathBuf },

    /// Every document in the batch was skipped; nothing was written.
    #[error("Batch produced no output: all {total} document(s) were skipped")]
    EmptyBatch { total: usize },

    // ── Upstream service errors ───────────────────────────────────────────
    /// The GROBID request could not be sent or the response not received.
    #[error("GROBID request to '{url}' failed: {reason}")]
    GrobidTransport { url: String, reason: String },

    /// GROBID answered with a non-success status. The body is included
    /// verbatim (truncated) so the operator sees the upstream message.
    #[error("GROBID error {status}: {body}")]
    GrobidStatus { status: u16, body: String },

    /// The TEI-XML returned by GROBID could not be parsed.
    #[error("Failed to parse TEI-XML: {0}")]
    TeiParse(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read an input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal skip for a single document within a batch.
///
/// Carried in batch statistics so callers can report which inputs need
/// human attention without re-running with verbose flags.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocSkip {
    /// No heading matched the "Specific Aims" pattern.
    #[error("'{document_id}': no Specific Aims heading found")]
    SectionNotFound { document_id: String },

    /// Reflowed body was empty; the record was dropped, not written.
    #[error("'{file}' has no body text — skipped")]
    EmptyBody { file: String },
}
