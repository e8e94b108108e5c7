//! Output record and statistics types.

use crate::error::DocSkip;
use serde::{Deserialize, Serialize};

/// One reviewed Specific Aims section, ready for dataset assembly.
///
/// Serialized as one JSON object per line in the ingestion output. `text`
/// is guaranteed non-empty: records whose body reflows to nothing are
/// dropped before they reach this type's serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedRecord {
    /// Stable identifier derived from the source filename stem.
    pub document_id: String,
    /// Fixed section label, "Specific Aims" by default.
    pub section: String,
    /// All Markdown heading lines, joined by newline, trimmed.
    pub heading: String,
    /// Reflowed body: single newlines squashed, paragraph breaks preserved.
    pub text: String,
    /// The reviewed Markdown file verbatim.
    pub raw_source: String,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Markdown files considered.
    pub files_seen: usize,
    /// Records actually written (files minus drops).
    pub records_written: usize,
    /// Per-file skips, in input order.
    pub skipped: Vec<DocSkip>,
}

/// Outcome of one extraction batch.
#[derive(Debug, Clone, Default)]
pub struct ExtractStats {
    /// Element dumps considered.
    pub documents_seen: usize,
    /// Documents whose Specific Aims section was found and written.
    pub aims_written: usize,
    /// Per-document skips, in input order.
    pub skipped: Vec<DocSkip>,
}
