//! Review ingestion: reviewed Markdown → normalized JSONL records.
//!
//! After a human reviews the extracted Specific Aims files, this stage
//! collects them back into one record per document. Heading lines are kept
//! verbatim; body lines are reflowed so accidental line wraps disappear
//! while deliberate paragraph breaks survive. The output collection is
//! rewritten whole on every run — there is no append path.

use crate::config::IngestConfig;
use crate::error::{DocSkip, GrantMdError};
use crate::extract::{atomic_write, collect_inputs};
use crate::output::{IngestStats, ReviewedRecord};
use crate::pipeline::reflow::squash_single_newlines;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{info, warn};

/// Markdown heading marker: one or more leading `#` followed by whitespace.
static HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#+\s").unwrap());

/// Heading and reflowed body of one reviewed Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedParts {
    /// Heading lines verbatim, joined by newline, trimmed.
    pub heading: String,
    /// Body reflowed by [`squash_single_newlines`]. May be empty.
    pub text: String,
    /// The input Markdown, trailing whitespace trimmed.
    pub raw_source: String,
}

/// Split reviewed Markdown into heading lines and reflowed body.
pub fn parse_reviewed_markdown(raw: &str) -> ReviewedParts {
    let raw = raw.trim_end();
    let mut headings: Vec<&str> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if HEAD_RE.is_match(line) {
            headings.push(line.trim_end());
        } else {
            body_lines.push(line.trim_end());
        }
    }

    ReviewedParts {
        heading: headings.join("\n").trim().to_string(),
        text: squash_single_newlines(&body_lines),
        raw_source: raw.to_string(),
    }
}

/// Derive the document id from a filename stem by stripping the configured
/// suffix tokens in order, each at most once.
pub fn derive_document_id(stem: &str, config: &IngestConfig) -> String {
    let mut id = stem.to_string();
    for token in &config.suffix_tokens {
        id = id.replacen(token.as_str(), "", 1);
    }
    id
}

/// Build the record for one reviewed file, or the drop marker when the body
/// reflowed to nothing.
pub fn ingest_file(path: &Path, config: &IngestConfig) -> Result<Result<ReviewedRecord, DocSkip>, GrantMdError> {
    let raw = std::fs::read_to_string(path).map_err(|e| GrantMdError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parts = parse_reviewed_markdown(&raw);

    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if parts.text.is_empty() {
        return Ok(Err(DocSkip::EmptyBody { file }));
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Ok(ReviewedRecord {
        document_id: derive_document_id(&stem, config),
        section: config.section_name.clone(),
        heading: parts.heading,
        text: parts.text,
        raw_source: parts.raw_source,
    }))
}

/// Ingest every reviewed `*.md` file under `reviewed_dir` into one JSONL
/// file at `output_path`, filename-sorted, one record per line.
///
/// Empty-body files are dropped with a warning and excluded from the count.
/// No reviewed files at all, or a batch where every file was dropped, is
/// fatal.
pub fn ingest_dir(
    reviewed_dir: &Path,
    output_path: &Path,
    config: &IngestConfig,
) -> Result<IngestStats, GrantMdError> {
    let files = collect_inputs(reviewed_dir, "md")?;
    if files.is_empty() {
        return Err(GrantMdError::NoReviewedFiles {
            dir: reviewed_dir.to_path_buf(),
        });
    }

    let mut stats = IngestStats {
        files_seen: files.len(),
        ..Default::default()
    };
    let mut jsonl = String::new();

    for file in &files {
        match ingest_file(file, config)? {
            Ok(record) => {
                let line = serde_json::to_string(&record)
                    .map_err(|e| GrantMdError::Internal(format!("record serialization: {e}")))?;
                jsonl.push_str(&line);
                jsonl.push('\n');
                stats.records_written += 1;
            }
            Err(skip) => {
                warn!("{skip}");
                stats.skipped.push(skip);
            }
        }
    }

    if stats.records_written == 0 {
        return Err(GrantMdError::EmptyBatch {
            total: stats.files_seen,
        });
    }

    atomic_write(output_path, jsonl.as_bytes())?;
    info!(
        "ingested {}/{} file(s) → {}",
        stats.records_written,
        stats.files_seen,
        output_path.display()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scenario_from_review_round_trip() {
        let parts =
            parse_reviewed_markdown("# Specific Aims\n\nLine one\nstill line one.\n\nLine two.");
        assert_eq!(parts.heading, "# Specific Aims");
        assert_eq!(parts.text, "Line one still line one.\n\nLine two.");
    }

    #[test]
    fn parse_collects_all_heading_lines() {
        let parts = parse_reviewed_markdown("# Specific Aims\nbody a\n## Aim 1\nbody b");
        assert_eq!(parts.heading, "# Specific Aims\n## Aim 1");
        assert_eq!(parts.text, "body a body b");
    }

    #[test]
    fn parse_heading_requires_whitespace_after_hashes() {
        // "#hashtag" is body, not a heading.
        let parts = parse_reviewed_markdown("#tag\n# Real Heading\ntext");
        assert_eq!(parts.heading, "# Real Heading");
        assert!(parts.text.contains("#tag"));
    }

    #[test]
    fn parse_indented_heading_still_counts() {
        let parts = parse_reviewed_markdown("  ## Indented\nbody");
        assert_eq!(parts.heading, "## Indented");
    }

    #[test]
    fn parse_keeps_raw_source_verbatim_minus_trailing_whitespace() {
        let parts = parse_reviewed_markdown("# H\n\nbody\n\n\n");
        assert_eq!(parts.raw_source, "# H\n\nbody");
    }

    #[test]
    fn document_id_strips_suffix_tokens() {
        let c = IngestConfig::default();
        assert_eq!(derive_document_id("R01_smith_2023_specific_aims", &c), "R01_smith_2023");
        assert_eq!(derive_document_id("R01_smith_2023_reviewed", &c), "R01_smith_2023");
        assert_eq!(derive_document_id("R01_smith_2023_aims", &c), "R01_smith_2023");
        assert_eq!(derive_document_id("R01_smith_2023", &c), "R01_smith_2023");
    }

    #[test]
    fn document_id_never_contains_a_token() {
        let c = IngestConfig::default();
        for stem in [
            "a_specific_aims",
            "b_specific_aims_reviewed",
            "c_aims",
            "plain",
        ] {
            let id = derive_document_id(stem, &c);
            for token in &c.suffix_tokens {
                assert!(!id.contains(token.as_str()), "{id:?} contains {token:?}");
            }
        }
    }

    #[test]
    fn ingest_dir_writes_sorted_jsonl_and_drops_empty_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let reviewed = dir.path().join("reviewed");
        std::fs::create_dir(&reviewed).unwrap();
        std::fs::write(
            reviewed.join("b_grant_specific_aims.md"),
            "# Specific Aims\n\nSecond alphabetically.\n",
        )
        .unwrap();
        std::fs::write(
            reviewed.join("a_grant_specific_aims.md"),
            "# Specific Aims\n\nFirst alphabetically.\n",
        )
        .unwrap();
        // Whitespace-only body: dropped, not written.
        std::fs::write(reviewed.join("c_grant_specific_aims.md"), "# Specific Aims\n\n   \n").unwrap();

        let out = dir.path().join("out/reviewed_specific_aims.jsonl");
        let stats = ingest_dir(&reviewed, &out, &IngestConfig::default()).unwrap();

        assert_eq!(stats.files_seen, 3);
        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.skipped.len(), 1);

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ReviewedRecord = serde_json::from_str(lines[0]).unwrap();
        let second: ReviewedRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.document_id, "a_grant");
        assert_eq!(second.document_id, "b_grant");
        assert_eq!(first.section, "Specific Aims");
        assert!(!first.text.is_empty());
    }

    #[test]
    fn ingest_dir_with_no_files_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.jsonl");
        let err = ingest_dir(dir.path(), &out, &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, GrantMdError::NoReviewedFiles { .. }));
    }

    #[test]
    fn ingest_dir_all_dropped_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let reviewed = dir.path().join("reviewed");
        std::fs::create_dir(&reviewed).unwrap();
        std::fs::write(reviewed.join("empty_aims.md"), "# Specific Aims\n").unwrap();

        let out = dir.path().join("out.jsonl");
        let err = ingest_dir(&reviewed, &out, &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, GrantMdError::EmptyBatch { total: 1 }));
        assert!(!out.exists());
    }
}
