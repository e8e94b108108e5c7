//! # grant2md
//!
//! Extract structured text from NIH grant PDFs: a whole-document Markdown
//! rendering, the isolated "Specific Aims" section, and a lightweight
//! metadata sidecar — plus the ingestion step that turns human-reviewed
//! Specific Aims Markdown back into clean JSONL records for dataset
//! assembly.
//!
//! ## Why this crate?
//!
//! PDF partitioners are good at classifying text blocks but know nothing
//! about NIH grant structure. The one piece of logic worth getting right is
//! heading-driven segmentation: find the "Specific Aims" heading in the flat
//! element stream, reclassify headings into Markdown depth levels, and stop
//! at the next major section heading or page break. The PDF parsing itself
//! is delegated — either to a local `unstructured` partitioning run (this
//! crate consumes its JSON dump) or to a remote GROBID server.
//!
//! ## Pipeline Overview
//!
//! ```text
//! grant PDF
//!  │
//!  ├─ external parse   unstructured JSON dump  ─or─  GROBID TEI-XML
//!  ├─ 1. Adapt         reduce parser categories to heading/body elements
//!  ├─ 2. Segment       full Markdown + Specific Aims section + boundary
//!  ├─ 3. Sidecar       scrape cover-page metadata, checksum, YAML
//!  │         (human review of the aims Markdown happens here)
//!  └─ 4. Ingest        reflow reviewed Markdown → one JSONL record each
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use grant2md::{extract_document, ParsedDocument, Element, SegmentConfig};
//!
//! let doc = ParsedDocument::new(
//!     "R01_smith_2023",
//!     vec![
//!         Element::heading("Specific Aims", Some(1)),
//!         Element::body("Aim 1. Do X."),
//!         Element::heading("Significance", Some(1)),
//!     ],
//! );
//! let out = extract_document(&doc, "R01_smith_2023.json", &SegmentConfig::default());
//! assert_eq!(out.aims_markdown.as_deref(), Some("## Specific Aims\n\nAim 1. Do X.\n"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `grant2md` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! grant2md = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod element;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{IngestConfig, SegmentConfig, SegmentConfigBuilder, DEFAULT_STOP_HEADINGS};
pub use element::{Element, ElementKind, ParsedDocument};
pub use error::{DocSkip, GrantMdError};
pub use extract::{extract_batch, extract_document, extract_file, DataLayout, ExtractOutput};
pub use ingest::{derive_document_id, ingest_dir, ingest_file, parse_reviewed_markdown, ReviewedParts};
pub use output::{ExtractStats, IngestStats, ReviewedRecord};
pub use pipeline::grobid::{fetch_tei, parse_pdf, tei_to_elements, DEFAULT_GROBID_URL};
pub use pipeline::metadata::{sha256_of, GrantMetadata};
pub use pipeline::segment::{extract_aims, orphan_aims_headings, render_document, SectionExtract};
pub use pipeline::unstructured::{elements_from_json, load_document};
