//! Pipeline stages for grant-document ingestion.
//!
//! Each submodule implements exactly one transformation step. The adapters
//! own every parser-specific detail; the engine modules only ever see the
//! neutral element sequence.
//!
//! ## Data Flow
//!
//! ```text
//! unstructured JSON ─┐
//!                    ├──▶ elements ──▶ segment ──▶ Markdown artifacts
//! PDF ──▶ grobid ────┘                   │
//!                                     metadata ──▶ YAML sidecar
//!
//! reviewed Markdown ──▶ reflow ──▶ JSONL records
//! ```
//!
//! 1. [`unstructured`] — deserialise a partitioner element dump
//! 2. [`grobid`]       — remote TEI conversion; the only stage with network I/O
//! 3. [`segment`]      — heading-driven rendering and Specific Aims extraction
//! 4. [`reflow`]       — word-wrapping and newline squashing
//! 5. [`metadata`]     — cover-page field scrape, checksum, YAML sidecar

pub mod grobid;
pub mod metadata;
pub mod reflow;
pub mod segment;
pub mod unstructured;
