//! Extraction orchestration: element dump → Markdown + metadata artifacts.
//!
//! Ties the adapter, engine, and metadata scrape together for one document
//! or a directory of documents. All paths flow from an explicit
//! [`DataLayout`]; nothing here consults the working directory or any
//! process-global constant.

use crate::config::SegmentConfig;
use crate::element::ParsedDocument;
use crate::error::{DocSkip, GrantMdError};
use crate::output::ExtractStats;
use crate::pipeline::metadata::{sha256_of, GrantMetadata};
use crate::pipeline::{segment, unstructured};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where extraction artifacts land under a data root.
///
/// The numbered directory names mirror the corpus convention: reviewers work
/// through the stages in order.
#[derive(Debug, Clone)]
pub struct DataLayout {
    /// Whole-document Markdown renderings.
    pub full_md_dir: PathBuf,
    /// Isolated Specific Aims Markdown, one file per found section.
    pub aims_dir: PathBuf,
    /// YAML metadata sidecars.
    pub metadata_dir: PathBuf,
}

impl DataLayout {
    /// The standard layout under a data root.
    pub fn under(root: &Path) -> Self {
        Self {
            full_md_dir: root.join("02_full_md"),
            aims_dir: root.join("03_specific_aims_md"),
            metadata_dir: root.join("metadata"),
        }
    }
}

/// In-memory result of extracting one document.
#[derive(Debug, Clone)]
pub struct ExtractOutput {
    pub document_id: String,
    /// Whole-document Markdown rendering.
    pub full_markdown: String,
    /// Specific Aims rendering, absent when no section heading was found.
    pub aims_markdown: Option<String>,
    pub metadata: GrantMetadata,
}

/// Run the engine over one parsed document. Pure: no I/O.
pub fn extract_document(
    doc: &ParsedDocument,
    source: &str,
    config: &SegmentConfig,
) -> ExtractOutput {
    let full_markdown = segment::render_document(doc, config);
    let aims_markdown = segment::extract_aims(doc, config).map(|s| s.markdown);
    let metadata = GrantMetadata::scrape(&doc.document_id, source, &doc.elements);

    ExtractOutput {
        document_id: doc.document_id.clone(),
        full_markdown,
        aims_markdown,
        metadata,
    }
}

/// Extract one element dump and write its artifacts.
///
/// Returns the skip marker instead of an error when the document has no
/// Specific Aims heading; the full rendering and metadata are still written.
pub fn extract_file(
    path: &Path,
    layout: &DataLayout,
    config: &SegmentConfig,
) -> Result<Option<DocSkip>, GrantMdError> {
    let doc = unstructured::load_document(path)?;
    let mut out = extract_document(&doc, &path.display().to_string(), config);
    out.metadata.sha256 = sha256_of(path).map_err(|e| GrantMdError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let id = &out.document_id;
    atomic_write(
        &layout.full_md_dir.join(format!("{id}.md")),
        out.full_markdown.as_bytes(),
    )?;
    atomic_write(
        &layout.metadata_dir.join(format!("{id}.yml")),
        out.metadata.to_yaml().as_bytes(),
    )?;

    match out.aims_markdown {
        Some(md) => {
            atomic_write(
                &layout.aims_dir.join(format!("{id}_specific_aims.md")),
                md.as_bytes(),
            )?;
            info!("extracted Specific Aims for {id}");
            Ok(None)
        }
        None => Ok(Some(DocSkip::SectionNotFound {
            document_id: id.clone(),
        })),
    }
}

/// Extract a single dump or every `*.json` dump in a directory.
///
/// A missing Specific Aims section warns and continues — the full rendering
/// and metadata sidecar are still written for that document, so the batch
/// always produces output. Only entirely absent input is fatal.
pub fn extract_batch(
    input: &Path,
    layout: &DataLayout,
    config: &SegmentConfig,
) -> Result<ExtractStats, GrantMdError> {
    let files = collect_inputs(input, "json")?;
    if files.is_empty() {
        return Err(GrantMdError::NoElementFiles {
            dir: input.to_path_buf(),
        });
    }

    let mut stats = ExtractStats {
        documents_seen: files.len(),
        ..Default::default()
    };

    for file in &files {
        match extract_file(file, layout, config)? {
            None => stats.aims_written += 1,
            Some(skip) => {
                warn!("{skip}");
                stats.skipped.push(skip);
            }
        }
    }

    Ok(stats)
}

/// A file input is itself; a directory input is its matching files,
/// filename-sorted for stable batch order.
pub fn collect_inputs(input: &Path, ext: &str) -> Result<Vec<PathBuf>, GrantMdError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(GrantMdError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input)
        .map_err(|e| GrantMdError::ReadFailed {
            path: input.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == ext))
        .collect();
    files.sort();
    Ok(files)
}

/// Write a whole artifact atomically: temp file in the target directory,
/// then rename, so readers never observe a partial file.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), GrantMdError> {
    let fail = |source: std::io::Error| GrantMdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents).map_err(fail)?;
    std::fs::rename(&tmp, path).map_err(fail)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn aims_doc() -> ParsedDocument {
        ParsedDocument::new(
            "R01_smith_2023",
            vec![
                Element::heading("Project Title: Example", Some(1)).on_page(1),
                Element::heading("Specific Aims", Some(1)).on_page(3),
                Element::body("We propose things.").on_page(3),
                Element::heading("Significance", Some(1)).on_page(4),
            ],
        )
    }

    #[test]
    fn extract_document_produces_both_renderings() {
        let out = extract_document(&aims_doc(), "R01_smith_2023.json", &SegmentConfig::default());
        assert!(out.full_markdown.contains("# Project Title: Example"));
        assert!(out.full_markdown.contains("# Significance"));
        let aims = out.aims_markdown.expect("aims present");
        assert!(aims.starts_with("## Specific Aims"));
        assert!(!aims.contains("Significance"));
    }

    #[test]
    fn extract_document_without_aims_has_none() {
        let doc = ParsedDocument::new("x", vec![Element::body("just text")]);
        let out = extract_document(&doc, "x.json", &SegmentConfig::default());
        assert!(out.aims_markdown.is_none());
        assert!(out.full_markdown.contains("just text"));
    }

    #[test]
    fn layout_under_root() {
        let l = DataLayout::under(Path::new("/data"));
        assert_eq!(l.full_md_dir, Path::new("/data/02_full_md"));
        assert_eq!(l.aims_dir, Path::new("/data/03_specific_aims_md"));
        assert_eq!(l.metadata_dir, Path::new("/data/metadata"));
    }

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/out.md");
        atomic_write(&target, b"hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello\n");
        assert!(!target.with_extension("tmp").exists());
    }

    #[test]
    fn collect_inputs_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }
        let files = collect_inputs(dir.path(), "json").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn missing_input_is_not_found() {
        let err = collect_inputs(Path::new("/no/such/dir"), "json").unwrap_err();
        assert!(matches!(err, GrantMdError::InputNotFound { .. }));
    }
}
