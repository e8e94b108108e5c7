//! Adapter for `unstructured` partitioner output.
//!
//! The `unstructured` Python library partitions a PDF into a JSON array of
//! typed elements. That array — not the PDF — is this crate's input for the
//! local-parsing variant of the pipeline. The adapter deserializes the dump
//! and reduces each parser category to the two-way [`ElementKind`]
//! classification the engine consumes, so no other module ever sees the
//! parser's vocabulary.

use crate::element::{Element, ElementKind, ParsedDocument};
use crate::error::GrantMdError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// One element as serialized by `unstructured`'s `to_dict()`.
///
/// Only the fields the engine needs are modelled; everything else in the
/// dump (coordinates, detection probabilities, …) is ignored.
#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    category: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    section_depth: Option<u32>,
}

/// Deserialize an element dump into the engine's element sequence.
pub fn elements_from_json(json: &str) -> Result<Vec<Element>, serde_json::Error> {
    let raw: Vec<RawElement> = serde_json::from_str(json)?;
    Ok(raw.into_iter().map(reduce).collect())
}

/// Load a document from an element dump on disk. The document id is the
/// file stem.
pub fn load_document(path: &Path) -> Result<ParsedDocument, GrantMdError> {
    let json = std::fs::read_to_string(path).map_err(|e| GrantMdError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let elements =
        elements_from_json(&json).map_err(|e| GrantMdError::InvalidElementJson {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let document_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    debug!(%document_id, count = elements.len(), "loaded element dump");

    Ok(ParsedDocument::new(document_id, elements))
}

fn reduce(raw: RawElement) -> Element {
    Element {
        kind: ElementKind::from_category(&raw.category),
        text: raw.text,
        page_number: raw.metadata.page_number,
        nesting_depth: raw.metadata.section_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_typical_dump() {
        let json = r#"[
            {"type": "Title", "text": "Specific Aims",
             "metadata": {"page_number": 3, "section_depth": 1}},
            {"type": "NarrativeText", "text": "We propose to…",
             "metadata": {"page_number": 3}},
            {"type": "ListItem", "text": "Aim 1. Do X.",
             "metadata": {"page_number": 3}}
        ]"#;
        let els = elements_from_json(json).unwrap();
        assert_eq!(els.len(), 3);
        assert!(els[0].is_heading());
        assert_eq!(els[0].page_number, Some(3));
        assert_eq!(els[0].nesting_depth, Some(1));
        assert!(!els[1].is_heading());
        assert!(!els[2].is_heading());
    }

    #[test]
    fn missing_fields_default() {
        let json = r#"[{"type": "Header"}]"#;
        let els = elements_from_json(json).unwrap();
        assert!(els[0].is_heading());
        assert_eq!(els[0].text, "");
        assert_eq!(els[0].page_number, None);
        assert_eq!(els[0].nesting_depth, None);
    }

    #[test]
    fn unknown_metadata_fields_are_ignored() {
        let json = r#"[{"type": "NarrativeText", "text": "x",
            "metadata": {"page_number": 1, "coordinates": {"points": []}}}]"#;
        assert!(elements_from_json(json).is_ok());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(elements_from_json("{not json").is_err());
    }
}
