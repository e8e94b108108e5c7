//! The element model shared by every parser adapter.
//!
//! Upstream PDF parsers emit rich, parser-specific category vocabularies
//! (`Title`, `Header`, `NarrativeText`, `ListItem`, TEI `<head>`/`<p>`, …).
//! The segmentation engine only ever needs to know one thing about an
//! element: is it a heading or is it body text? Reducing the vocabulary to
//! [`ElementKind`] at the adapter boundary keeps every downstream stage
//! independent of which parser produced the sequence.

use serde::{Deserialize, Serialize};

/// Two-way classification of a parsed text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Heading-like: section titles, running heads.
    Heading,
    /// Body-like: narrative paragraphs, list items, captions, everything else.
    Body,
}

impl ElementKind {
    /// Reduce a parser category label to heading-vs-body.
    ///
    /// `Title`, `Header` and `Section` (and `Title`-prefixed variants some
    /// partitioner versions emit, e.g. `TitleText`) count as headings;
    /// every other label is body text.
    pub fn from_category(category: &str) -> Self {
        let c = category.trim();
        if c.starts_with("Title")
            || c.eq_ignore_ascii_case("title")
            || c.eq_ignore_ascii_case("header")
            || c.eq_ignore_ascii_case("section")
        {
            ElementKind::Heading
        } else {
            ElementKind::Body
        }
    }

    pub fn is_heading(self) -> bool {
        matches!(self, ElementKind::Heading)
    }
}

/// One atomic unit of parsed document content.
///
/// Elements are immutable once produced by a parser adapter; the engine only
/// filters and reclassifies them for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Raw display text. May be empty or whitespace-only; such elements are
    /// skipped at render time.
    pub text: String,
    /// Heading-like vs body-like.
    pub kind: ElementKind,
    /// 1-indexed page the element was found on, when the parser knows it.
    /// TEI output carries no page numbers.
    pub page_number: Option<u32>,
    /// Generic heading nesting depth (1 = top level). Only meaningful for
    /// headings; defaults to 1 when absent.
    pub nesting_depth: Option<u32>,
}

impl Element {
    /// A heading element at the given depth.
    pub fn heading(text: impl Into<String>, depth: Option<u32>) -> Self {
        Self {
            text: text.into(),
            kind: ElementKind::Heading,
            page_number: None,
            nesting_depth: depth,
        }
    }

    /// A body element.
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ElementKind::Body,
            page_number: None,
            nesting_depth: None,
        }
    }

    /// Same element pinned to a page number. Builder-style, used by adapters
    /// and tests.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }

    pub fn is_heading(&self) -> bool {
        self.kind.is_heading()
    }

    /// Display text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// An ordered element sequence for one source file.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Stable identifier derived from the source filename stem.
    pub document_id: String,
    pub elements: Vec<Element>,
}

impl ParsedDocument {
    pub fn new(document_id: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            document_id: document_id.into(),
            elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_reduction() {
        assert_eq!(ElementKind::from_category("Title"), ElementKind::Heading);
        assert_eq!(ElementKind::from_category("Header"), ElementKind::Heading);
        assert_eq!(ElementKind::from_category("Section"), ElementKind::Heading);
        assert_eq!(ElementKind::from_category("TitleText"), ElementKind::Heading);
        assert_eq!(
            ElementKind::from_category("NarrativeText"),
            ElementKind::Body
        );
        assert_eq!(ElementKind::from_category("ListItem"), ElementKind::Body);
        assert_eq!(ElementKind::from_category("Table"), ElementKind::Body);
        assert_eq!(ElementKind::from_category(""), ElementKind::Body);
    }

    #[test]
    fn category_reduction_is_case_insensitive_for_known_labels() {
        assert_eq!(ElementKind::from_category("title"), ElementKind::Heading);
        assert_eq!(ElementKind::from_category("HEADER"), ElementKind::Heading);
    }

    #[test]
    fn trimmed_strips_whitespace() {
        let el = Element::body("  hello \n");
        assert_eq!(el.trimmed(), "hello");
    }
}
