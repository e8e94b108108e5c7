//! Heading-driven section segmentation.
//!
//! This is the heart of the pipeline: given the flat, ordered element
//! sequence a parser adapter produced, render the whole grant as Markdown
//! and isolate the "Specific Aims" section.
//!
//! ## Why heading-driven?
//!
//! NIH applications have no machine-readable section markers; the only
//! reliable signal is the heading text itself. "Specific Aims" opens the
//! section, numbered "Aim N" headings subdivide it, and the next major
//! section heading ("Significance", "Approach", …) closes it. Because the
//! aims section is one page by NIH rule, the page number of the start
//! heading doubles as a stop condition for parsers that mis-classify the
//! following heading as body text.

use crate::config::SegmentConfig;
use crate::element::{Element, ParsedDocument};
use crate::pipeline::reflow::fill;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Matches the section-start heading ("Specific Aims", "SPECIFIC AIM").
static AIMS_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bspecific\s+aims?\b").unwrap());

/// Matches numbered sub-headings within the section ("Aim 1", "Specific Aim 2:").
static AIM_SUBHEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:specific\s+)?aim\s*\d+\b").unwrap());

/// Does this text open the Specific Aims section?
pub fn is_aims_heading(text: &str) -> bool {
    AIMS_HEAD.is_match(text)
}

/// Is this text a numbered aim sub-heading?
pub fn is_aim_subheading(text: &str) -> bool {
    AIM_SUBHEAD.is_match(text)
}

/// The extracted Specific Aims section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionExtract {
    /// Index of the matched section-start heading.
    pub start: usize,
    /// Index one past the last consumed element (half-open `[start, end)`).
    pub end: usize,
    /// Page the start heading was found on, when known.
    pub aims_page: Option<u32>,
    /// Rendered Markdown, heading levels 2–3 only, ending in one newline.
    pub markdown: String,
}

/// Render the whole document as Markdown.
///
/// One content line per non-empty element — headings at depth
/// `min(4, nesting_depth)` (default 1), body text wrapped at the configured
/// width — each followed by a blank separator line. Empty or whitespace-only
/// elements produce no output at all.
pub fn render_document(doc: &ParsedDocument, config: &SegmentConfig) -> String {
    let mut lines: Vec<String> = Vec::new();

    for el in &doc.elements {
        let txt = el.trimmed();
        if txt.is_empty() {
            continue;
        }
        if el.is_heading() {
            let depth = el.nesting_depth.unwrap_or(1).clamp(1, 4) as usize;
            lines.push(format!("{} {}", "#".repeat(depth), txt));
        } else {
            lines.push(fill(txt, config.wrap_width));
        }
        lines.push(String::new());
    }

    finish(lines)
}

/// Locate and render the Specific Aims section.
///
/// Scans for the first heading matching the section-start pattern. Returns
/// `None` when no such heading exists — the caller decides whether that is
/// fatal. From the start heading, elements are consumed in order until a
/// stop condition fires; the stopping element itself is excluded:
///
/// 1. a heading matching the configured next-section markers that is not
///    itself an aims heading or aim sub-heading;
/// 2. with `require_same_page`, any element on a different page than the
///    start heading;
/// 3. with `stop_at_any_heading`, any non-aims heading — but only once
///    output has accumulated, so a lone-heading document is not cut short.
pub fn extract_aims(doc: &ParsedDocument, config: &SegmentConfig) -> Option<SectionExtract> {
    let start = doc.elements.iter().position(|el| {
        el.is_heading() && is_aims_heading(&el.text)
    })?;
    let aims_page = doc.elements[start].page_number;
    debug!(
        document_id = %doc.document_id,
        start, page = ?aims_page,
        "found Specific Aims heading"
    );

    let mut lines: Vec<String> = Vec::new();
    let mut end = start;

    for (i, el) in doc.elements.iter().enumerate().skip(start) {
        let txt = el.trimmed();
        if txt.is_empty() {
            end = i + 1;
            continue;
        }

        let aims_like = is_aims_heading(txt) || is_aim_subheading(txt);
        if el.is_heading() && !aims_like {
            if config.stop_pattern().is_match(txt) {
                break;
            }
            if config.stop_at_any_heading && !lines.is_empty() {
                break;
            }
        }
        if config.require_same_page && aims_page.is_some() && el.page_number != aims_page {
            break;
        }

        if el.is_heading() {
            if aims_like {
                lines.push(format!("## {txt}"));
            } else {
                lines.push(format!("### {txt}"));
            }
        } else {
            lines.push(fill(txt, config.wrap_width));
        }
        lines.push(String::new());
        end = i + 1;
    }

    Some(SectionExtract {
        start,
        end,
        aims_page,
        markdown: finish(lines),
    })
}

/// Report aims headings not followed by body text.
///
/// For every element whose entire text is a "Specific Aims" heading, look
/// ahead up to five elements for a non-empty body element. Returns the
/// indices of headings where none was found — a strong hint the parser
/// dropped the section body and the document needs manual review.
pub fn orphan_aims_headings(elements: &[Element]) -> Vec<usize> {
    static EXACT_AIMS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^specific\s+aims?$").unwrap());

    let mut orphans = Vec::new();
    for (i, el) in elements.iter().enumerate() {
        if !EXACT_AIMS.is_match(el.trimmed()) {
            continue;
        }
        let followed = elements[i + 1..]
            .iter()
            .take(5)
            .any(|next| !next.is_heading() && !next.trimmed().is_empty());
        if !followed {
            orphans.push(i);
        }
    }
    orphans
}

/// Join rendered lines, trimming the trailing separator and ensuring the
/// text ends with exactly one newline. Empty input renders as empty.
fn finish(lines: Vec<String>) -> String {
    let joined = lines.join("\n");
    let trimmed = joined.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
