//! Configuration types for segmentation and review ingestion.
//!
//! All engine behaviour is controlled through [`SegmentConfig`], built via
//! its [`SegmentConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across a batch, log it, and diff two runs to
//! understand why their outputs differ.
//!
//! The two pipeline variants (local `unstructured` partitioning vs. a remote
//! GROBID server) differ only in configuration, not in code: the GROBID
//! variant has no page numbers, so it runs with `require_same_page = false`.

use crate::error::GrantMdError;
use regex::Regex;

/// Default "next major section" markers that terminate Specific Aims
/// extraction. Matched case-insensitively, anchored at the start of the
/// heading text.
pub const DEFAULT_STOP_HEADINGS: &[&str] = &[
    "significance",
    "innovation",
    "approach",
    "research strategy",
    "project summary",
    "abstract",
    "introduction",
    "bibliography",
    "references",
];

/// Configuration for document rendering and section extraction.
///
/// Built via [`SegmentConfig::builder()`] or [`SegmentConfig::default()`].
///
/// # Example
/// ```rust
/// use grant2md::SegmentConfig;
///
/// let config = SegmentConfig::builder()
///     .wrap_width(80)
///     .require_same_page(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Column width for paragraph word-wrapping. Default: 100.
    ///
    /// Purely cosmetic: wrapping never alters content or word order, it only
    /// keeps the review Markdown readable in an editor.
    pub wrap_width: usize,

    /// Headings that mark the next major grant section. Default:
    /// [`DEFAULT_STOP_HEADINGS`].
    pub stop_headings: Vec<String>,

    /// Stop extraction when an element's page differs from the page the
    /// Specific Aims heading was found on. Default: true.
    ///
    /// The aims section of an NIH application is a single page by rule, so
    /// the page cutoff is a reliable guard against parsers that mis-tag the
    /// following section's heading as body text. Disable for element sources
    /// that carry no page numbers (TEI).
    pub require_same_page: bool,

    /// Stop at *any* heading that matches neither the section-start nor the
    /// sub-heading pattern, not just the configured stop set. Default: false.
    ///
    /// The start heading itself counts as accumulated output, so a document
    /// whose aims section is a lone heading still yields that heading line
    /// rather than nothing.
    pub stop_at_any_heading: bool,

    pub(crate) stop_re: Regex,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        // The default stop set is known-good; compilation cannot fail.
        SegmentConfigBuilder::new().build().unwrap()
    }
}

impl SegmentConfig {
    /// Create a new builder for `SegmentConfig`.
    pub fn builder() -> SegmentConfigBuilder {
        SegmentConfigBuilder::new()
    }

    /// The compiled stop-marker pattern (case-insensitive, anchored at the
    /// start of the heading text).
    pub fn stop_pattern(&self) -> &Regex {
        &self.stop_re
    }
}

/// Builder for [`SegmentConfig`].
#[derive(Debug)]
pub struct SegmentConfigBuilder {
    wrap_width: usize,
    stop_headings: Vec<String>,
    require_same_page: bool,
    stop_at_any_heading: bool,
}

impl SegmentConfigBuilder {
    fn new() -> Self {
        Self {
            wrap_width: 100,
            stop_headings: DEFAULT_STOP_HEADINGS.iter().map(|s| s.to_string()).collect(),
            require_same_page: true,
            stop_at_any_heading: false,
        }
    }

    pub fn wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    pub fn stop_headings<I, S>(mut self, headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_headings = headings.into_iter().map(Into::into).collect();
        self
    }

    pub fn require_same_page(mut self, v: bool) -> Self {
        self.require_same_page = v;
        self
    }

    pub fn stop_at_any_heading(mut self, v: bool) -> Self {
        self.stop_at_any_heading = v;
        self
    }

    /// Build the configuration, validating constraints and compiling the
    /// stop-marker pattern once.
    pub fn build(self) -> Result<SegmentConfig, GrantMdError> {
        if self.wrap_width < 20 {
            return Err(GrantMdError::InvalidConfig(format!(
                "wrap width must be ≥ 20, got {}",
                self.wrap_width
            )));
        }
        if self.stop_headings.is_empty() {
            return Err(GrantMdError::InvalidConfig(
                "stop heading set must not be empty".into(),
            ));
        }

        let alternatives = self
            .stop_headings
            .iter()
            .map(|h| regex::escape(h.trim()).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let stop_re = Regex::new(&format!(r"(?i)^(?:{alternatives})\b"))
            .map_err(|e| GrantMdError::InvalidConfig(format!("stop heading pattern: {e}")))?;

        Ok(SegmentConfig {
            wrap_width: self.wrap_width,
            stop_headings: self.stop_headings,
            require_same_page: self.require_same_page,
            stop_at_any_heading: self.stop_at_any_heading,
            stop_re,
        })
    }
}

/// Configuration for reviewed-Markdown ingestion.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Section label stamped on every emitted record. Default: "Specific Aims".
    pub section_name: String,

    /// Filename-stem suffix tokens stripped when deriving `document_id`,
    /// applied in order, each at most once. Order matters:
    /// `_specific_aims` must be tried before `_aims`, which it contains.
    pub suffix_tokens: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            section_name: "Specific Aims".to_string(),
            suffix_tokens: vec![
                "_specific_aims".to_string(),
                "_reviewed".to_string(),
                "_aims".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builds() {
        let c = SegmentConfig::default();
        assert_eq!(c.wrap_width, 100);
        assert!(c.require_same_page);
        assert!(!c.stop_at_any_heading);
    }

    #[test]
    fn stop_pattern_is_anchored_and_case_insensitive() {
        let c = SegmentConfig::default();
        assert!(c.stop_pattern().is_match("Significance"));
        assert!(c.stop_pattern().is_match("RESEARCH  STRATEGY"));
        assert!(c.stop_pattern().is_match("References cited"));
        // Anchored: a mid-line mention is not a stop marker.
        assert!(!c.stop_pattern().is_match("Of great significance"));
        // Word boundary: prefix-only matches are rejected.
        assert!(!c.stop_pattern().is_match("Approaches"));
    }

    #[test]
    fn custom_stop_set() {
        let c = SegmentConfig::builder()
            .stop_headings(["budget justification"])
            .build()
            .unwrap();
        assert!(c.stop_pattern().is_match("Budget   Justification"));
        assert!(!c.stop_pattern().is_match("Significance"));
    }

    #[test]
    fn rejects_tiny_wrap_width() {
        let err = SegmentConfig::builder().wrap_width(5).build().unwrap_err();
        assert!(err.to_string().contains("wrap width"));
    }

    #[test]
    fn rejects_empty_stop_set() {
        let err = SegmentConfig::builder()
            .stop_headings(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("stop heading"));
    }

    #[test]
    fn suffix_token_order_tries_longest_first() {
        let c = IngestConfig::default();
        assert_eq!(c.suffix_tokens[0], "_specific_aims");
        assert_eq!(c.suffix_tokens.last().unwrap(), "_aims");
    }
}
