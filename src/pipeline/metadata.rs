//! Lightweight grant metadata scraped from the cover pages.
//!
//! NIH cover pages carry a predictable set of labelled fields (principal
//! investigator, applicant organization, project title, …). A handful of
//! crude regexes over the first few dozen elements recovers enough of them
//! for corpus bookkeeping; anything the patterns miss simply stays absent.
//! This is bookkeeping, not extraction quality — the YAML sidecar exists so
//! a reviewer can tell grants apart without opening the PDFs.

use crate::element::Element;
use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// How many leading elements count as "cover page" for the scrape.
const COVER_ELEMENTS: usize = 40;

static PI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)principal investigator[:\s]*([\w ,.-]+)").unwrap());
static INSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:applicant|performance) organization[:\s]*([\w ,.-]+)").unwrap()
});
static PROJECT_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)project title[:\s]*(.+)").unwrap());
static PROJECT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)project number[:\s]*(\w{2,}-\w{2,}-\w{6,})").unwrap());
static IC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:issuing)?\s?ic[:\s]*([A-Z]{2,4})\b").unwrap());
static FY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)fiscal year[:\s]*(\d{4})").unwrap());

/// Per-document metadata record, rendered as a YAML sidecar file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantMetadata {
    pub grant_id: String,
    pub source: String,
    pub sha256: String,
    pub extracted_at: String,
    pub pi: Option<String>,
    pub institution: Option<String>,
    pub project_title: Option<String>,
    pub project_number: Option<String>,
    pub ic: Option<String>,
    pub fy: Option<String>,
}

impl GrantMetadata {
    /// Scrape the cover-page fields from the leading elements.
    pub fn scrape(grant_id: &str, source: &str, elements: &[Element]) -> Self {
        let cover: String = elements
            .iter()
            .take(COVER_ELEMENTS)
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let field = |re: &Regex| {
            re.captures(&cover)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            grant_id: grant_id.to_string(),
            source: source.to_string(),
            sha256: String::new(),
            extracted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            pi: field(&PI),
            institution: field(&INSTITUTION),
            project_title: field(&PROJECT_TITLE),
            project_number: field(&PROJECT_NUMBER),
            ic: field(&IC),
            fy: field(&FY),
        }
    }

    /// Render as a small YAML document, keys in declaration order, absent
    /// fields omitted.
    pub fn to_yaml(&self) -> String {
        let mut yaml = String::new();
        yaml.push_str(&format!("grant_id: {}\n", yaml_scalar(&self.grant_id)));
        yaml.push_str(&format!("source: {}\n", yaml_scalar(&self.source)));
        yaml.push_str(&format!("sha256: {}\n", yaml_scalar(&self.sha256)));
        yaml.push_str(&format!(
            "extracted_at: {}\n",
            yaml_scalar(&self.extracted_at)
        ));
        for (key, value) in [
            ("pi", &self.pi),
            ("institution", &self.institution),
            ("project_title", &self.project_title),
            ("project_number", &self.project_number),
            ("ic", &self.ic),
            ("fy", &self.fy),
        ] {
            if let Some(v) = value {
                yaml.push_str(&format!("{key}: {}\n", yaml_scalar(v)));
            }
        }
        yaml
    }
}

/// Quote a scalar when YAML would otherwise mangle it.
fn yaml_scalar(s: &str) -> String {
    let needs_quoting = s.is_empty()
        || s.contains(':')
        || s.contains('#')
        || s.contains('"')
        || s.starts_with(['\'', '&', '*', '-', '?', '[', ']', '{', '}', ' '])
        || s.ends_with(' ');
    if needs_quoting {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

/// SHA-256 of a file, streamed in 8 KiB chunks.
pub fn sha256_of(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
