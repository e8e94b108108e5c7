//! Adapter for the GROBID document-conversion service.
//!
//! The remote variant of the pipeline: a PDF is POSTed to a GROBID server's
//! `processFulltextDocument` endpoint, which answers with TEI-XML. The TEI
//! `<head>` and `<p>` nodes — from any part of the document, in document
//! order — become the same element sequence the local adapter produces, so
//! everything downstream of the adapters is shared.
//!
//! TEI carries no page numbers, which is why this variant runs the engine
//! with the same-page cutoff disabled.

use crate::element::{Element, ElementKind, ParsedDocument};
use crate::error::GrantMdError;
use crate::pipeline::segment::is_aims_heading;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, info};

/// Default GROBID server base URL.
pub const DEFAULT_GROBID_URL: &str = "http://localhost:8070";

/// How much of an upstream error body to carry into the error message.
const ERROR_BODY_LIMIT: usize = 400;

/// POST a PDF to GROBID and return the raw TEI-XML.
///
/// No retry and no timeout beyond the client defaults: an upstream failure
/// is fatal for this document and is propagated with the upstream status and
/// message verbatim.
pub async fn fetch_tei(pdf_path: &Path, base_url: &str) -> Result<String, GrantMdError> {
    let endpoint = format!(
        "{}/api/processFulltextDocument",
        base_url.trim_end_matches('/')
    );
    info!("sending {} to GROBID at {}", pdf_path.display(), endpoint);

    let bytes = tokio::fs::read(pdf_path)
        .await
        .map_err(|e| GrantMdError::ReadFailed {
            path: pdf_path.to_path_buf(),
            source: e,
        })?;

    let file_name = pdf_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input.pdf".to_string());
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("application/pdf")
        .map_err(|e| GrantMdError::Internal(e.to_string()))?;
    let form = reqwest::multipart::Form::new().part("input", part);

    let response = reqwest::Client::new()
        .post(&endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|e| GrantMdError::GrobidTransport {
            url: endpoint.clone(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GrantMdError::GrobidTransport {
            url: endpoint,
            reason: e.to_string(),
        })?;

    if !status.is_success() {
        return Err(GrantMdError::GrobidStatus {
            status: status.as_u16(),
            body: truncate(&body, ERROR_BODY_LIMIT),
        });
    }

    Ok(body)
}

/// Convert one PDF via GROBID into the engine's element sequence.
pub async fn parse_pdf(pdf_path: &Path, base_url: &str) -> Result<ParsedDocument, GrantMdError> {
    let tei = fetch_tei(pdf_path, base_url).await?;
    let elements = tei_to_elements(&tei)?;
    debug!(count = elements.len(), "TEI yielded elements");

    let document_id = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    Ok(ParsedDocument::new(document_id, elements))
}

/// Walk TEI-XML into elements.
///
/// `<head>` nodes become headings, `<p>` nodes body text, each with all
/// nested text concatenated. Heading nesting depth is one plus the number of
/// ancestor `<div>` elements; a head matching the Specific Aims pattern is
/// promoted to depth 1 so the section always surfaces as a top-level heading
/// in the rendering.
pub fn tei_to_elements(tei: &str) -> Result<Vec<Element>, GrantMdError> {
    let mut reader = Reader::from_str(tei);
    let mut elements: Vec<Element> = Vec::new();
    let mut div_depth: u32 = 0;
    // (tag local name, accumulated text, div depth at open)
    let mut capture: Option<(Vec<u8>, String, u32)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();
                match local.as_slice() {
                    b"div" => div_depth += 1,
                    b"head" | b"p" if capture.is_none() => {
                        capture = Some((local, String::new(), div_depth));
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let local = e.local_name().as_ref().to_vec();
                if local == b"div" {
                    div_depth = div_depth.saturating_sub(1);
                }
                if matches!(capture, Some((ref tag, _, _)) if *tag == local) {
                    if let Some((tag, text, depth)) = capture.take() {
                        push_element(&mut elements, &tag, text, depth);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some((_, ref mut text, _)) = capture {
                    let chunk = e
                        .unescape()
                        .map_err(|err| GrantMdError::TeiParse(err.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(GrantMdError::TeiParse(err.to_string())),
        }
    }

    Ok(elements)
}

fn push_element(elements: &mut Vec<Element>, tag: &[u8], text: String, div_depth: u32) {
    let text = text.trim().to_string();
    if text.is_empty() {
        return;
    }
    if tag == b"head" {
        // Promote the section of interest to the top level.
        let depth = if is_aims_heading(&text) { 1 } else { div_depth + 1 };
        elements.push(Element {
            text,
            kind: ElementKind::Heading,
            page_number: None,
            nesting_depth: Some(depth),
        });
    } else {
        elements.push(Element {
            text,
            kind: ElementKind::Body,
            page_number: None,
            nesting_depth: None,
        });
    }
}

fn truncate(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        s.to_string()
    } else {
        let mut end = limit;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader><fileDesc><titleStmt>
    <title>R01 Example</title>
  </titleStmt></fileDesc></teiHeader>
  <text>
    <body>
      <div>
        <head>Specific Aims</head>
        <p>We propose to <hi rend="italic">define</hi> the mechanism.</p>
        <div>
          <head>Aim 1</head>
          <p>First aim body.</p>
        </div>
      </div>
      <div>
        <head>Significance</head>
        <p>Why it matters.</p>
      </div>
    </body>
  </text>
</TEI>"#;

    #[test]
    fn heads_and_paragraphs_in_document_order() {
        let els = tei_to_elements(TEI).unwrap();
        let texts: Vec<&str> = els.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Specific Aims",
                "We propose to define the mechanism.",
                "Aim 1",
                "First aim body.",
                "Significance",
                "Why it matters.",
            ]
        );
    }

    #[test]
    fn nested_markup_text_is_flattened() {
        let els = tei_to_elements(TEI).unwrap();
        assert_eq!(els[1].text, "We propose to define the mechanism.");
        assert!(!els[1].is_heading());
    }

    #[test]
    fn div_nesting_sets_heading_depth() {
        let els = tei_to_elements(TEI).unwrap();
        // "Aim 1" sits under two divs.
        let aim1 = els.iter().find(|e| e.text == "Aim 1").unwrap();
        assert_eq!(aim1.nesting_depth, Some(3));
        let sig = els.iter().find(|e| e.text == "Significance").unwrap();
        assert_eq!(sig.nesting_depth, Some(2));
    }

    #[test]
    fn aims_head_is_promoted_to_top_level() {
        let els = tei_to_elements(TEI).unwrap();
        let aims = els.iter().find(|e| e.text == "Specific Aims").unwrap();
        assert_eq!(aims.nesting_depth, Some(1));
        assert!(aims.is_heading());
    }

    #[test]
    fn tei_has_no_page_numbers() {
        let els = tei_to_elements(TEI).unwrap();
        assert!(els.iter().all(|e| e.page_number.is_none()));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = tei_to_elements("<TEI><head>mismatched</p></TEI>").unwrap_err();
        assert!(matches!(err, GrantMdError::TeiParse(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(300);
        let t = truncate(&s, 401);
        assert!(t.len() <= 405);
        assert!(t.ends_with('…'));
    }
}
