//! Paragraph reflow: cosmetic word-wrapping and newline squashing.
//!
//! Two inverse-looking operations live here because they share one contract:
//! neither may alter semantic content or word order.
//!
//! * [`fill`] wraps a paragraph at a column width so the generated review
//!   Markdown is readable in an editor.
//! * [`squash_single_newlines`] heals those wraps (and any accidental
//!   mid-sentence line breaks a reviewer leaves behind) back into continuous
//!   paragraphs before the text is persisted, while keeping author-inserted
//!   blank-line paragraph breaks intact.
//!
//! `squash_single_newlines` is a fixed point: applying it to already-reflowed
//! text returns the same text, so re-ingesting an output file is harmless.

/// Greedy word-wrap at `width` columns.
///
/// Words longer than `width` are placed on their own line rather than
/// broken; the wrap is cosmetic and must never change the word sequence.
pub fn fill(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Join lines into paragraphs: single newlines become spaces, blank lines
/// are kept as paragraph breaks.
///
/// Consecutive non-blank lines are trimmed and joined with a single space.
/// A blank line flushes the pending paragraph; a blank line arriving with
/// nothing pending is preserved as an explicit empty paragraph so deliberate
/// spacer paragraphs survive. A run of such blanks collapses into one marker
/// — the rendered marker spans several source lines, and keeping one marker
/// per run is what makes the operation a fixed point. Leading and trailing
/// empty paragraphs are then stripped and the result joined with double
/// newlines.
pub fn squash_single_newlines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut buf: Vec<&str> = Vec::new();

    // Trailing sentinel blank flushes the last paragraph.
    for line in lines.iter().map(|l| l.as_ref()).chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !buf.is_empty() {
                paragraphs.push(buf.join(" ").trim().to_string());
                buf.clear();
            } else if paragraphs.last().is_some_and(|p| !p.is_empty()) {
                paragraphs.push(String::new());
            }
        } else {
            buf.push(line.trim());
        }
    }

    let first = paragraphs.iter().position(|p| !p.is_empty());
    let last = paragraphs.iter().rposition(|p| !p.is_empty());
    match (first, last) {
        (Some(a), Some(b)) => paragraphs[a..=b].join("\n\n"),
        _ => String::new(),
    }
}
