pub mod extract;
pub mod nodes;
pub mod sections;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::ScrapeError;
use extract::LessonRecord;

/// Elements html5ever synthesizes around any input, content or not.
const SCAFFOLD_TAGS: &[&str] = &["html", "head", "body"];

/// Three-step pipeline: HTML → element tree → sections → lesson record.
///
/// Fails only when the document is empty: no element beyond the scaffold and
/// no text. Every missing field or section falls back to its default instead.
pub fn process_page(html: &str, url: &str) -> Result<LessonRecord, ScrapeError> {
    let doc = Html::parse_document(html);
    if !has_content(&doc) {
        return Err(ScrapeError::EmptyDocument {
            url: url.to_string(),
        });
    }

    let sections = sections::locate_sections(&doc);
    let record = extract::extract_all(url, &doc, &sections);
    debug!(
        url,
        title = %record.title,
        vocab = record.vocabulary.len(),
        transcript_chars = record.transcript.len(),
        "Extracted lesson"
    );
    Ok(record)
}

fn has_content(doc: &Html) -> bool {
    let root = doc.root_element();
    let has_elements = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| !SCAFFOLD_TAGS.contains(&el.value().name()));
    has_elements || root.text().any(|t| !t.trim().is_empty())
}

// ── Tests ──
