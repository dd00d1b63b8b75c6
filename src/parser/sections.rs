use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static EMPHASIS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong, b").unwrap());

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// The parts of a lesson page that the block-level extractors walk.
#[derive(Debug, Default)]
pub struct Sections<'a> {
    pub intro: Option<ElementRef<'a>>,
    pub vocabulary: Option<ElementRef<'a>>,
    pub transcript: Vec<ElementRef<'a>>,
}

/// Locate the intro paragraph, vocabulary paragraph and transcript paragraphs.
pub fn locate_sections(doc: &Html) -> Sections<'_> {
    Sections {
        intro: find_intro(doc),
        vocabulary: find_vocabulary(doc),
        transcript: find_transcript(doc),
    }
}

pub fn is_heading(el: &ElementRef) -> bool {
    HEADING_TAGS.contains(&el.value().name())
}

pub fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>()
}

/// Next sibling that is an element, skipping text and comments.
pub fn next_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

fn next_paragraph<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    next_element(el).filter(|next| next.value().name() == "p")
}

fn find_intro(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&HEADING_SEL)
        .find(|h| text_of(h).to_lowercase().contains("introduction"))
        .and_then(|h| next_paragraph(&h))
}

fn find_vocabulary(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&HEADING_SEL)
        .find(|h| text_of(h).trim().eq_ignore_ascii_case("vocabulary"))
        .and_then(|h| next_paragraph(&h))
}

/// Paragraphs between the TRANSCRIPT marker and the next heading or "Next…" element.
fn find_transcript(doc: &Html) -> Vec<ElementRef<'_>> {
    let Some(start) = transcript_anchor(doc) else {
        return Vec::new();
    };

    let mut paragraphs = Vec::new();
    let mut current = next_element(&start);
    while let Some(el) = current {
        if is_heading(&el) || text_of(&el).trim().starts_with("Next") {
            break;
        }
        if el.value().name() == "p" {
            paragraphs.push(el);
        }
        current = next_element(&el);
    }
    paragraphs
}

/// The element the transcript walk starts after: the paragraph holding a bold
/// "TRANSCRIPT" marker, or failing that a "TRANSCRIPT" heading.
fn transcript_anchor(doc: &Html) -> Option<ElementRef<'_>> {
    let from_emphasis = doc
        .select(&EMPHASIS_SEL)
        .find(|el| mentions_transcript(el))
        .and_then(|el| el.parent().and_then(ElementRef::wrap))
        .filter(|parent| parent.value().name() == "p");

    from_emphasis.or_else(|| doc.select(&HEADING_SEL).find(mentions_transcript))
}

fn mentions_transcript(el: &ElementRef) -> bool {
    text_of(el).to_uppercase().contains("TRANSCRIPT")
}
