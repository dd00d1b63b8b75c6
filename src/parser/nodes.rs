use scraper::{ElementRef, Node};

/// One child of a paragraph-like element, reduced to what the extractors care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Any element other than `<br>`, with its descendant text concatenated.
    Element { name: String, text: String },
    Text(String),
    LineBreak,
}

const EMPHASIS_TAGS: &[&str] = &["strong", "b"];

impl Inline {
    /// Trimmed text of a `<strong>`/`<b>` child, `None` for anything else.
    pub fn emphasis_text(&self) -> Option<&str> {
        match self {
            Inline::Element { name, text } if EMPHASIS_TAGS.contains(&name.as_str()) => {
                Some(text.trim())
            }
            _ => None,
        }
    }

    /// Text as a DOM `textContent` would report it (line breaks contribute nothing).
    pub fn text(&self) -> &str {
        match self {
            Inline::Element { text, .. } | Inline::Text(text) => text,
            Inline::LineBreak => "",
        }
    }
}

/// Classify the direct children of `el`. Comments and other non-content nodes are dropped.
pub fn classify_children(el: ElementRef) -> Vec<Inline> {
    el.children()
        .filter_map(|child| match child.value() {
            Node::Text(t) => Some(Inline::Text(String::from(&**t))),
            Node::Element(e) if e.name() == "br" => Some(Inline::LineBreak),
            Node::Element(e) => {
                let text = ElementRef::wrap(child)
                    .map(|er| er.text().collect::<String>())
                    .unwrap_or_default();
                Some(Inline::Element {
                    name: e.name().to_string(),
                    text,
                })
            }
            _ => None,
        })
        .collect()
}

/// Full `textContent` of a classified paragraph.
pub fn paragraph_text(nodes: &[Inline]) -> String {
    nodes.iter().map(Inline::text).collect()
}

/// Replace non-breaking spaces with plain spaces.
pub fn normalize_nbsp(s: &str) -> String {
    s.replace('\u{a0}', " ")
}
