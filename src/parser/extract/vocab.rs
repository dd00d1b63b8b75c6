use serde::{Deserialize, Serialize};

use crate::parser::nodes::{normalize_nbsp, Inline};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub term: String,
    pub definition: String,
}

/// Bold runs inside the vocabulary paragraph that are section labels, not terms.
const SECTION_TOKENS: &[&str] = &["TRANSCRIPT", "INTRODUCTION", "VOCABULARY", "NEXT"];

/// Accumulator for the left fold over the vocabulary paragraph's children.
#[derive(Debug, Default)]
struct VocabFold {
    term: Option<String>,
    definition: Option<String>,
    entries: Vec<VocabEntry>,
}

impl VocabFold {
    fn step(mut self, node: &Inline) -> Self {
        match node {
            Inline::Element { .. } => {
                if let Some(label) = node.emphasis_text() {
                    self.commit();
                    self.term = Some(label.to_string()).filter(|t| is_term(t));
                }
            }
            Inline::LineBreak => {}
            Inline::Text(text) => {
                let clean = normalize_nbsp(text);
                let clean = clean.trim();
                if self.term.is_some() && !clean.is_empty() {
                    self.definition = Some(clean.to_string());
                }
            }
        }
        self
    }

    /// Push the pending pair if both halves are present, then clear it.
    fn commit(&mut self) {
        if let (Some(term), Some(definition)) = (self.term.take(), self.definition.take()) {
            self.entries.push(VocabEntry { term, definition });
        }
    }

    fn finish(mut self) -> Vec<VocabEntry> {
        self.commit();
        self.entries
    }
}

fn is_term(label: &str) -> bool {
    let upper = label.to_uppercase();
    !label.is_empty()
        && !SECTION_TOKENS.iter().any(|t| upper.starts_with(t))
        && !upper.starts_with("NOTE:")
}

/// Pair each bold term with the last non-empty text run before the next bold term.
pub fn parse_vocabulary(nodes: &[Inline]) -> Vec<VocabEntry> {
    nodes
        .iter()
        .fold(VocabFold::default(), VocabFold::step)
        .finish()
}
