use std::sync::LazyLock;

use regex::Regex;

use crate::markup::speaker_line;
use crate::parser::nodes::{normalize_nbsp, paragraph_text, Inline};

/// Bold runs this long or longer are always inline emphasis.
const MAX_SPEAKER_LEN: usize = 30;
/// Speaker labels never contain a dash used as punctuation.
const LABEL_DASHES: &[char] = &['\u{2013}', '\u{2014}'];
/// Characters after which no space is inserted behind a bold run.
const TIGHT_FOLLOWERS: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '-', '\u{2013}', '\u{2014}', ')', '/',
];

static LEADING_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s+").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Whether a bold run is a speaker label rather than inline emphasis.
///
/// `label` is the trimmed text of the bold run, `rest` the siblings after it.
/// A label is short, has no dash, and is followed by a line break, optionally
/// after one whitespace-only text node.
pub fn is_speaker_label(label: &str, rest: &[Inline]) -> bool {
    let followed_by_break = match rest {
        [Inline::LineBreak, ..] => true,
        [Inline::Text(t), Inline::LineBreak, ..] => t.trim().is_empty(),
        _ => false,
    };
    followed_by_break
        && label.chars().count() < MAX_SPEAKER_LEN
        && !label.contains(LABEL_DASHES)
}

/// Boilerplate paragraph disclaiming that the transcript is verbatim.
pub fn is_disclaimer(text: &str) -> bool {
    let text = text.trim();
    text.contains("Note:") && text.contains("word-for-word")
}

/// Output buffer threaded through the fold over one paragraph's children.
#[derive(Debug, Default)]
struct LineFold {
    out: String,
}

impl LineFold {
    fn step(mut self, node: &Inline, rest: &[Inline]) -> Self {
        match node {
            Inline::Element { .. } => match node.emphasis_text() {
                Some(label) if !label.is_empty() => {
                    if is_speaker_label(label, rest) {
                        self.push_speaker(label);
                    } else {
                        self.push_bold(label, rest.first());
                    }
                }
                _ => {}
            },
            Inline::LineBreak => self.out.push('\n'),
            Inline::Text(text) => self.out.push_str(&normalize_nbsp(text)),
        }
        self
    }

    fn push_speaker(&mut self, name: &str) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str(&speaker_line(name));
        self.out.push('\n');
    }

    fn push_bold(&mut self, text: &str, next: Option<&Inline>) {
        if self.out.chars().last().is_some_and(|c| !c.is_whitespace()) {
            self.out.push(' ');
        }
        self.out.push_str("**");
        self.out.push_str(text);
        self.out.push_str("**");
        if let Some(Inline::Text(following)) = next {
            if following
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && !TIGHT_FOLLOWERS.contains(&c))
            {
                self.out.push(' ');
            }
        }
    }
}

/// Encode one paragraph's children into markup lines, without normalization.
pub fn encode_paragraph(nodes: &[Inline]) -> String {
    nodes
        .iter()
        .enumerate()
        .fold(LineFold::default(), |acc, (i, node)| acc.step(node, &nodes[i + 1..]))
        .out
}

/// Encode the transcript paragraphs into canonical markup.
///
/// Disclaimer paragraphs are dropped, paragraphs are separated by a blank
/// line, and the result is normalized with [`normalize`].
pub fn encode_transcript(paragraphs: &[Vec<Inline>]) -> String {
    let mut raw = String::new();
    for nodes in paragraphs {
        if is_disclaimer(&paragraph_text(nodes)) {
            continue;
        }
        raw.push_str(&encode_paragraph(nodes));
        raw.push_str("\n\n");
    }
    normalize(&raw)
}

/// Collapse runs of three or more line breaks to two, then strip leading
/// whitespace on every line (blank lines included), and trim the whole text.
/// The result has exactly one line break between lines.
pub fn normalize(raw: &str) -> String {
    let collapsed = BLANK_RUN_RE.replace_all(raw, "\n\n");
    LEADING_WS_RE.replace_all(&collapsed, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::nodes::classify_children;
    use scraper::{Html, Selector};

    fn paragraphs(html: &str) -> Vec<Vec<Inline>> {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("p").unwrap();
        doc.select(&sel).map(classify_children).collect()
    }

    fn encode(html: &str) -> String {
        encode_transcript(&paragraphs(html))
    }

    fn strong(text: &str) -> Inline {
        Inline::Element { name: "strong".into(), text: text.into() }
    }

    #[test]
    fn speaker_followed_by_break() {
        assert!(is_speaker_label("Amy", &[Inline::LineBreak]));
        assert!(is_speaker_label("Amy", &[Inline::Text(" \u{a0}".into()), Inline::LineBreak]));
        assert!(!is_speaker_label("Amy", &[Inline::Text(" hi".into()), Inline::LineBreak]));
        assert!(!is_speaker_label("Amy", &[]));
        assert!(!is_speaker_label("Amy", &[strong("x"), Inline::LineBreak]));
    }

    #[test]
    fn long_or_dashed_runs_are_emphasis() {
        let brk = [Inline::LineBreak];
        assert!(!is_speaker_label("absolutely fascinating and then some", &brk));
        assert!(is_speaker_label(&"x".repeat(29), &brk));
        assert!(!is_speaker_label(&"x".repeat(30), &brk));
        assert!(!is_speaker_label("get by – manage", &brk));
        assert!(!is_speaker_label("get by — manage", &brk));
    }

    #[test]
    fn speaker_marker_emitted() {
        let m = encode("<p><strong>Amy</strong><br>Hello, I'm Amy.</p>");
        assert_eq!(m, "[SPEAKER]Amy[/SPEAKER]\nHello, I'm Amy.");
    }

    #[test]
    fn long_bold_is_inline_even_before_break() {
        let m = encode(
            "<p>It was <strong>absolutely fascinating, truly remarkable</strong><br>Really.</p>",
        );
        assert_eq!(m, "It was **absolutely fascinating, truly remarkable**\nReally.");
        assert!(!m.contains("[SPEAKER]"));
    }

    #[test]
    fn inline_bold_spacing() {
        let m = encode("<p>I'm<strong>fond of</strong>walking and<strong>keen on</strong>, cycling.</p>");
        assert_eq!(m, "I'm **fond of** walking and **keen on**, cycling.");
    }

    #[test]
    fn inline_bold_keeps_existing_space() {
        let m = encode("<p>I'm <strong>fond of</strong> walking.</p>");
        assert_eq!(m, "I'm **fond of** walking.");
    }

    #[test]
    fn speaker_mid_paragraph_starts_new_line() {
        let m = encode("<p><strong>Neil</strong><br>Hi.<strong>Beth</strong><br>Hello.</p>");
        assert_eq!(m, "[SPEAKER]Neil[/SPEAKER]\nHi.\n[SPEAKER]Beth[/SPEAKER]\nHello.");
    }

    #[test]
    fn paragraphs_start_new_lines() {
        let m = encode("<p><strong>Neil</strong><br>One.</p><p>  Two.</p>");
        assert_eq!(m, "[SPEAKER]Neil[/SPEAKER]\nOne.\nTwo.");
    }

    #[test]
    fn disclaimer_dropped() {
        let m = encode(
            "<p><strong>Note: This is not a word-for-word transcript.</strong></p>\
             <p><strong>Neil</strong><br>Hello.</p>",
        );
        assert_eq!(m, "[SPEAKER]Neil[/SPEAKER]\nHello.");
    }

    #[test]
    fn empty_bold_skipped() {
        let m = encode("<p>a<strong> </strong><br>b</p>");
        assert_eq!(m, "a\nb");
    }

    #[test]
    fn blank_lines_removed() {
        let m = encode("<p>a<br><br><br><br>b</p><p><br><br></p><p>c</p>");
        assert_eq!(m, "a\nb\nc");
        assert!(!m.contains("\n\n"));
    }

    #[test]
    fn normalize_handles_whitespace_only_lines() {
        assert_eq!(normalize("  a\n \t\n\n\n   b  \n\n"), "a\nb");
        assert_eq!(normalize("\r\n x\r\n\r\n y"), "x\r\ny");
    }

    #[test]
    fn nbsp_text_normalized() {
        let m = encode("<p>one&nbsp;two</p>");
        assert_eq!(m, "one two");
    }

    #[test]
    fn other_elements_contribute_nothing() {
        let m = encode("<p>see <a href='x'>link</a> here</p>");
        assert_eq!(m, "see  here");
    }

    #[test]
    fn empty_transcript() {
        assert_eq!(encode_transcript(&[]), "");
    }
}
