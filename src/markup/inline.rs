use std::sync::LazyLock;

use regex::Regex;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

/// A run of a text line: plain text or `**bold**` emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Plain(String),
    Bold(String),
}

/// Split a text line into runs. An unpaired `**` stays in the plain text.
pub fn runs(line: &str) -> Vec<Run> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in BOLD_RE.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Run::Plain(line[last..whole.start()].to_string()));
        }
        out.push(Run::Bold(inner.as_str().to_string()));
        last = whole.end();
    }
    if last < line.len() {
        out.push(Run::Plain(line[last..].to_string()));
    }
    out
}

pub fn to_markup(runs: &[Run]) -> String {
    runs.iter()
        .map(|r| match r {
            Run::Plain(t) => t.clone(),
            Run::Bold(t) => format!("**{}**", t),
        })
        .collect()
}

/// The emphasised phrases of a line, in order.
pub fn bold_phrases(line: &str) -> Vec<String> {
    runs(line)
        .into_iter()
        .filter_map(|r| match r {
            Run::Bold(t) => Some(t),
            Run::Plain(_) => None,
        })
        .collect()
}
