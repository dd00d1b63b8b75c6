//! The transcript mini-language: one speaker marker or one text line per line.
//!
//! ```text
//! [SPEAKER]Neil[/SPEAKER]
//! Hello, I'm **really** pleased to be here.
//! ```
//!
//! [`decode`] turns markup into editable [`Block`]s and [`serialize`] turns
//! blocks back into markup. The decoder ignores blank lines, so it accepts both
//! the paragraph-spaced output of the page encoder and the line-per-block
//! output of the serializer.

pub mod editor;
pub mod inline;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SPEAKER_OPEN: &str = "[SPEAKER]";
pub const SPEAKER_CLOSE: &str = "[/SPEAKER]";

static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[SPEAKER\](.+?)\[/SPEAKER\]$").unwrap());

/// Editor-assigned identity of a block. Not part of the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        BlockId(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum BlockKind {
    Speaker(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
}

impl Block {
    pub fn speaker(name: impl Into<String>) -> Self {
        Block {
            id: BlockId::new(),
            kind: BlockKind::Speaker(name.into()),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Block {
            id: BlockId::new(),
            kind: BlockKind::Text(content.into()),
        }
    }

    /// A block that survives `decode(serialize(..))` unchanged.
    ///
    /// Speaker names must be non-empty, trimmed, single-line and free of the
    /// marker tags; text must be trimmed, single-line and must not read as a
    /// speaker marker. Empty text is well-formed but is dropped on decode.
    pub fn is_well_formed(&self) -> bool {
        match &self.kind {
            BlockKind::Speaker(name) => {
                !name.is_empty()
                    && name.trim() == name
                    && !name.contains('\n')
                    && !name.contains(SPEAKER_OPEN)
                    && !name.contains(SPEAKER_CLOSE)
            }
            BlockKind::Text(content) => {
                content.trim() == content
                    && !content.contains('\n')
                    && !SPEAKER_RE.is_match(content)
            }
        }
    }
}

/// `[SPEAKER]name[/SPEAKER]`
pub fn speaker_line(name: &str) -> String {
    format!("{SPEAKER_OPEN}{name}{SPEAKER_CLOSE}")
}

/// Name inside a speaker line, if `line` (already trimmed) is one.
pub fn parse_speaker_line(line: &str) -> Option<&str> {
    SPEAKER_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTranscript {
    pub blocks: Vec<Block>,
    /// Distinct speaker names in first-seen order.
    pub speakers: Vec<String>,
}

/// Consecutive text lines under one speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Option<String>,
    pub lines: Vec<String>,
}

impl DecodedTranscript {
    pub fn kinds(&self) -> Vec<&BlockKind> {
        self.blocks.iter().map(|b| &b.kind).collect()
    }

    /// Group text lines under the most recent speaker marker.
    ///
    /// Text before the first marker forms a turn with no speaker. A marker
    /// with no text after it still yields an (empty) turn.
    pub fn turns(&self) -> Vec<Turn> {
        let mut turns: Vec<Turn> = Vec::new();
        for block in &self.blocks {
            match &block.kind {
                BlockKind::Speaker(name) => turns.push(Turn {
                    speaker: Some(name.clone()),
                    lines: Vec::new(),
                }),
                BlockKind::Text(line) => match turns.last_mut() {
                    Some(turn) => turn.lines.push(line.clone()),
                    None => turns.push(Turn {
                        speaker: None,
                        lines: vec![line.clone()],
                    }),
                },
            }
        }
        turns
    }
}

/// Parse markup into blocks. Never fails: unrecognized lines become text blocks.
pub fn decode(markup: &str) -> DecodedTranscript {
    let mut out = DecodedTranscript::default();

    for line in markup.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_speaker_line(trimmed) {
            Some(name) => {
                if !out.speakers.iter().any(|s| s == name) {
                    out.speakers.push(name.to_string());
                }
                out.blocks.push(Block::speaker(name));
            }
            None => out.blocks.push(Block::text(trimmed)),
        }
    }

    out
}

/// Emit one line per block and trim trailing whitespace.
pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match &block.kind {
            BlockKind::Speaker(name) => out.push_str(&speaker_line(name)),
            BlockKind::Text(content) => out.push_str(content),
        }
        out.push('\n');
    }
    out.truncate(out.trim_end().len());
    out
}
