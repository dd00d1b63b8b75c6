use crate::markup::{decode, serialize, Block, BlockId, BlockKind};
use crate::parser::extract::vocab::VocabEntry;

/// An editing session over one stored transcript.
///
/// Opened from markup, mutated block by block, and saved back to markup with
/// the serializer. The session has no life beyond the edit.
#[derive(Debug, Clone, Default)]
pub struct TranscriptEditor {
    blocks: Vec<Block>,
    speakers: Vec<String>,
}

impl TranscriptEditor {
    pub fn open(markup: &str) -> Self {
        let decoded = decode(markup);
        TranscriptEditor {
            blocks: decoded.blocks,
            speakers: decoded.speakers,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Names offered for quick re-use, in first-seen order.
    pub fn speakers(&self) -> &[String] {
        &self.speakers
    }

    /// Append a marker for a possibly new speaker. Blank names are ignored.
    pub fn add_speaker(&mut self, name: &str) -> Option<BlockId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if !self.speakers.iter().any(|s| s == name) {
            self.speakers.push(name.to_string());
        }
        Some(self.push(Block::speaker(name)))
    }

    /// Append a marker for a speaker already in the list.
    pub fn add_existing_speaker(&mut self, name: &str) -> Option<BlockId> {
        if !self.speakers.iter().any(|s| s == name) {
            return None;
        }
        Some(self.push(Block::speaker(name)))
    }

    pub fn add_text_block(&mut self) -> BlockId {
        self.push(Block::text(""))
    }

    /// Replace the content of a block. For speaker blocks this renames that marker only.
    pub fn update_block(&mut self, id: BlockId, content: &str) -> bool {
        let Some(block) = self.find_mut(id) else {
            return false;
        };
        block.kind = match block.kind {
            BlockKind::Speaker(_) => BlockKind::Speaker(content.to_string()),
            BlockKind::Text(_) => BlockKind::Text(content.to_string()),
        };
        true
    }

    pub fn delete_block(&mut self, id: BlockId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        self.blocks.len() != before
    }

    /// Move a block to `index`, clamped to the end of the sequence.
    pub fn move_block(&mut self, id: BlockId, index: usize) -> bool {
        let Some(from) = self.blocks.iter().position(|b| b.id == id) else {
            return false;
        };
        let block = self.blocks.remove(from);
        let to = index.min(self.blocks.len());
        self.blocks.insert(to, block);
        true
    }

    /// Wrap the characters `start..end` of a text block in `**`.
    ///
    /// Offsets count characters, not bytes. Empty or out-of-range selections
    /// and speaker blocks are left untouched.
    pub fn wrap_bold(&mut self, id: BlockId, start: usize, end: usize) -> bool {
        let Some(block) = self.find_mut(id) else {
            return false;
        };
        let BlockKind::Text(content) = &mut block.kind else {
            return false;
        };
        let len = content.chars().count();
        if start >= end || end > len {
            return false;
        }

        let byte_at = |n: usize| {
            content
                .char_indices()
                .nth(n)
                .map(|(i, _)| i)
                .unwrap_or(content.len())
        };
        let (s, e) = (byte_at(start), byte_at(end));
        let wrapped = format!("{}**{}**{}", &content[..s], &content[s..e], &content[e..]);
        *content = wrapped;
        true
    }

    pub fn save(&self) -> String {
        serialize(&self.blocks)
    }

    fn push(&mut self, block: Block) -> BlockId {
        let id = block.id;
        self.blocks.push(block);
        id
    }

    fn find_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }
}

/// Vocabulary as it is committed after editing: entries missing either half are dropped.
pub fn retain_complete(entries: Vec<VocabEntry>) -> Vec<VocabEntry> {
    entries
        .into_iter()
        .filter(|v| !v.term.trim().is_empty() && !v.definition.trim().is_empty())
        .collect()
}
