//! Text collaborator contract.
//!
//! Block text lives outside the tree. The core only ever reads whole strings, writes whole
//! strings and asks for lengths; offsets are counted in `char`s.

use crate::tree::NodeId;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Storage for block text, keyed by node identity.
///
/// Missing entries read as the empty string, so freshly inserted nodes need no explicit
/// initialization.
pub trait TextStore {
    /// Full text of a block.
    fn text(&self, id: NodeId) -> String;

    /// Replace the full text of a block.
    fn set_text(&mut self, id: NodeId, text: String);

    /// Length of a block's text in chars.
    fn len(&self, id: NodeId) -> usize {
        self.text(id).chars().count()
    }

    /// Whether a block's text is empty.
    fn is_empty(&self, id: NodeId) -> bool {
        self.len(id) == 0
    }

    /// Drop the text of a deleted block.
    fn delete_text(&mut self, id: NodeId);

    /// Mutation counter, incremented after each `set_text` / `delete_text`.
    fn revision(&self) -> u64;
}

/// In-memory [`TextStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTextStore {
    texts: HashMap<NodeId, String>,
    revision: u64,
}

impl MemoryTextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks holding non-default text.
    pub fn entry_count(&self) -> usize {
        self.texts.len()
    }
}

impl TextStore for MemoryTextStore {
    fn text(&self, id: NodeId) -> String {
        self.texts.get(&id).cloned().unwrap_or_default()
    }

    fn set_text(&mut self, id: NodeId, text: String) {
        self.texts.insert(id, text);
        self.revision = self.revision.saturating_add(1);
    }

    fn len(&self, id: NodeId) -> usize {
        self.texts.get(&id).map_or(0, |text| text.chars().count())
    }

    fn delete_text(&mut self, id: NodeId) {
        if self.texts.remove(&id).is_some() {
            self.revision = self.revision.saturating_add(1);
        }
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// Byte index of a char offset (clamped to the end of the string).
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Split a string at a char offset.
pub(crate) fn split_at_char(text: &str, char_offset: usize) -> (&str, &str) {
    text.split_at(byte_index(text, char_offset))
}

/// Char offset of the grapheme boundary before `char_offset`.
pub(crate) fn previous_grapheme_offset(text: &str, char_offset: usize) -> usize {
    let byte = byte_index(text, char_offset);
    text[..byte]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(start, _)| text[..start].chars().count())
}

/// Char offset of the grapheme boundary after `char_offset`.
pub(crate) fn next_grapheme_offset(text: &str, char_offset: usize) -> usize {
    let byte = byte_index(text, char_offset);
    match text[byte..].graphemes(true).next() {
        Some(grapheme) => char_offset + grapheme.chars().count(),
        None => char_offset,
    }
}

/// Remove the chars in `start..end` (char offsets, clamped).
pub(crate) fn remove_char_range(text: &str, start: usize, end: usize) -> String {
    let (start, end) = (start.min(end), start.max(end));
    let start_byte = byte_index(text, start);
    let end_byte = byte_index(text, end);
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start_byte]);
    out.push_str(&text[end_byte..]);
    out
}

/// Chars in `start..end` (char offsets, clamped).
pub(crate) fn char_range(text: &str, start: usize, end: usize) -> &str {
    let (start, end) = (start.min(end), start.max(end));
    &text[byte_index(text, start)..byte_index(text, end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_defaults_to_empty() {
        let mut store = MemoryTextStore::new();
        let id = NodeId::from_raw(7);
        assert_eq!(store.text(id), "");
        assert!(store.is_empty(id));

        store.set_text(id, "héllo".to_string());
        assert_eq!(store.len(id), 5);
        assert_eq!(store.revision(), 1);

        store.delete_text(id);
        assert_eq!(store.text(id), "");
        assert_eq!(store.revision(), 2);

        // Deleting a missing entry is not a mutation.
        store.delete_text(id);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_grapheme_steps_skip_combining_sequences() {
        // "e" + combining acute accent is one grapheme made of two chars.
        let text = "ae\u{301}b";
        assert_eq!(next_grapheme_offset(text, 1), 3);
        assert_eq!(previous_grapheme_offset(text, 3), 1);
        assert_eq!(previous_grapheme_offset(text, 0), 0);
        assert_eq!(next_grapheme_offset(text, 4), 4);
    }

    #[test]
    fn test_char_range_helpers() {
        assert_eq!(split_at_char("héllo", 2), ("hé", "llo"));
        assert_eq!(remove_char_range("héllo", 1, 3), "hlo");
        assert_eq!(char_range("héllo", 4, 1), "éll");
        assert_eq!(byte_index("héllo", 99), "héllo".len());
    }
}
