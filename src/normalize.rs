//! Comparison-key normalization and flat key sequences.
//!
//! Every block is reduced to a key that ignores layout-only differences
//! (whitespace runs, letter case, Unicode composition). Keys of all pages are
//! concatenated in page order to form the sequence the aligner works on.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{BlockRef, Document, Side, TextBlock};

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Normalize text for comparison: NFC, collapse whitespace, trim, lowercase.
pub fn comparison_key(text: &str) -> String {
    let composed: String = text.nfc().collect();
    whitespace_regex()
        .replace_all(&composed, " ")
        .trim()
        .to_lowercase()
}

/// Flat, ordered key sequence of one document.
#[derive(Debug, Clone, Default)]
pub struct KeySequence {
    /// Keys in page order, empty keys skipped
    pub keys: Vec<String>,

    /// Key to the first block that produced it
    canonical: HashMap<String, BlockRef>,
}

impl KeySequence {
    /// Number of keys in the sequence.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve sequence position `index` to its canonical block.
    ///
    /// Duplicate keys share the block of their first occurrence.
    pub fn block_at(&self, index: usize) -> Option<BlockRef> {
        self.keys
            .get(index)
            .and_then(|key| self.canonical.get(key))
            .copied()
    }

    /// Borrow the keys as string slices.
    pub fn as_strs(&self) -> Vec<&str> {
        self.keys.iter().map(String::as_str).collect()
    }
}

/// Builds key sequences from documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentNormalizer;

impl DocumentNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Flatten a document's blocks into a key sequence.
    pub fn sequence(&self, doc: &Document) -> KeySequence {
        self.sequence_from_blocks(doc.blocks())
    }

    /// Flatten arbitrary `(ref, block)` pairs, in the given order.
    pub fn sequence_from_blocks<'a>(
        &self,
        blocks: impl IntoIterator<Item = (BlockRef, &'a TextBlock)>,
    ) -> KeySequence {
        let mut sequence = KeySequence::default();
        for (block_ref, block) in blocks {
            if !block.has_content() {
                continue;
            }
            sequence.keys.push(block.key.clone());
            sequence
                .canonical
                .entry(block.key.clone())
                .or_insert(block_ref);
        }
        sequence
    }

    /// Build both sequences of a comparison.
    pub fn sequences(
        &self,
        original: &Document,
        modified: &Document,
    ) -> (KeySequence, KeySequence) {
        let old = self.sequence(original);
        let new = self.sequence(modified);
        log::debug!(
            "Normalized {} {} lines and {} {} lines",
            old.len(),
            Side::Original,
            new.len(),
            Side::Modified
        );
        (old, new)
    }
}
