//! Line- and word-level alignment of two key sequences.
//!
//! Lines are aligned first. Every replacement of exactly one line by exactly
//! one line is aligned again word by word, and that block pair is reported
//! at word granularity. Replacements spanning several lines on either side
//! are reported line by line; no word alignment is attempted across them.

mod matcher;
mod opcode;

pub use matcher::{similarity, Match, SequenceMatcher};
pub use opcode::{spans_of, verify_partition, DiffSpan, OpTag, Opcode};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BlockRef, Classification, Granularity, Side};
use crate::normalize::KeySequence;

/// A changed word inside a word-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordMark {
    /// Word index within the block's key
    pub index: usize,
    pub classification: Classification,
}

/// A block tagged as changed on one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockChange {
    pub side: Side,
    pub block: BlockRef,
    /// Position in the side's key sequence
    pub line: usize,
    pub classification: Classification,
    pub granularity: Granularity,
    /// Changed words; only populated for word granularity
    pub words: Vec<WordMark>,
}

/// Word alignment of one single-line replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAlignment {
    pub old_line: usize,
    pub new_line: usize,
    pub opcodes: Vec<Opcode>,
}

/// Aggregate change counts of a comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub deletions: usize,
    pub insertions: usize,
    /// Counted on the original side only
    pub modifications: usize,
}

impl ChangeSummary {
    pub fn total(&self) -> usize {
        self.deletions + self.insertions + self.modifications
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Full alignment result of one comparison run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Line-level opcodes over the two key sequences
    pub line_opcodes: Vec<Opcode>,
    /// Word-level opcodes of each single-line replacement
    pub word_alignments: Vec<WordAlignment>,
    /// Tagged blocks, in opcode order
    pub changes: Vec<BlockChange>,
}

impl DiffReport {
    /// Whether the two documents compare equal.
    pub fn is_identical(&self) -> bool {
        self.line_opcodes.iter().all(Opcode::is_equal)
    }

    /// Per-side spans of the line opcodes.
    pub fn spans(&self) -> Vec<DiffSpan> {
        spans_of(&self.line_opcodes)
    }

    /// Changes tagged on one side.
    pub fn changes_for(&self, side: Side) -> impl Iterator<Item = &BlockChange> {
        self.changes.iter().filter(move |c| c.side == side)
    }

    /// Count deletions, insertions and (original side) modifications.
    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for change in &self.changes {
            match (change.side, change.classification) {
                (Side::Original, Classification::Delete) => summary.deletions += 1,
                (Side::Modified, Classification::Insert) => summary.insertions += 1,
                (Side::Original, Classification::Modify) => summary.modifications += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Computes line and word alignments between two key sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceAligner;

impl SequenceAligner {
    pub fn new() -> Self {
        Self
    }

    /// Opcodes over two arbitrary sequences, checked for completeness.
    pub fn opcodes<T: Eq + std::hash::Hash>(&self, a: &[T], b: &[T]) -> Result<Vec<Opcode>> {
        let opcodes = SequenceMatcher::new(a, b).opcodes();
        verify_partition(&opcodes, a.len(), b.len())?;
        Ok(opcodes)
    }

    /// Align two documents' key sequences and tag the changed blocks.
    pub fn align(&self, old: &KeySequence, new: &KeySequence) -> Result<DiffReport> {
        let line_opcodes = self.opcodes(&old.as_strs(), &new.as_strs())?;
        let mut builder = ReportBuilder::default();

        // Word-level pairs first so their blocks are excluded from line tagging.
        for op in line_opcodes.iter().filter(|op| op.is_one_to_one_replace()) {
            let (Some(old_block), Some(new_block)) = (old.block_at(op.i1), new.block_at(op.j1))
            else {
                continue;
            };
            let old_words: Vec<&str> = old.keys[op.i1].split_whitespace().collect();
            let new_words: Vec<&str> = new.keys[op.j1].split_whitespace().collect();
            let word_ops = self.opcodes(&old_words, &new_words)?;

            builder.push_word_level(Side::Original, old_block, op.i1, &word_ops);
            builder.push_word_level(Side::Modified, new_block, op.j1, &word_ops);
            builder.word_alignments.push(WordAlignment {
                old_line: op.i1,
                new_line: op.j1,
                opcodes: word_ops,
            });
        }

        for op in &line_opcodes {
            let (old_class, new_class) = match op.tag {
                OpTag::Equal => continue,
                OpTag::Delete => (Some(Classification::Delete), None),
                OpTag::Insert => (None, Some(Classification::Insert)),
                OpTag::Replace if op.is_one_to_one_replace() => continue,
                OpTag::Replace => (Some(Classification::Modify), Some(Classification::Modify)),
            };
            if let Some(class) = old_class {
                for i in op.old() {
                    if let Some(block) = old.block_at(i) {
                        builder.push_line_level(Side::Original, block, i, class);
                    }
                }
            }
            if let Some(class) = new_class {
                for j in op.new_range() {
                    if let Some(block) = new.block_at(j) {
                        builder.push_line_level(Side::Modified, block, j, class);
                    }
                }
            }
        }

        let report = builder.finish(line_opcodes);
        log::debug!(
            "Aligned {} x {} lines: {} changes, {} word-level pairs",
            old.len(),
            new.len(),
            report.changes.len(),
            report.word_alignments.len()
        );
        Ok(report)
    }
}

#[derive(Default)]
struct ReportBuilder {
    word_level: Vec<BlockChange>,
    line_level: Vec<BlockChange>,
    word_alignments: Vec<WordAlignment>,
    tagged: HashSet<(Side, BlockRef)>,
}

impl ReportBuilder {
    fn push_word_level(&mut self, side: Side, block: BlockRef, line: usize, word_ops: &[Opcode]) {
        if !self.tagged.insert((side, block)) {
            return;
        }
        let mut words = Vec::new();
        for op in word_ops {
            let (range, class) = match (side, op.tag) {
                (Side::Original, OpTag::Delete) => (op.old(), Classification::Delete),
                (Side::Original, OpTag::Replace) => (op.old(), Classification::Modify),
                (Side::Modified, OpTag::Insert) => (op.new_range(), Classification::Insert),
                (Side::Modified, OpTag::Replace) => (op.new_range(), Classification::Modify),
                _ => continue,
            };
            words.extend(range.map(|index| WordMark {
                index,
                classification: class,
            }));
        }
        self.word_level.push(BlockChange {
            side,
            block,
            line,
            classification: Classification::Modify,
            granularity: Granularity::Word,
            words,
        });
    }

    fn push_line_level(
        &mut self,
        side: Side,
        block: BlockRef,
        line: usize,
        classification: Classification,
    ) {
        if !self.tagged.insert((side, block)) {
            return;
        }
        self.line_level.push(BlockChange {
            side,
            block,
            line,
            classification,
            granularity: Granularity::Line,
            words: Vec::new(),
        });
    }

    fn finish(self, line_opcodes: Vec<Opcode>) -> DiffReport {
        let mut changes = self.line_level;
        changes.extend(self.word_level);
        // Opcode order: by side, then sequence position.
        changes.sort_by_key(|c| (c.side, c.line));
        DiffReport {
            line_opcodes,
            word_alignments: self.word_alignments,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Document, Page, TextBlock};
    use crate::normalize::DocumentNormalizer;

    fn sequence(side: Side, lines: &[&str]) -> KeySequence {
        let mut page = Page::blank(0, 100, 100);
        for line in lines {
            page.add_block(TextBlock::new(*line, BBox::new(0.0, 0.0, 50.0, 10.0), 0));
        }
        DocumentNormalizer::new().sequence(&Document::from_pages(side, vec![page]))
    }

    fn align(a: &[&str], b: &[&str]) -> DiffReport {
        SequenceAligner::new()
            .align(&sequence(Side::Original, a), &sequence(Side::Modified, b))
            .unwrap()
    }

    #[test]
    fn test_single_line_replace_goes_word_level() {
        let report = align(&["hello world"], &["hello there"]);
        assert_eq!(report.word_alignments.len(), 1);
        let word_ops = &report.word_alignments[0].opcodes;
        let replaces: Vec<_> = word_ops.iter().filter(|o| o.tag == OpTag::Replace).collect();
        assert_eq!(replaces.len(), 1);
        assert_eq!(replaces[0].old(), 1..2);

        assert_eq!(report.changes.len(), 2);
        for change in &report.changes {
            assert_eq!(change.granularity, Granularity::Word);
            assert_eq!(
                change.words,
                vec![WordMark {
                    index: 1,
                    classification: Classification::Modify
                }]
            );
        }
        assert_eq!(
            report.summary(),
            ChangeSummary {
                deletions: 0,
                insertions: 0,
                modifications: 1
            }
        );
    }

    #[test]
    fn test_deleted_line() {
        let report = align(&["line one", "line two"], &["line one"]);
        let non_equal: Vec<_> = report
            .line_opcodes
            .iter()
            .filter(|o| !o.is_equal())
            .collect();
        assert_eq!(non_equal.len(), 1);
        assert_eq!(non_equal[0].tag, OpTag::Delete);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].side, Side::Original);
        assert_eq!(report.changes[0].classification, Classification::Delete);
        assert_eq!(report.changes[0].block, BlockRef::new(0, 1));
    }

    #[test]
    fn test_multi_line_replace_stays_line_level() {
        let report = align(&["alpha", "bravo", "keep"], &["xray", "keep"]);
        assert!(report.word_alignments.is_empty());
        let old: Vec<_> = report.changes_for(Side::Original).collect();
        let new: Vec<_> = report.changes_for(Side::Modified).collect();
        assert_eq!(old.len(), 2);
        assert_eq!(new.len(), 1);
        assert!(report
            .changes
            .iter()
            .all(|c| c.granularity == Granularity::Line
                && c.classification == Classification::Modify));
        assert_eq!(report.summary().modifications, 2);
    }

    #[test]
    fn test_uneven_word_counts_still_recurse() {
        let report = align(&["the quick fox"], &["the very quick brown fox jumps"]);
        assert_eq!(report.word_alignments.len(), 1);
        let old: Vec<_> = report.changes_for(Side::Original).collect();
        let new: Vec<_> = report.changes_for(Side::Modified).collect();
        assert!(old[0].words.is_empty());
        let inserted: Vec<usize> = new[0].words.iter().map(|w| w.index).collect();
        assert_eq!(inserted, vec![1, 3, 5]);
        assert!(new[0]
            .words
            .iter()
            .all(|w| w.classification == Classification::Insert));
    }

    #[test]
    fn test_identical_documents() {
        let report = align(&["same", "text"], &["Same", "  text "]);
        assert!(report.is_identical());
        assert!(report.changes.is_empty());
        assert!(report.summary().is_empty());
    }

    #[test]
    fn test_alignment_is_deterministic() {
        let a = ["a b", "c", "d e f", "g", "a b"];
        let b = ["c", "d e x", "a b", "g", "h"];
        assert_eq!(align(&a, &b), align(&a, &b));
    }
}
