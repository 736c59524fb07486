//! Alignment opcodes and the per-side spans derived from them.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Side;

/// Tag of an alignment segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpTag {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// One alignment segment: `a[i1..i2]` relates to `b[j1..j2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: OpTag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

impl Opcode {
    pub fn new(tag: OpTag, i1: usize, i2: usize, j1: usize, j2: usize) -> Self {
        Self {
            tag,
            i1,
            i2,
            j1,
            j2,
        }
    }

    /// Range on the original side.
    pub fn old(&self) -> Range<usize> {
        self.i1..self.i2
    }

    /// Range on the modified side.
    pub fn new_range(&self) -> Range<usize> {
        self.j1..self.j2
    }

    pub fn is_equal(&self) -> bool {
        self.tag == OpTag::Equal
    }

    /// Single-line (or single-word) replacement on both sides.
    pub fn is_one_to_one_replace(&self) -> bool {
        self.tag == OpTag::Replace && self.i2 - self.i1 == 1 && self.j2 - self.j1 == 1
    }

    /// Split the opcode into per-side spans.
    ///
    /// Equal yields a span on each side, Delete only on the original side,
    /// Insert only on the modified side, and Replace a span on each side
    /// that points at the other as its pair.
    pub fn spans(&self) -> Vec<DiffSpan> {
        let old = DiffSpan {
            kind: self.tag,
            side: Side::Original,
            start: self.i1,
            end: self.i2,
            paired: None,
        };
        let new = DiffSpan {
            kind: self.tag,
            side: Side::Modified,
            start: self.j1,
            end: self.j2,
            paired: None,
        };
        match self.tag {
            OpTag::Equal => vec![old, new],
            OpTag::Delete => vec![old],
            OpTag::Insert => vec![new],
            OpTag::Replace => vec![
                DiffSpan {
                    paired: Some((self.j1, self.j2)),
                    ..old
                },
                DiffSpan {
                    paired: Some((self.i1, self.i2)),
                    ..new
                },
            ],
        }
    }
}

/// A tagged index range on one side of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffSpan {
    pub kind: OpTag,
    pub side: Side,
    pub start: usize,
    pub end: usize,
    /// Range on the other side, for replacements
    pub paired: Option<(usize, usize)>,
}

impl DiffSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Flatten opcodes into spans, in opcode order.
pub fn spans_of(opcodes: &[Opcode]) -> Vec<DiffSpan> {
    opcodes.iter().flat_map(Opcode::spans).collect()
}

/// Check that `opcodes` partition `[0, len_a)` and `[0, len_b)` in order.
pub fn verify_partition(opcodes: &[Opcode], len_a: usize, len_b: usize) -> Result<()> {
    let mut i = 0;
    let mut j = 0;
    for op in opcodes {
        if op.i1 != i || op.j1 != j || op.i2 < op.i1 || op.j2 < op.j1 {
            return Err(Error::Alignment(format!(
                "opcode {:?} [{}, {}) x [{}, {}) does not continue at ({}, {})",
                op.tag, op.i1, op.i2, op.j1, op.j2, i, j
            )));
        }
        let consistent = match op.tag {
            OpTag::Equal => op.i2 - op.i1 == op.j2 - op.j1 && op.i2 > op.i1,
            OpTag::Delete => op.i2 > op.i1 && op.j2 == op.j1,
            OpTag::Insert => op.i2 == op.i1 && op.j2 > op.j1,
            OpTag::Replace => op.i2 > op.i1 && op.j2 > op.j1,
        };
        if !consistent {
            return Err(Error::Alignment(format!(
                "opcode {:?} has inconsistent ranges [{}, {}) x [{}, {})",
                op.tag, op.i1, op.i2, op.j1, op.j2
            )));
        }
        i = op.i2;
        j = op.j2;
    }
    if i != len_a || j != len_b {
        return Err(Error::Alignment(format!(
            "opcodes end at ({}, {}) but sequences have lengths ({}, {})",
            i, j, len_a, len_b
        )));
    }
    Ok(())
}
