//! Longest-matching-block sequence alignment.
//!
//! Recursively finds the longest contiguous run shared by both sequences,
//! then aligns the pieces to its left and right. Among runs of equal length
//! the one starting earliest in `a`, then earliest in `b`, is taken, so the
//! result depends only on the inputs.

use std::collections::HashMap;
use std::hash::Hash;

use super::opcode::{OpTag, Opcode};

/// A run of `size` equal elements at `a[a..a + size]` and `b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Aligns two sequences of comparable elements.
pub struct SequenceMatcher<'a, T: Eq + Hash> {
    a: &'a [T],
    b: &'a [T],
    /// Element of `b` to its ascending positions
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elem) in b.iter().enumerate() {
            b2j.entry(elem).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest matching run inside `a[alo..ahi]` and `b[blo..bhi]`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut best = Match {
            a: alo,
            b: blo,
            size: 0,
        };
        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = Match {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }
        best
    }

    /// All matching runs in ascending order, adjacent runs merged, followed
    /// by a zero-sized sentinel at `(len_a, len_b)`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            found.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        found.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(found.len() + 1);
        for m in found {
            match merged.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => merged.push(m),
            }
        }
        merged.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        merged
    }

    /// Opcodes describing how to turn `a` into `b`.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);
        for m in self.matching_blocks() {
            let tag = if i < m.a && j < m.b {
                Some(OpTag::Replace)
            } else if i < m.a {
                Some(OpTag::Delete)
            } else if j < m.b {
                Some(OpTag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                ops.push(Opcode::new(tag, i, m.a, j, m.b));
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                ops.push(Opcode::new(OpTag::Equal, m.a, i, m.b, j));
            }
        }
        ops
    }

    /// Similarity in `[0, 1]`: twice the matched elements over the total.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Case-insensitive character similarity of two strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::opcode::verify_partition;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn test_longest_match_is_leftmost() {
        let a = words("x a b y a b");
        let b = words("a b");
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, a.len(), 0, b.len());
        assert_eq!(m, Match { a: 1, b: 0, size: 2 });
    }

    #[test]
    fn test_opcodes_replace() {
        let a = words("hello world");
        let b = words("hello there");
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        assert_eq!(
            ops,
            vec![
                Opcode::new(OpTag::Equal, 0, 1, 0, 1),
                Opcode::new(OpTag::Replace, 1, 2, 1, 2),
            ]
        );
    }

    #[test]
    fn test_opcodes_mixed() {
        let a = vec!["a", "b", "c", "d", "e"];
        let b = vec!["a", "c", "d", "x", "y", "e", "f"];
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        assert_eq!(
            ops,
            vec![
                Opcode::new(OpTag::Equal, 0, 1, 0, 1),
                Opcode::new(OpTag::Delete, 1, 2, 1, 1),
                Opcode::new(OpTag::Equal, 2, 4, 1, 3),
                Opcode::new(OpTag::Insert, 4, 4, 3, 5),
                Opcode::new(OpTag::Equal, 4, 5, 5, 6),
                Opcode::new(OpTag::Insert, 5, 5, 6, 7),
            ]
        );
        assert!(verify_partition(&ops, a.len(), b.len()).is_ok());
    }

    #[test]
    fn test_opcodes_empty_sides() {
        let empty: Vec<&str> = Vec::new();
        let b = vec!["one", "two"];
        assert_eq!(
            SequenceMatcher::new(&empty, &b).opcodes(),
            vec![Opcode::new(OpTag::Insert, 0, 0, 0, 2)]
        );
        assert_eq!(
            SequenceMatcher::new(&b, &empty).opcodes(),
            vec![Opcode::new(OpTag::Delete, 0, 2, 0, 0)]
        );
        assert!(SequenceMatcher::new(&empty, &empty).opcodes().is_empty());
    }

    #[test]
    fn test_matching_blocks_merged() {
        let a = vec![1, 2, 3, 4];
        let b = vec![1, 2, 3, 4];
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![Match { a: 0, b: 0, size: 4 }, Match { a: 4, b: 4, size: 0 }]
        );
    }

    #[test]
    fn test_ratio() {
        let a: Vec<char> = "abcd".chars().collect();
        let b: Vec<char> = "bcde".chars().collect();
        assert!((SequenceMatcher::new(&a, &b).ratio() - 0.75).abs() < 1e-9);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("Total", "total"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }
}
