//! Fuzzy correlation of words with detected image tokens.
//!
//! Used when text geometry comes from optical recognition instead of native
//! extraction. Matching is best-effort: a word may have no acceptable token.

use serde::{Deserialize, Serialize};

use crate::align::similarity;
use crate::model::BBox;

/// A token found on a page bitmap by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedToken {
    pub text: String,
    /// Detection confidence, 0 to 100
    pub confidence: f32,
    /// Box in pixel units
    pub bbox: BBox,
}

impl DetectedToken {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

/// Acceptance thresholds for token correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyOptions {
    /// Similarity a token must strictly exceed, in `[0, 1]`
    pub min_similarity: f64,
    /// Minimum detection confidence, 0 to 100
    pub min_confidence: f32,
}

impl FuzzyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_similarity(mut self, ratio: f64) -> Self {
        self.min_similarity = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence.clamp(0.0, 100.0);
        self
    }
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            min_similarity: 0.85,
            min_confidence: 60.0,
        }
    }
}

/// Matches words to the tokens of one page, consuming each token once.
#[derive(Debug)]
pub struct TokenCorrelator<'a> {
    tokens: &'a [DetectedToken],
    consumed: Vec<bool>,
    options: FuzzyOptions,
}

impl<'a> TokenCorrelator<'a> {
    pub fn new(tokens: &'a [DetectedToken], options: FuzzyOptions) -> Self {
        Self {
            tokens,
            consumed: vec![false; tokens.len()],
            options,
        }
    }

    /// Find and consume the best unconsumed token for `word`.
    ///
    /// The highest similarity wins; ties keep the earlier token.
    pub fn correlate(&mut self, word: &str) -> Option<&'a DetectedToken> {
        let mut best: Option<(usize, f64)> = None;
        for (i, token) in self.tokens.iter().enumerate() {
            if self.consumed[i] || token.confidence < self.options.min_confidence {
                continue;
            }
            let score = similarity(word, &token.text);
            if score <= self.options.min_similarity {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        let (index, _) = best?;
        self.consumed[index] = true;
        let tokens = self.tokens;
        Some(&tokens[index])
    }

    /// Number of tokens not yet matched.
    pub fn remaining(&self) -> usize {
        self.consumed.iter().filter(|c| !**c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, confidence: f32, x: f32) -> DetectedToken {
        DetectedToken::new(text, confidence, BBox::new(x, 0.0, x + 10.0, 10.0))
    }

    #[test]
    fn test_exact_match_consumed_once() {
        let tokens = vec![token("invoice", 95.0, 0.0), token("total", 95.0, 20.0)];
        let mut correlator = TokenCorrelator::new(&tokens, FuzzyOptions::default());
        assert_eq!(correlator.correlate("total").map(|t| t.bbox.x0), Some(20.0));
        assert!(correlator.correlate("total").is_none());
        assert_eq!(correlator.remaining(), 1);
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        // One substituted character out of nine: ratio 8/9 > 0.85
        let tokens = vec![token("amendmemt", 90.0, 0.0)];
        let mut correlator = TokenCorrelator::new(&tokens, FuzzyOptions::default());
        assert!(correlator.correlate("amendment").is_some());
    }

    #[test]
    fn test_rejects_below_threshold_and_low_confidence() {
        let tokens = vec![token("cat", 99.0, 0.0), token("dog", 10.0, 20.0)];
        let mut correlator = TokenCorrelator::new(&tokens, FuzzyOptions::default());
        // "cut" vs "cat" is 2/3
        assert!(correlator.correlate("cut").is_none());
        assert!(correlator.correlate("dog").is_none());
        assert_eq!(correlator.remaining(), 2);
    }

    #[test]
    fn test_best_score_then_earliest() {
        let tokens = vec![
            token("payment", 80.0, 0.0),
            token("payments", 80.0, 20.0),
            token("payment", 80.0, 40.0),
        ];
        let mut correlator = TokenCorrelator::new(&tokens, FuzzyOptions::default());
        assert_eq!(correlator.correlate("Payment").map(|t| t.bbox.x0), Some(0.0));
        assert_eq!(correlator.correlate("payment").map(|t| t.bbox.x0), Some(40.0));
        assert_eq!(correlator.correlate("payment").map(|t| t.bbox.x0), Some(20.0));
    }
}
