//! Text blocks and their source-space geometry.

use crate::normalize::comparison_key;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in source units (points, 1/72 inch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Multiply every coordinate by `factor`.
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            x0: self.x0 * factor,
            y0: self.y0 * factor,
            x1: self.x1 * factor,
            y1: self.y1 * factor,
        }
    }

    /// Check if the box has no positive area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

/// A minimal extracted content unit, typically one line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Original text, trimmed
    pub text: String,

    /// Normalized comparison key
    pub key: String,

    /// Bounding box in source units
    pub bbox: BBox,

    /// Owning page index (0-indexed)
    pub page: usize,
}

impl TextBlock {
    /// Create a block, deriving its comparison key from `text`.
    pub fn new(text: impl Into<String>, bbox: BBox, page: usize) -> Self {
        let text = text.into().trim().to_string();
        let key = comparison_key(&text);
        Self {
            text,
            key,
            bbox,
            page,
        }
    }

    /// Whether the block carries any comparable text.
    pub fn has_content(&self) -> bool {
        !self.key.is_empty()
    }
}

/// Position of a block within a document: page index and block index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockRef {
    pub page: usize,
    pub block: usize,
}

impl BlockRef {
    pub fn new(page: usize, block: usize) -> Self {
        Self { page, block }
    }
}
