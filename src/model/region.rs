//! Annotation regions: the engine's projected output.

use super::{BlockRef, Side};
use serde::{Deserialize, Serialize};

/// Kind of change a region highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Content present only in the original
    Delete,
    /// Content present only in the modified document
    Insert,
    /// Content changed between the two
    Modify,
}

/// Whether a region covers a whole block or a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Line,
    Word,
}

/// Integer pixel rectangle, always inside its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Round a floating rectangle outward and clip it to a `width`×`height`
    /// page. Returns `None` when nothing of it remains on the page.
    pub fn clipped(x0: f32, y0: f32, x1: f32, y1: f32, width: u32, height: u32) -> Option<Self> {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return None;
        }
        let left = x0.floor().max(0.0);
        let top = y0.floor().max(0.0);
        let right = x1.ceil().min(width as f32);
        let bottom = y1.ceil().min(height as f32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A classified rectangle to paint on one page of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRegion {
    /// Page index, valid on both sides after pairing
    pub page: usize,
    pub side: Side,
    pub rect: PixelRect,
    pub classification: Classification,
    pub granularity: Granularity,
    /// Block the region was projected from
    pub block: BlockRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_inside() {
        let rect = PixelRect::clipped(10.2, 20.7, 30.1, 40.0, 100, 100).unwrap();
        assert_eq!(rect, PixelRect::new(10, 20, 21, 20));
    }

    #[test]
    fn test_clipped_to_bounds() {
        let rect = PixelRect::clipped(-5.0, 90.0, 50.0, 150.0, 100, 100).unwrap();
        assert_eq!(rect, PixelRect::new(0, 90, 50, 10));
        assert_eq!(rect.bottom(), 100);
    }

    #[test]
    fn test_clipped_outside() {
        assert!(PixelRect::clipped(120.0, 0.0, 150.0, 10.0, 100, 100).is_none());
        assert!(PixelRect::clipped(10.0, 10.0, 10.0, 20.0, 100, 100).is_none());
        assert!(PixelRect::clipped(f32::NAN, 0.0, 1.0, 1.0, 100, 100).is_none());
    }
}
