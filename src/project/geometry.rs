//! Geometry helpers: unit scaling, word interpolation, page clipping.

use crate::model::{BBox, PixelRect};

/// Default baseline resolution of source coordinates (points per inch).
pub const BASELINE_DPI: f32 = 72.0;

/// Approximate per-word boxes inside a line box.
///
/// Each word's horizontal extent is proportional to its character offset in
/// `text`, with words separated by one character. The vertical extent is
/// the line's. This is an approximation, not a glyph measurement.
pub fn word_positions(text: &str, bbox: BBox) -> Vec<BBox> {
    let total_chars = text.chars().count();
    if total_chars == 0 {
        return Vec::new();
    }
    let width = bbox.width();
    let total = total_chars as f32;

    let mut positions = Vec::new();
    let mut offset = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        let start = offset as f32 / total;
        let end = (offset + len) as f32 / total;
        positions.push(BBox::new(
            bbox.x0 + width * start,
            bbox.y0,
            bbox.x0 + width * end,
            bbox.y1,
        ));
        offset += len + 1;
    }
    positions
}

/// Result of fitting a pixel-space box onto a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fit {
    /// Entirely on the page
    Inside(PixelRect),
    /// Partly outside; the remainder is kept
    Clipped(PixelRect),
    /// Nothing left after clipping
    Outside,
}

impl Fit {
    pub fn rect(&self) -> Option<PixelRect> {
        match self {
            Fit::Inside(rect) | Fit::Clipped(rect) => Some(*rect),
            Fit::Outside => None,
        }
    }
}

/// Clip a pixel-space box to a `width`×`height` page.
pub fn fit_to_page(bbox: BBox, width: u32, height: u32) -> Fit {
    match PixelRect::clipped(bbox.x0, bbox.y0, bbox.x1, bbox.y1, width, height) {
        None => Fit::Outside,
        Some(rect) => {
            let exceeds = bbox.x0 < 0.0
                || bbox.y0 < 0.0
                || bbox.x1 > width as f32
                || bbox.y1 > height as f32;
            if exceeds {
                Fit::Clipped(rect)
            } else {
                Fit::Inside(rect)
            }
        }
    }
}
