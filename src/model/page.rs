//! Page-level types.

use super::TextBlock;
use image::{Rgba, RgbaImage};

/// Raster image of one page.
pub type Bitmap = RgbaImage;

/// A single page in a document.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page index (0-indexed)
    pub index: usize,

    /// Rasterized page image
    pub bitmap: Bitmap,

    /// Text blocks in reading order
    pub blocks: Vec<TextBlock>,

    /// True for blank pages injected by pairing or substituted after a
    /// failed extraction
    pub synthetic: bool,
}

impl Page {
    /// Create a new page with the given bitmap and no text.
    pub fn new(index: usize, bitmap: Bitmap) -> Self {
        Self {
            index,
            bitmap,
            blocks: Vec::new(),
            synthetic: false,
        }
    }

    /// Create a synthetic white page of the given pixel size.
    pub fn blank(index: usize, width: u32, height: u32) -> Self {
        Self {
            index,
            bitmap: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            blocks: Vec::new(),
            synthetic: true,
        }
    }

    /// Replace the page's blocks.
    pub fn with_blocks(mut self, blocks: Vec<TextBlock>) -> Self {
        self.blocks = blocks;
        self.set_index(self.index);
        self
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, mut block: TextBlock) {
        block.page = self.index;
        self.blocks.push(block);
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
        for block in &mut self.blocks {
            block.page = index;
        }
    }

    /// Check if the page has no text blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get bitmap dimensions as (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_blank_page() {
        let page = Page::blank(2, 40, 30);
        assert!(page.synthetic);
        assert!(page.is_empty());
        assert_eq!(page.dimensions(), (40, 30));
        assert_eq!(page.bitmap.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_add_block_sets_page() {
        let mut page = Page::new(4, RgbaImage::new(10, 10));
        page.add_block(TextBlock::new("x", BBox::default(), 0));
        assert_eq!(page.blocks[0].page, 4);
        assert_eq!(page.blocks.len(), 1);
        assert!(!page.synthetic);
    }
}
