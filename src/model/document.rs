//! Document-level types.

use super::{BlockRef, Page, TextBlock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input of a comparison a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Document A, the old version
    Original,
    /// Document B, the new version
    Modified,
}

impl Side {
    /// Both sides in comparison order.
    pub const BOTH: [Side; 2] = [Side::Original, Side::Modified];

    /// Lowercase name, also used as the output file prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Original => "original",
            Side::Modified => "modified",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A paginated document ready for comparison.
#[derive(Debug, Clone)]
pub struct Document {
    /// Which input this document is
    pub side: Side,

    /// Pages in order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            pages: Vec::new(),
        }
    }

    /// Create a document from pages, reindexing them in order.
    pub fn from_pages(side: Side, pages: Vec<Page>) -> Self {
        let mut doc = Self::new(side);
        for page in pages {
            doc.add_page(page);
        }
        doc
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add a page to the end of the document.
    ///
    /// The page index and its blocks' page references are rewritten to the
    /// page's position.
    pub fn add_page(&mut self, mut page: Page) {
        page.set_index(self.pages.len());
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Look up a block by reference.
    pub fn block(&self, block_ref: BlockRef) -> Option<&TextBlock> {
        self.pages
            .get(block_ref.page)
            .and_then(|page| page.blocks.get(block_ref.block))
    }

    /// Iterate over every block in page order with its reference.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockRef, &TextBlock)> {
        self.pages.iter().flat_map(|page| {
            page.blocks
                .iter()
                .enumerate()
                .map(move |(i, block)| (BlockRef::new(page.index, i), block))
        })
    }

    /// Dimensions of the first non-synthetic page.
    pub fn first_page_size(&self) -> Option<(u32, u32)> {
        self.pages
            .iter()
            .find(|page| !page.synthetic)
            .map(|page| page.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_document_new() {
        let doc = Document::new(Side::Original);
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_add_page_reindexes() {
        let mut doc = Document::new(Side::Modified);
        let mut page = Page::blank(7, 10, 10);
        page.add_block(TextBlock::new("hello", BBox::new(0.0, 0.0, 5.0, 5.0), 7));
        doc.add_page(Page::blank(0, 10, 10));
        doc.add_page(page);

        assert_eq!(doc.pages[1].index, 1);
        assert_eq!(doc.pages[1].blocks[0].page, 1);
        assert_eq!(
            doc.block(BlockRef::new(1, 0)).map(|b| b.text.as_str()),
            Some("hello")
        );
    }

    #[test]
    fn test_blocks_in_page_order() {
        let mut first = Page::blank(0, 10, 10);
        first.add_block(TextBlock::new("a", BBox::default(), 0));
        let mut second = Page::blank(1, 10, 10);
        second.add_block(TextBlock::new("b", BBox::default(), 1));
        second.add_block(TextBlock::new("c", BBox::default(), 1));
        let doc = Document::from_pages(Side::Original, vec![first, second]);

        let texts: Vec<_> = doc.blocks().map(|(_, b)| b.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Original.to_string(), "original");
        assert_eq!(Side::Modified.as_str(), "modified");
    }
}
