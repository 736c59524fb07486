//! Page-count equalization between the two documents.

use crate::model::{Document, Page};

/// Pixel size used for blank pages when neither document has a real page.
pub const FALLBACK_PAGE_SIZE: (u32, u32) = (800, 1000);

/// Pads the shorter document with blank pages.
#[derive(Debug, Clone, Copy)]
pub struct PagePairer {
    fallback_size: (u32, u32),
}

impl PagePairer {
    pub fn new() -> Self {
        Self {
            fallback_size: FALLBACK_PAGE_SIZE,
        }
    }

    /// Set the blank page size used when both documents are empty.
    pub fn with_fallback_size(mut self, width: u32, height: u32) -> Self {
        self.fallback_size = (width, height);
        self
    }

    /// Size for padding pages: the original's first real page, then the
    /// modified document's, then the fallback.
    pub fn blank_size(&self, original: &Document, modified: &Document) -> (u32, u32) {
        original
            .first_page_size()
            .or_else(|| modified.first_page_size())
            .unwrap_or(self.fallback_size)
    }

    /// Append blank pages until both documents have the same page count.
    ///
    /// Returns the number of pages added to each side.
    pub fn pair(&self, original: &mut Document, modified: &mut Document) -> (usize, usize) {
        let target = original.page_count().max(modified.page_count());
        let (width, height) = self.blank_size(original, modified);

        let mut added = [0usize; 2];
        for (doc, count) in [original, modified].into_iter().zip(added.iter_mut()) {
            while doc.page_count() < target {
                doc.add_page(Page::blank(doc.page_count(), width, height));
                *count += 1;
            }
            if *count > 0 {
                log::info!(
                    "Padded {} document with {} blank page(s) of {}x{}",
                    doc.side,
                    count,
                    width,
                    height
                );
            }
        }
        (added[0], added[1])
    }
}

impl Default for PagePairer {
    fn default() -> Self {
        Self::new()
    }
}
