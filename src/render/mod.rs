//! Annotation compositing onto page bitmaps.
//!
//! Each page is rendered onto a copy of its raw bitmap. Line regions are
//! painted before word regions so word highlights stay visible on top.

pub mod output;
mod style;

pub use output::{page_file_name, write_pages, write_summary, Summary, SUMMARY_FILE};
pub use style::RenderStyle;

use image::Pixel;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rayon::prelude::*;

use crate::error::{Error, Result, Stage};
use crate::model::{AnnotationRegion, Bitmap, Document, Page};
use crate::pipeline::CancellationToken;

/// Composites annotation regions onto page bitmaps.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationRenderer {
    style: RenderStyle,
    parallel: bool,
}

impl AnnotationRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style,
            parallel: true,
        }
    }

    /// Render pages on the rayon pool (default) or one after another.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Paint `regions` onto a copy of `bitmap`.
    ///
    /// Regions with no area are skipped. The input bitmap is left untouched.
    pub fn render_page(&self, bitmap: &Bitmap, regions: &[&AnnotationRegion]) -> Bitmap {
        let mut canvas = bitmap.clone();
        let mut ordered: Vec<&AnnotationRegion> = regions
            .iter()
            .copied()
            .filter(|r| !r.rect.is_empty())
            .collect();
        // Stable: keeps projection order within each granularity.
        ordered.sort_by_key(|r| r.granularity);

        for region in ordered {
            self.paint(&mut canvas, region);
        }
        canvas
    }

    /// Render every page of `doc` with the regions that belong to it.
    ///
    /// `cancel` is checked before each page; `on_page` is called with the
    /// page index once that page is done.
    pub fn render_document<F>(
        &self,
        doc: &Document,
        regions: &[AnnotationRegion],
        cancel: &CancellationToken,
        on_page: F,
    ) -> Result<Vec<Bitmap>>
    where
        F: Fn(usize) + Sync,
    {
        if let Some(stray) = regions
            .iter()
            .find(|r| r.side == doc.side && r.page >= doc.page_count())
        {
            return Err(Error::Render {
                side: doc.side,
                page: stray.page,
                reason: format!("document has only {} pages", doc.page_count()),
            });
        }

        let render_one = |page: &Page| -> Result<Bitmap> {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled {
                    stage: Stage::Render,
                });
            }
            let on_this_page: Vec<&AnnotationRegion> = regions
                .iter()
                .filter(|r| r.side == doc.side && r.page == page.index)
                .collect();
            let bitmap = self.render_page(&page.bitmap, &on_this_page);
            on_page(page.index);
            Ok(bitmap)
        };

        let pages = if self.parallel {
            doc.pages.par_iter().map(render_one).collect::<Result<Vec<_>>>()?
        } else {
            doc.pages.iter().map(render_one).collect::<Result<Vec<_>>>()?
        };

        log::debug!(
            "Rendered {} {} pages with {} regions",
            pages.len(),
            doc.side,
            regions.iter().filter(|r| r.side == doc.side).count()
        );
        Ok(pages)
    }

    fn paint(&self, canvas: &mut Bitmap, region: &AnnotationRegion) {
        let (width, height) = canvas.dimensions();
        let rect = region.rect;

        let fill = self
            .style
            .fill(region.classification, region.granularity);
        if fill[3] > 0 {
            for y in rect.y..rect.bottom().min(height) {
                for x in rect.x..rect.right().min(width) {
                    canvas.get_pixel_mut(x, y).blend(&fill);
                }
            }
        }

        // Border rings sit just outside the fill; off-page pixels are ignored.
        let stroke = self.style.stroke(region.classification);
        for ring in 1..=self.style.border_width(region.granularity) {
            let outline = Rect::at(rect.x as i32 - ring as i32, rect.y as i32 - ring as i32)
                .of_size(rect.width + 2 * ring, rect.height + 2 * ring);
            draw_hollow_rect_mut(canvas, outline, stroke);
        }
    }
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new(RenderStyle::default())
    }
}
