//! Projection of block changes onto page pixels.
//!
//! Line-level changes cover the block's whole box. Word-level changes are
//! placed either by interpolating within the block box or, on the optical
//! recognition path, by correlating each word with a detected token.

mod fuzzy;
mod geometry;

pub use fuzzy::{DetectedToken, FuzzyOptions, TokenCorrelator};
pub use geometry::{fit_to_page, word_positions, Fit, BASELINE_DPI};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::align::{BlockChange, DiffReport};
use crate::model::{
    AnnotationRegion, BBox, BlockRef, Classification, Document, Granularity, Side, TextBlock,
};

/// Detected tokens keyed by side and page index.
pub type PageTokens = HashMap<(Side, usize), Vec<DetectedToken>>;

/// Where word geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GeometryMode {
    /// Interpolate word boxes from character offsets
    #[default]
    Interpolated,
    /// Correlate words with detected tokens
    Detected(FuzzyOptions),
}

/// A changed word that could not be placed on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionGap {
    pub side: Side,
    pub page: usize,
    pub block: BlockRef,
    pub word_index: usize,
    pub word: String,
}

/// Non-fatal projection outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionDiagnostics {
    /// Words without an acceptable token
    pub gaps: Vec<ProjectionGap>,
    /// Rectangles partly outside their page
    pub clipped: usize,
    /// Rectangles with nothing left on the page
    pub dropped: usize,
    /// Detected tokens left unmatched on pages where words were correlated
    #[serde(default)]
    pub unused_tokens: usize,
}

/// Regions of one run plus what could not be projected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub regions: Vec<AnnotationRegion>,
    pub diagnostics: ProjectionDiagnostics,
}

/// Maps block changes to pixel rectangles.
#[derive(Debug, Clone, Copy)]
pub struct SpatialProjector {
    scale: f32,
    geometry: GeometryMode,
}

impl SpatialProjector {
    /// Projector for bitmaps rendered at `dpi` from `baseline_dpi` source units.
    pub fn new(dpi: f32, baseline_dpi: f32) -> Self {
        Self {
            scale: dpi / baseline_dpi,
            geometry: GeometryMode::Interpolated,
        }
    }

    pub fn with_geometry(mut self, geometry: GeometryMode) -> Self {
        self.geometry = geometry;
        self
    }

    /// Project every change of `report` onto the paired documents.
    pub fn project(
        &self,
        report: &DiffReport,
        original: &Document,
        modified: &Document,
        tokens: &PageTokens,
    ) -> Projection {
        let page_limit = original.page_count().min(modified.page_count());
        let mut projection = Projection::default();
        let mut correlators: HashMap<(Side, usize), TokenCorrelator<'_>> = HashMap::new();

        for change in &report.changes {
            let doc = match change.side {
                Side::Original => original,
                Side::Modified => modified,
            };
            let Some(block) = doc.block(change.block) else {
                projection.diagnostics.dropped += 1;
                continue;
            };
            if block.page >= page_limit {
                projection.diagnostics.dropped += 1;
                continue;
            }
            let size = doc.pages[block.page].dimensions();

            match (change.granularity, self.geometry) {
                (Granularity::Line, _) => place(
                    &mut projection,
                    change,
                    block,
                    change.classification,
                    block.bbox.scale(self.scale),
                    size,
                ),
                (Granularity::Word, GeometryMode::Interpolated) => {
                    let positions = word_positions(&block.key, block.bbox);
                    for mark in &change.words {
                        match positions.get(mark.index) {
                            Some(bbox) => place(
                                &mut projection,
                                change,
                                block,
                                mark.classification,
                                bbox.scale(self.scale),
                                size,
                            ),
                            None => projection.diagnostics.dropped += 1,
                        }
                    }
                }
                (Granularity::Word, GeometryMode::Detected(options)) => {
                    let page_tokens = tokens
                        .get(&(change.side, block.page))
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    let correlator = correlators
                        .entry((change.side, block.page))
                        .or_insert_with(|| TokenCorrelator::new(page_tokens, options));
                    let words: Vec<&str> = block.key.split_whitespace().collect();
                    for mark in &change.words {
                        let word = words.get(mark.index).copied().unwrap_or_default();
                        match correlator.correlate(word) {
                            Some(token) => place(
                                &mut projection,
                                change,
                                block,
                                mark.classification,
                                token.bbox,
                                size,
                            ),
                            None => {
                                log::debug!(
                                    "No token for word {:?} on {} page {}",
                                    word,
                                    change.side,
                                    block.page
                                );
                                projection.diagnostics.gaps.push(ProjectionGap {
                                    side: change.side,
                                    page: block.page,
                                    block: change.block,
                                    word_index: mark.index,
                                    word: word.to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }

        projection.diagnostics.unused_tokens =
            correlators.values().map(TokenCorrelator::remaining).sum();

        log::debug!(
            "Projected {} regions ({} gaps, {} clipped, {} dropped, {} unused tokens)",
            projection.regions.len(),
            projection.diagnostics.gaps.len(),
            projection.diagnostics.clipped,
            projection.diagnostics.dropped,
            projection.diagnostics.unused_tokens
        );
        projection
    }
}

impl Default for SpatialProjector {
    fn default() -> Self {
        Self::new(150.0, BASELINE_DPI)
    }
}

/// Clip `bbox` (pixels) to the page and record the resulting region.
fn place(
    projection: &mut Projection,
    change: &BlockChange,
    block: &TextBlock,
    classification: Classification,
    bbox: BBox,
    (width, height): (u32, u32),
) {
    let rect = match fit_to_page(bbox, width, height) {
        Fit::Inside(rect) => rect,
        Fit::Clipped(rect) => {
            projection.diagnostics.clipped += 1;
            rect
        }
        Fit::Outside => {
            projection.diagnostics.dropped += 1;
            return;
        }
    };
    projection.regions.push(AnnotationRegion {
        page: block.page,
        side: change.side,
        rect,
        classification,
        granularity: change.granularity,
        block: change.block,
    });
}
