//! Comparison results and diagnostics.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::align::{ChangeSummary, DiffReport};
use crate::error::Result;
use crate::model::{AnnotationRegion, Bitmap, Side};
use crate::project::ProjectionDiagnostics;
use crate::render::{self, Summary};

/// A page that could not be extracted and was replaced by a blank page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub side: Side,
    pub page: usize,
    pub reason: String,
}

/// Non-fatal outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Pages substituted after extraction failures
    pub substituted: Vec<PageFailure>,

    /// Blank pages appended to the original by pairing
    pub padded_original: usize,

    /// Blank pages appended to the modified document by pairing
    pub padded_modified: usize,

    /// Unplaced words and clipped or dropped rectangles
    pub projection: ProjectionDiagnostics,
}

impl Diagnostics {
    /// Whether the run completed without any degradation.
    pub fn is_clean(&self) -> bool {
        self.substituted.is_empty()
            && self.projection.gaps.is_empty()
            && self.projection.dropped == 0
    }
}

/// Output of a comparison: annotated pages, regions and counts.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// Annotated original pages
    pub original: Vec<Bitmap>,

    /// Annotated modified pages, same length as `original`
    pub modified: Vec<Bitmap>,

    /// Every painted region
    pub regions: Vec<AnnotationRegion>,

    /// Line and word alignment
    pub report: DiffReport,

    /// Aggregate change counts
    pub changes: ChangeSummary,

    pub diagnostics: Diagnostics,
}

impl ComparisonResult {
    /// Pages per side.
    pub fn page_count(&self) -> usize {
        self.original.len()
    }

    /// Annotated pages of one side.
    pub fn pages(&self, side: Side) -> &[Bitmap] {
        match side {
            Side::Original => &self.original,
            Side::Modified => &self.modified,
        }
    }

    /// Regions painted on one page of one side.
    pub fn regions_on(&self, side: Side, page: usize) -> impl Iterator<Item = &AnnotationRegion> {
        self.regions
            .iter()
            .filter(move |r| r.side == side && r.page == page)
    }

    /// Whether the documents compared equal.
    pub fn is_identical(&self) -> bool {
        self.report.is_identical()
    }

    /// Summary record stamped with the current time.
    pub fn summary(&self) -> Summary {
        Summary {
            generated_at: Utc::now(),
            page_count: self.page_count(),
            changes: self.changes,
            regions: self.regions.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Write all annotated pages and `summary.json` into `dir`.
    ///
    /// Returns the written paths, pages first.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut paths = Vec::with_capacity(self.page_count() * 2 + 1);
        for side in Side::BOTH {
            paths.extend(render::write_pages(dir, side, self.pages(side))?);
        }
        paths.push(render::write_summary(dir, &self.summary())?);
        Ok(paths)
    }

    /// Save into a new `compare_YYYYMMDD_HHMMSS` directory under `parent`.
    pub fn save_timestamped(&self, parent: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = parent
            .as_ref()
            .join(format!("compare_{}", Utc::now().format("%Y%m%d_%H%M%S")));
        self.save(&dir)?;
        Ok(dir)
    }

    /// Async variant of [`save`](Self::save).
    #[cfg(feature = "async")]
    pub async fn save_async(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut paths = Vec::with_capacity(self.page_count() * 2 + 1);
        for side in Side::BOTH {
            paths.extend(render::output::write_pages_async(dir, side, self.pages(side)).await?);
        }
        paths.push(render::output::write_summary_async(dir, &self.summary()).await?);
        Ok(paths)
    }
}
