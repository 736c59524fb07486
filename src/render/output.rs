//! Writing annotated pages and the run summary to disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::align::ChangeSummary;
use crate::error::Result;
use crate::model::{AnnotationRegion, Bitmap, Side};
use crate::pipeline::Diagnostics;

/// File name of the JSON summary inside an output directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Machine-readable summary of one comparison, written next to the pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// When the comparison finished
    pub generated_at: DateTime<Utc>,

    /// Pages per side after pairing
    pub page_count: usize,

    /// Aggregate change counts
    pub changes: ChangeSummary,

    /// Every painted region
    pub regions: Vec<AnnotationRegion>,

    /// Substituted pages and projection gaps
    pub diagnostics: Diagnostics,
}

/// Output file name of a page: `original_page_1.png` for the first page.
pub fn page_file_name(side: Side, index: usize) -> String {
    format!("{}_page_{}.png", side, index + 1)
}

/// Write one side's pages as PNG files into `dir`, creating it if needed.
pub fn write_pages(dir: &Path, side: Side, pages: &[Bitmap]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(pages.len());
    for (index, bitmap) in pages.iter().enumerate() {
        let path = dir.join(page_file_name(side, index));
        bitmap.save_with_format(&path, ImageFormat::Png)?;
        paths.push(path);
    }
    log::info!("Wrote {} {} pages to {}", pages.len(), side, dir.display());
    Ok(paths)
}

/// Write `summary` as pretty JSON into `dir`.
pub fn write_summary(dir: &Path, summary: &Summary) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SUMMARY_FILE);
    fs::write(&path, serde_json::to_string_pretty(summary)?)?;
    Ok(path)
}

/// Encode a bitmap as PNG bytes.
#[cfg(feature = "async")]
pub(crate) fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    bitmap.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Async variant of [`write_pages`] using `tokio::fs`.
#[cfg(feature = "async")]
pub async fn write_pages_async(dir: &Path, side: Side, pages: &[Bitmap]) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;
    let mut paths = Vec::with_capacity(pages.len());
    for (index, bitmap) in pages.iter().enumerate() {
        let path = dir.join(page_file_name(side, index));
        tokio::fs::write(&path, encode_png(bitmap)?).await?;
        paths.push(path);
    }
    Ok(paths)
}

/// Async variant of [`write_summary`] using `tokio::fs`.
#[cfg(feature = "async")]
pub async fn write_summary_async(dir: &Path, summary: &Summary) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(SUMMARY_FILE);
    tokio::fs::write(&path, serde_json::to_string_pretty(summary)?).await?;
    Ok(path)
}
