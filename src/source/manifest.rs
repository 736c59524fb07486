//! JSON page manifests.
//!
//! A manifest describes a document that was rasterized and extracted by an
//! external tool: one entry per page with the page image (relative to the
//! manifest file) and the page's text blocks in points.
//!
//! ```json
//! {
//!   "dpi": 150,
//!   "pages": [
//!     {
//!       "image": "page_1.png",
//!       "blocks": [
//!         { "text": "Total due", "bbox": { "x0": 72, "y0": 90, "x1": 160, "y1": 102 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Pages may also carry pre-recognized `tokens` for the optical path.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use super::{DocumentLoader, PageSource, Workspace};
use crate::error::{Error, Result};
use crate::model::{BBox, Bitmap, TextBlock};
use crate::project::DetectedToken;

fn default_dpi() -> f32 {
    150.0
}

/// Parsed manifest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Resolution the page images were rendered at
    #[serde(default = "default_dpi")]
    pub dpi: f32,

    pub pages: Vec<ManifestPage>,
}

/// One page entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestPage {
    /// Image path, relative to the manifest
    pub image: PathBuf,

    #[serde(default)]
    pub blocks: Vec<ManifestBlock>,

    /// Pre-recognized tokens in pixel units of `image`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<DetectedToken>>,
}

/// One text block entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestBlock {
    pub text: String,
    pub bbox: BBox,
}

impl Manifest {
    /// Parse and validate manifest JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(json).map_err(|e| Error::Manifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| match e {
            Error::Manifest(reason) => Error::Manifest(format!("{}: {}", path.display(), reason)),
            other => other,
        })
    }

    fn validate(&self) -> Result<()> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(Error::Manifest(format!("dpi must be positive, got {}", self.dpi)));
        }
        if let Some(index) = self
            .pages
            .iter()
            .position(|p| p.image.as_os_str().is_empty())
        {
            return Err(Error::Manifest(format!("page {} has no image", index + 1)));
        }
        Ok(())
    }
}

/// Page source backed by a manifest and its page images.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    manifest: Manifest,
    base_dir: PathBuf,
    dpi: f32,
}

impl ManifestSource {
    /// Serve `manifest` with images resolved against `base_dir`, resampled
    /// to `dpi` when it differs from the manifest's resolution.
    pub fn new(manifest: Manifest, base_dir: impl Into<PathBuf>, dpi: f32) -> Self {
        Self {
            manifest,
            base_dir: base_dir.into(),
            dpi,
        }
    }

    fn page(&self, index: usize) -> Result<&ManifestPage> {
        self.manifest.pages.get(index).ok_or_else(|| {
            Error::Manifest(format!(
                "page {} out of range ({} pages)",
                index + 1,
                self.manifest.pages.len()
            ))
        })
    }

    fn resample_factor(&self) -> f32 {
        self.dpi / self.manifest.dpi
    }
}

impl PageSource for ManifestSource {
    fn page_count(&self) -> usize {
        self.manifest.pages.len()
    }

    fn rasterize(&self, page: usize) -> Result<Bitmap> {
        let entry = self.page(page)?;
        let bitmap = image::open(self.base_dir.join(&entry.image))?.to_rgba8();

        let factor = self.resample_factor();
        if (factor - 1.0).abs() < 1e-3 {
            return Ok(bitmap);
        }
        let (width, height) = bitmap.dimensions();
        let width = ((width as f32 * factor).round() as u32).max(1);
        let height = ((height as f32 * factor).round() as u32).max(1);
        Ok(imageops::resize(&bitmap, width, height, FilterType::Triangle))
    }

    fn extract_blocks(&self, page: usize) -> Result<Vec<TextBlock>> {
        let entry = self.page(page)?;
        Ok(entry
            .blocks
            .iter()
            .map(|b| TextBlock::new(b.text.as_str(), b.bbox, page))
            .collect())
    }

    fn detected_tokens(&self, page: usize) -> Option<Vec<DetectedToken>> {
        let factor = self.resample_factor();
        let tokens = self.manifest.pages.get(page)?.tokens.as_ref()?;
        Some(
            tokens
                .iter()
                .map(|t| DetectedToken::new(t.text.as_str(), t.confidence, t.bbox.scale(factor)))
                .collect(),
        )
    }
}

/// Loads `.json` page manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for ManifestLoader {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "manifest"
    }

    fn load(&self, path: &Path, _workspace: &Workspace, dpi: f32) -> Result<Box<dyn PageSource>> {
        let manifest = Manifest::from_path(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        log::debug!(
            "Manifest {} lists {} pages at {} dpi",
            path.display(),
            manifest.pages.len(),
            manifest.dpi
        );
        Ok(Box::new(ManifestSource::new(manifest, base_dir, dpi)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const MANIFEST: &str = r#"{
        "dpi": 72,
        "pages": [
            {
                "image": "p1.png",
                "blocks": [
                    { "text": "  Hello  World ", "bbox": { "x0": 1, "y0": 2, "x1": 30, "y1": 8 } }
                ],
                "tokens": [
                    {
                        "text": "Hello",
                        "confidence": 97.5,
                        "bbox": { "x0": 1, "y0": 2, "x1": 10, "y1": 8 }
                    }
                ]
            },
            { "image": "missing.png" }
        ]
    }"#;

    fn write_fixture(dir: &Path) -> PathBuf {
        RgbaImage::from_pixel(40, 20, Rgba([200, 200, 200, 255]))
            .save(dir.join("p1.png"))
            .unwrap();
        let path = dir.join("doc.json");
        fs::write(&path, MANIFEST).unwrap();
        path
    }

    #[test]
    fn test_manifest_parse() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.dpi, 72.0);
        assert_eq!(manifest.pages.len(), 2);
        assert!(manifest.pages[1].blocks.is_empty());
        assert!(manifest.pages[1].tokens.is_none());
    }

    #[test]
    fn test_manifest_defaults_and_validation() {
        let manifest = Manifest::from_json(r#"{ "pages": [] }"#).unwrap();
        assert_eq!(manifest.dpi, 150.0);

        let bad_dpi = Manifest::from_json(r#"{ "dpi": 0, "pages": [] }"#);
        assert!(matches!(bad_dpi, Err(Error::Manifest(_))));

        let no_image = Manifest::from_json(r#"{ "pages": [ { "image": "" } ] }"#);
        assert!(matches!(no_image, Err(Error::Manifest(_))));

        assert!(matches!(Manifest::from_json("{"), Err(Error::Manifest(_))));
    }

    #[test]
    fn test_load_and_read_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let workspace = Workspace::new().unwrap();
        let source = ManifestLoader::new().load(&path, &workspace, 72.0).unwrap();

        assert_eq!(source.page_count(), 2);
        assert_eq!(source.rasterize(0).unwrap().dimensions(), (40, 20));
        let blocks = source.extract_blocks(0).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hello  World");
        assert_eq!(blocks[0].key, "hello world");

        // Listed but absent image fails only that page
        assert!(source.rasterize(1).is_err());
        assert!(source.extract_blocks(1).unwrap().is_empty());
        assert!(matches!(source.extract_blocks(5), Err(Error::Manifest(_))));
    }

    #[test]
    fn test_resamples_to_requested_dpi() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let workspace = Workspace::new().unwrap();
        let source = ManifestLoader::new().load(&path, &workspace, 144.0).unwrap();

        assert_eq!(source.rasterize(0).unwrap().dimensions(), (80, 40));
        let tokens = source.detected_tokens(0).unwrap();
        assert_eq!(tokens[0].bbox, BBox::new(2.0, 4.0, 20.0, 16.0));
        assert!(source.detected_tokens(1).is_none());
    }
}
