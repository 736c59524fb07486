//! Collaborator interfaces: page sources, token detectors and loaders.
//!
//! Rasterizing pages and extracting their text happen outside the engine.
//! A [`DocumentLoader`] turns a file into a [`PageSource`]; a
//! [`LoaderRegistry`] picks the loader by file extension.
//!
//! # Example
//!
//! ```no_run
//! use pagediff::source::{LoaderRegistry, Workspace};
//! use std::path::Path;
//!
//! fn main() -> pagediff::Result<()> {
//!     let registry = LoaderRegistry::with_defaults();
//!     let workspace = Workspace::new()?;
//!     let source = registry.load(Path::new("contract_v1.json"), &workspace, 150.0)?;
//!     println!("{} pages", source.page_count());
//!     Ok(())
//! }
//! ```

mod manifest;
mod workspace;

pub use manifest::{Manifest, ManifestBlock, ManifestLoader, ManifestPage, ManifestSource};
pub use workspace::Workspace;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Bitmap, TextBlock};
use crate::project::DetectedToken;

/// A paginated document that can be rasterized and read page by page.
pub trait PageSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render one page at the resolution chosen when the source was loaded.
    fn rasterize(&self, page: usize) -> Result<Bitmap>;

    /// Text blocks of one page in reading order, boxes in source units.
    ///
    /// An empty list is valid.
    fn extract_blocks(&self, page: usize) -> Result<Vec<TextBlock>>;

    /// Tokens recognized ahead of time for one page, in pixel units.
    ///
    /// Sources without recognition data return `None`.
    fn detected_tokens(&self, _page: usize) -> Option<Vec<DetectedToken>> {
        None
    }
}

/// Optical recognition over a page bitmap.
pub trait TokenDetector: Send + Sync {
    /// Recognize word tokens with confidences (0 to 100) and pixel boxes.
    fn detect(&self, bitmap: &Bitmap) -> Result<Vec<DetectedToken>>;
}

/// Opens files of some format as page sources.
pub trait DocumentLoader: Send + Sync {
    /// Lowercase extensions without the dot, e.g. `["json"]`.
    fn supported_extensions(&self) -> &[&str];

    fn name(&self) -> &str;

    /// Open `path`, rasterizing at `dpi`. Scratch files go in `workspace`.
    fn load(&self, path: &Path, workspace: &Workspace, dpi: f32) -> Result<Box<dyn PageSource>>;

    /// Check if this loader handles the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Maps file extensions to document loaders.
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
    by_name: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in manifest loader.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ManifestLoader::new()));
        registry
    }

    /// Register a loader for all its extensions.
    ///
    /// A later registration replaces an earlier one for the same extension.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) {
        for ext in loader.supported_extensions() {
            self.loaders.insert(ext.to_lowercase(), loader.clone());
        }
        self.by_name.insert(loader.name().to_lowercase(), loader);
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentLoader>> {
        self.loaders.get(&ext.to_lowercase()).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentLoader>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.loaders.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.loaders.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Open a file with the loader registered for its extension.
    pub fn load(
        &self,
        path: &Path,
        workspace: &Workspace,
        dpi: f32,
    ) -> Result<Box<dyn PageSource>> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            Error::UnsupportedFormat(format!("{} has no extension", path.display()))
        })?;

        let loader = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no loader for .{}", ext)))?;

        log::debug!("Loading {} with {} loader", path.display(), loader.name());
        loader.load(path, workspace, dpi)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
