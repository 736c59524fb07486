//! # pagediff
//!
//! Visual difference engine for paginated documents.
//!
//! Two documents are compared by their extracted text, line by line and,
//! where a single line was changed, word by word. The differences are then
//! projected back onto the rendered pages as translucent highlights.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagediff::compare_files;
//!
//! fn main() -> pagediff::Result<()> {
//!     let result = compare_files("v1/manifest.json", "v2/manifest.json")?;
//!     println!(
//!         "{} deletions, {} insertions, {} modifications",
//!         result.changes.deletions, result.changes.insertions, result.changes.modifications
//!     );
//!     result.save("comparison")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Line and word alignment**: deterministic longest-matching-block diff
//! - **Page pairing**: documents with different page counts are padded
//! - **Approximate geometry**: word boxes interpolated inside line boxes
//! - **Optical path**: words matched to detected tokens by fuzzy similarity
//! - **Parallel processing**: uses Rayon for per-page extraction and rendering

pub mod align;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pair;
pub mod pipeline;
pub mod project;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use align::{ChangeSummary, DiffReport, OpTag, Opcode, SequenceAligner};
pub use error::{Error, Result, Stage};
pub use model::{
    AnnotationRegion, BBox, Bitmap, BlockRef, Classification, Document, Granularity, Page,
    PixelRect, Side, TextBlock,
};
pub use normalize::{comparison_key, DocumentNormalizer, KeySequence};
pub use pair::PagePairer;
pub use pipeline::{
    CancellationToken, Comparator, CompareOptions, ComparisonResult, Diagnostics, Progress,
};
pub use project::{DetectedToken, FuzzyOptions, GeometryMode, SpatialProjector};
pub use render::{AnnotationRenderer, RenderStyle};
pub use source::{DocumentLoader, LoaderRegistry, PageSource, TokenDetector, Workspace};

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Sender;

/// Compare two files with default options.
///
/// The loader is chosen by file extension; `.json` page manifests are
/// supported out of the box.
///
/// # Example
///
/// ```no_run
/// use pagediff::compare_files;
///
/// let result = compare_files("old.json", "new.json").unwrap();
/// assert_eq!(result.original.len(), result.modified.len());
/// ```
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
    original: P,
    modified: Q,
) -> Result<ComparisonResult> {
    Pagediff::new().compare_files(original, modified)
}

/// Compare two in-memory documents with default options.
pub fn compare_documents(original: Document, modified: Document) -> Result<ComparisonResult> {
    Comparator::default().compare_documents(original, modified)
}

/// Builder for configuring and running comparisons.
///
/// # Example
///
/// ```no_run
/// use pagediff::{FuzzyOptions, Pagediff};
///
/// let result = Pagediff::new()
///     .with_dpi(200.0)
///     .with_fuzzy(FuzzyOptions::new().with_min_confidence(70.0))
///     .sequential()
///     .compare_files("old.json", "new.json")?;
/// result.save("out")?;
/// # Ok::<(), pagediff::Error>(())
/// ```
pub struct Pagediff {
    options: CompareOptions,
    registry: LoaderRegistry,
    detector: Option<Arc<dyn TokenDetector>>,
}

impl Pagediff {
    /// Create a builder with default options and loaders.
    pub fn new() -> Self {
        Self {
            options: CompareOptions::default(),
            registry: LoaderRegistry::with_defaults(),
            detector: None,
        }
    }

    /// Set output resolution.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.options = self.options.with_dpi(dpi);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Place changed words using detected tokens.
    pub fn with_fuzzy(mut self, fuzzy: FuzzyOptions) -> Self {
        self.options = self.options.with_fuzzy(fuzzy);
        self
    }

    /// Set overlay style.
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.options = self.options.with_style(style);
        self
    }

    /// Share a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.options = self.options.with_cancellation(token);
        self
    }

    /// Send progress events to `sender`.
    pub fn with_progress(mut self, sender: Sender<Progress>) -> Self {
        self.options = self.options.with_progress(sender);
        self
    }

    /// Register an additional document loader.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.registry.register(loader);
        self
    }

    /// Set the token detector for the optical path.
    pub fn with_detector(mut self, detector: Arc<dyn TokenDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn comparator(&self) -> Comparator {
        let comparator = Comparator::new(self.options.clone());
        match &self.detector {
            Some(detector) => comparator.with_detector(detector.clone()),
            None => comparator,
        }
    }

    /// Compare two files.
    pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        original: P,
        modified: Q,
    ) -> Result<ComparisonResult> {
        self.comparator()
            .compare_files(&self.registry, original.as_ref(), modified.as_ref())
    }

    /// Compare two page sources.
    pub fn compare(
        &self,
        original: &dyn PageSource,
        modified: &dyn PageSource,
    ) -> Result<ComparisonResult> {
        self.comparator().compare(original, modified)
    }

    /// Compare two in-memory documents.
    pub fn compare_documents(
        &self,
        original: Document,
        modified: Document,
    ) -> Result<ComparisonResult> {
        self.comparator().compare_documents(original, modified)
    }
}

impl Default for Pagediff {
    fn default() -> Self {
        Self::new()
    }
}
