//! The comparison pipeline.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use super::options::{CompareOptions, Progress};
use super::result::{ComparisonResult, Diagnostics, PageFailure};
use crate::align::SequenceAligner;
use crate::error::{Error, Result, Stage};
use crate::model::{Bitmap, Document, Page, Side};
use crate::normalize::DocumentNormalizer;
use crate::pair::PagePairer;
use crate::project::{DetectedToken, GeometryMode, PageTokens, SpatialProjector};
use crate::render::AnnotationRenderer;
use crate::source::{LoaderRegistry, PageSource, TokenDetector, Workspace};

/// One document read from its source.
struct Extracted {
    document: Document,
    tokens: PageTokens,
    failures: Vec<PageFailure>,
}

/// Runs comparisons with a fixed set of options.
pub struct Comparator {
    options: CompareOptions,
    detector: Option<Arc<dyn TokenDetector>>,
}

impl Comparator {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            options,
            detector: None,
        }
    }

    /// Recognize tokens on pages whose source supplies none.
    pub fn with_detector(mut self, detector: Arc<dyn TokenDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Compare two files, each opened by the registry's loader for its
    /// extension. Scratch files live in a workspace removed on return.
    pub fn compare_files(
        &self,
        registry: &LoaderRegistry,
        original: &Path,
        modified: &Path,
    ) -> Result<ComparisonResult> {
        for (side, path) in [(Side::Original, original), (Side::Modified, modified)] {
            if !path.exists() {
                return Err(Error::MissingDocument { side });
            }
        }
        let workspace = Workspace::new()?;
        let original = registry.load(original, &workspace, self.options.dpi)?;
        let modified = registry.load(modified, &workspace, self.options.dpi)?;
        self.compare(original.as_ref(), modified.as_ref())
    }

    /// Compare two page sources.
    pub fn compare(
        &self,
        original: &dyn PageSource,
        modified: &dyn PageSource,
    ) -> Result<ComparisonResult> {
        self.compare_sources(Some(original), Some(modified))
    }

    /// Compare two page sources, either of which may be absent.
    pub fn compare_sources(
        &self,
        original: Option<&dyn PageSource>,
        modified: Option<&dyn PageSource>,
    ) -> Result<ComparisonResult> {
        self.options.validate()?;
        let original = original.ok_or(Error::MissingDocument {
            side: Side::Original,
        })?;
        let modified = modified.ok_or(Error::MissingDocument {
            side: Side::Modified,
        })?;

        self.enter(Stage::Extract)?;
        self.options.emit(Progress::PageCounts {
            original: original.page_count(),
            modified: modified.page_count(),
        });
        let a = self.extract(Side::Original, original)?;
        let b = self.extract(Side::Modified, modified)?;

        let mut diagnostics = Diagnostics::default();
        diagnostics.substituted.extend(a.failures);
        diagnostics.substituted.extend(b.failures);
        let mut tokens = a.tokens;
        tokens.extend(b.tokens);

        self.run(a.document, b.document, tokens, diagnostics)
    }

    /// Compare two documents that are already rasterized and extracted.
    ///
    /// Bitmaps must be at the configured dpi relative to block coordinates.
    pub fn compare_documents(
        &self,
        original: Document,
        modified: Document,
    ) -> Result<ComparisonResult> {
        self.options.validate()?;
        self.run(original, modified, PageTokens::new(), Diagnostics::default())
    }

    fn run(
        &self,
        mut original: Document,
        mut modified: Document,
        mut tokens: PageTokens,
        mut diagnostics: Diagnostics,
    ) -> Result<ComparisonResult> {
        let options = &self.options;
        // Regions are routed to bitmaps by side, so labels follow argument order.
        for (doc, side) in [(&mut original, Side::Original), (&mut modified, Side::Modified)] {
            if doc.side != side {
                log::warn!("Relabeling {} document passed as {}", doc.side, side);
                doc.side = side;
            }
        }

        self.enter(Stage::Normalize)?;
        let (old_keys, new_keys) = DocumentNormalizer::new().sequences(&original, &modified);

        self.enter(Stage::Align)?;
        let report = SequenceAligner::new().align(&old_keys, &new_keys)?;

        self.enter(Stage::Pair)?;
        let (width, height) = options.blank_page_size;
        let (padded_original, padded_modified) = PagePairer::new()
            .with_fallback_size(width, height)
            .pair(&mut original, &mut modified);
        diagnostics.padded_original = padded_original;
        diagnostics.padded_modified = padded_modified;

        self.enter(Stage::Project)?;
        if matches!(options.geometry, GeometryMode::Detected(_)) {
            self.detect_tokens(&original, &mut tokens);
            self.detect_tokens(&modified, &mut tokens);
        }
        let projection = SpatialProjector::new(options.dpi, options.baseline_dpi)
            .with_geometry(options.geometry)
            .project(&report, &original, &modified, &tokens);
        diagnostics.projection = projection.diagnostics;

        self.enter(Stage::Render)?;
        let renderer = AnnotationRenderer::new(options.style).with_parallel(options.parallel);
        let render = |doc: &Document| -> Result<Vec<Bitmap>> {
            let total = doc.page_count();
            renderer.render_document(doc, &projection.regions, &options.cancel, |page| {
                options.emit(Progress::PageRendered {
                    side: doc.side,
                    page,
                    total,
                })
            })
        };
        let original_pages = render(&original)?;
        let modified_pages = render(&modified)?;

        self.enter(Stage::Assemble)?;
        let changes = report.summary();
        log::info!(
            "Compared {} page pairs: {} deletions, {} insertions, {} modifications, {} regions",
            original_pages.len(),
            changes.deletions,
            changes.insertions,
            changes.modifications,
            projection.regions.len()
        );
        options.emit(Progress::Finished(changes));

        Ok(ComparisonResult {
            original: original_pages,
            modified: modified_pages,
            regions: projection.regions,
            report,
            changes,
            diagnostics,
        })
    }

    /// Check cancellation and announce `stage`.
    fn enter(&self, stage: Stage) -> Result<()> {
        self.options.cancel.check(stage)?;
        log::debug!("Entering {} stage", stage);
        self.options.emit(Progress::Stage(stage));
        Ok(())
    }

    /// Rasterize and read every page of `source`.
    ///
    /// Failed pages become blank pages sized like the side's first good page.
    fn extract(&self, side: Side, source: &dyn PageSource) -> Result<Extracted> {
        let options = &self.options;
        let total = source.page_count();

        let read_page = |index: usize| -> Result<Result<Page>> {
            options.cancel.check(Stage::Extract)?;
            let outcome = source.rasterize(index).and_then(|bitmap| {
                let blocks = source.extract_blocks(index)?;
                Ok(Page::new(index, bitmap).with_blocks(blocks))
            });
            options.emit(Progress::PageExtracted {
                side,
                page: index,
                total,
            });
            Ok(outcome)
        };

        let outcomes = if options.parallel {
            (0..total)
                .into_par_iter()
                .map(read_page)
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..total).map(read_page).collect::<Result<Vec<_>>>()?
        };

        if total > 0 && outcomes.iter().all(|o| o.is_err()) {
            return Err(Error::AllPagesFailed { side });
        }
        let (width, height) = outcomes
            .iter()
            .find_map(|o| o.as_ref().ok())
            .map(Page::dimensions)
            .unwrap_or(options.blank_page_size);

        let want_tokens = matches!(options.geometry, GeometryMode::Detected(_));
        let mut extracted = Extracted {
            document: Document::new(side),
            tokens: PageTokens::new(),
            failures: Vec::new(),
        };
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(page) => {
                    if want_tokens {
                        if let Some(found) = source.detected_tokens(index) {
                            extracted.tokens.insert((side, index), found);
                        }
                    }
                    extracted.document.add_page(page);
                }
                Err(err) => {
                    let reason = match err {
                        Error::Extraction { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    log::warn!(
                        "{}; substituting a blank page",
                        Error::extraction(side, index, reason.as_str())
                    );
                    extracted.failures.push(PageFailure {
                        side,
                        page: index,
                        reason,
                    });
                    extracted
                        .document
                        .add_page(Page::blank(index, width, height));
                }
            }
        }

        log::debug!(
            "Extracted {} {} pages ({} substituted)",
            total,
            side,
            extracted.failures.len()
        );
        Ok(extracted)
    }

    /// Run the detector on real pages that have no tokens yet.
    ///
    /// Detector failures leave the page without tokens; its changed words
    /// then surface as projection gaps.
    fn detect_tokens(&self, doc: &Document, tokens: &mut PageTokens) {
        let Some(detector) = &self.detector else {
            return;
        };
        let pending: Vec<&Page> = doc
            .pages
            .iter()
            .filter(|p| !p.synthetic && !tokens.contains_key(&(doc.side, p.index)))
            .collect();

        let detect = |page: &&Page| -> (usize, Vec<DetectedToken>) {
            match detector.detect(&page.bitmap) {
                Ok(found) => (page.index, found),
                Err(e) => {
                    log::warn!(
                        "Token detection failed for {} page {}: {}",
                        doc.side,
                        page.index,
                        e
                    );
                    (page.index, Vec::new())
                }
            }
        };
        let found: Vec<(usize, Vec<DetectedToken>)> = if self.options.parallel {
            pending.par_iter().map(detect).collect()
        } else {
            pending.iter().map(detect).collect()
        };

        tokens.extend(
            found
                .into_iter()
                .map(|(index, page_tokens)| ((doc.side, index), page_tokens)),
        );
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(CompareOptions::default())
    }
}
