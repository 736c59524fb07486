//! Comparison options and run controls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::align::ChangeSummary;
use crate::error::{Error, Result, Stage};
use crate::model::Side;
use crate::pair::FALLBACK_PAGE_SIZE;
use crate::project::{FuzzyOptions, GeometryMode, BASELINE_DPI};
use crate::render::RenderStyle;

/// Default output resolution.
pub const DEFAULT_DPI: f32 = 150.0;

/// Shared flag for stopping a run between pages.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] if cancellation was requested.
    pub fn check(&self, stage: Stage) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

/// Progress event emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// A pipeline stage began
    Stage(Stage),
    /// Page counts of both inputs, sent once extraction begins
    PageCounts { original: usize, modified: usize },
    /// One page was rasterized and read
    PageExtracted { side: Side, page: usize, total: usize },
    /// One page was annotated
    PageRendered { side: Side, page: usize, total: usize },
    /// The run completed
    Finished(ChangeSummary),
}

/// Options for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Output bitmap resolution
    pub dpi: f32,

    /// Resolution of block coordinates (72 for points)
    pub baseline_dpi: f32,

    /// Extract and render pages on the rayon pool
    pub parallel: bool,

    /// Source of word geometry
    pub geometry: GeometryMode,

    /// Blank page size when neither document has a real page
    pub blank_page_size: (u32, u32),

    /// Overlay colors and strokes
    pub style: RenderStyle,

    /// Checked between pages
    pub cancel: CancellationToken,

    /// Receives progress events when set
    pub progress: Option<Sender<Progress>>,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output resolution.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the resolution of block coordinates.
    pub fn with_baseline_dpi(mut self, dpi: f32) -> Self {
        self.baseline_dpi = dpi;
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryMode) -> Self {
        self.geometry = geometry;
        self
    }

    /// Place changed words by correlating them with detected tokens.
    pub fn with_fuzzy(mut self, fuzzy: FuzzyOptions) -> Self {
        self.geometry = GeometryMode::Detected(fuzzy);
        self
    }

    pub fn with_blank_page_size(mut self, width: u32, height: u32) -> Self {
        self.blank_page_size = (width, height);
        self
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// Share a cancellation token with the caller.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Send progress events to `sender`.
    pub fn with_progress(mut self, sender: Sender<Progress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Check that resolutions and sizes are usable.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("dpi", self.dpi), ("baseline dpi", self.baseline_dpi)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidOptions(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.blank_page_size.0 == 0 || self.blank_page_size.1 == 0 {
            return Err(Error::InvalidOptions("blank page size must be non-zero".into()));
        }
        Ok(())
    }

    pub(crate) fn emit(&self, event: Progress) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is listening.
            let _ = sender.send(event);
        }
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            baseline_dpi: BASELINE_DPI,
            parallel: true,
            geometry: GeometryMode::Interpolated,
            blank_page_size: FALLBACK_PAGE_SIZE,
            style: RenderStyle::default(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompareOptions::default();
        assert_eq!(options.dpi, 150.0);
        assert_eq!(options.baseline_dpi, 72.0);
        assert!(options.parallel);
        assert_eq!(options.geometry, GeometryMode::Interpolated);
        assert_eq!(options.blank_page_size, (800, 1000));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = CompareOptions::new()
            .with_dpi(300.0)
            .sequential()
            .with_fuzzy(FuzzyOptions::new().with_min_confidence(80.0));
        assert_eq!(options.dpi, 300.0);
        assert!(!options.parallel);
        match options.geometry {
            GeometryMode::Detected(fuzzy) => assert_eq!(fuzzy.min_confidence, 80.0),
            GeometryMode::Interpolated => panic!("expected detected geometry"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CompareOptions::new().with_dpi(0.0).validate().is_err());
        assert!(CompareOptions::new()
            .with_baseline_dpi(f32::NAN)
            .validate()
            .is_err());
        assert!(CompareOptions::new()
            .with_blank_page_size(0, 10)
            .validate()
            .is_err());
    }

    #[test]
    fn test_cancellation_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check(Stage::Extract).is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check(Stage::Align),
            Err(Error::Cancelled { stage: Stage::Align })
        ));
    }

    #[test]
    fn test_progress_events_sent() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let options = CompareOptions::new().with_progress(tx);
        options.emit(Progress::Stage(Stage::Extract));
        assert_eq!(rx.try_recv().unwrap(), Progress::Stage(Stage::Extract));
    }
}
