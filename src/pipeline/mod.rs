//! End-to-end comparison runs.
//!
//! A run moves through fixed stages: extract, normalize, align, pair,
//! project, render, assemble. Stages run one after another; page-level work
//! inside extract and render may run on the rayon pool. Any stage error ends
//! the run. Per-page extraction failures do not: the page is replaced by a
//! blank page and recorded in [`Diagnostics`].
//!
//! # Example
//!
//! ```no_run
//! use pagediff::pipeline::{Comparator, CompareOptions};
//! use pagediff::source::LoaderRegistry;
//! use std::path::Path;
//!
//! fn main() -> pagediff::Result<()> {
//!     let comparator = Comparator::new(CompareOptions::new().with_dpi(200.0));
//!     let result = comparator.compare_files(
//!         &LoaderRegistry::with_defaults(),
//!         Path::new("v1/manifest.json"),
//!         Path::new("v2/manifest.json"),
//!     )?;
//!     result.save("out")?;
//!     Ok(())
//! }
//! ```

mod comparator;
mod options;
mod result;

pub use comparator::Comparator;
pub use options::{CancellationToken, CompareOptions, Progress, DEFAULT_DPI};
pub use result::{ComparisonResult, Diagnostics, PageFailure};
