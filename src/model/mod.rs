//! Document model types for paginated comparison input and output.
//!
//! Documents, pages and text blocks are produced once per comparison run by
//! the page sources and consumed read-only by the diff engine. Annotation
//! regions are the engine's output and are discarded after rendering.

mod block;
mod document;
mod page;
mod region;

pub use block::{BBox, BlockRef, TextBlock};
pub use document::{Document, Side};
pub use page::{Bitmap, Page};
pub use region::{AnnotationRegion, Classification, Granularity, PixelRect};
