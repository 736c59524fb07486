//! Error types for pagediff library.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::model::Side;

/// Result type alias for pagediff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Normalize,
    Align,
    Pair,
    Project,
    Render,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Normalize => "normalize",
            Stage::Align => "align",
            Stage::Pair => "pair",
            Stage::Project => "project",
            Stage::Render => "render",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Error types that can occur during a comparison run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding or encoding a page bitmap.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error reading or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A collaborator could not produce blocks or a bitmap for one page.
    #[error("Extraction failed for {side} page {page}: {reason}")]
    Extraction {
        /// Document side
        side: Side,
        /// 0-indexed page
        page: usize,
        /// Collaborator message
        reason: String,
    },

    /// Extraction failed for every page of a document.
    #[error("Extraction failed for every page of the {side} document")]
    AllPagesFailed {
        /// Document side
        side: Side,
    },

    /// An input document is missing.
    #[error("Missing {side} document")]
    MissingDocument {
        /// Document side
        side: Side,
    },

    /// Alignment produced an inconsistent result.
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// The run was cancelled between page-level units of work.
    #[error("Comparison cancelled during {stage} stage")]
    Cancelled {
        /// Stage that observed the cancellation
        stage: Stage,
    },

    /// No loader is registered for the input format.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// A page manifest is malformed.
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// Error while compositing annotations.
    #[error("Rendering error on {side} page {page}: {reason}")]
    Render {
        /// Document side
        side: Side,
        /// 0-indexed page
        page: usize,
        /// Failure description
        reason: String,
    },

    /// Comparison options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an extraction error for a page.
    pub fn extraction(side: Side, page: usize, reason: impl Into<String>) -> Self {
        Error::Extraction {
            side,
            page,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::AllPagesFailed {
            side: Side::Modified,
        };
        assert_eq!(
            err.to_string(),
            "Extraction failed for every page of the modified document"
        );

        let err = Error::extraction(Side::Original, 3, "rasterizer crashed");
        assert_eq!(
            err.to_string(),
            "Extraction failed for original page 3: rasterizer crashed"
        );

        let err = Error::Cancelled {
            stage: Stage::Render,
        };
        assert_eq!(err.to_string(), "Comparison cancelled during render stage");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
