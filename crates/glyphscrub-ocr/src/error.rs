//! Error types for the token source layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`OcrError`]
//! that wraps backend-specific failures and converts them to [`ScrubError`].

use glyphscrub_core::ScrubError;
use thiserror::Error;

/// Error type for token source operations.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The recognition engine is not installed or could not be started.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// Error writing the intermediate image or reading engine output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error preparing the image for recognition.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The upscaled copy handed to the engine would exceed the pixel budget.
    #[error("upscaled image too large: {width}x{height} pixels")]
    TooLarge { width: u64, height: u64 },

    /// Engine output could not be parsed.
    #[error("malformed TSV at line {line}: {reason}")]
    Tsv { line: usize, reason: String },

    /// The engine ran but reported failure.
    #[error("OCR engine failed: {0}")]
    Failed(String),
}

impl OcrError {
    /// Whether the error means the engine itself is missing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, OcrError::Unavailable(_))
    }
}

impl From<OcrError> for ScrubError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Unavailable(msg) => ScrubError::EngineUnavailable(msg),
            OcrError::Io(e) => ScrubError::IoError(e.to_string()),
            OcrError::Image(e) => ScrubError::ImageError(e.to_string()),
            too_large @ OcrError::TooLarge { .. } => ScrubError::ImageError(too_large.to_string()),
            other @ (OcrError::Tsv { .. } | OcrError::Failed(_)) => {
                ScrubError::OcrError(other.to_string())
            }
        }
    }
}
