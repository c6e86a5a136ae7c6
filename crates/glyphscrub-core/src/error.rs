//! Error and warning types for glyphscrub.
//!
//! Provides [`ScrubError`] for fatal errors that stop processing of an image,
//! and [`RedactWarning`] for non-fatal issues that still let a redaction
//! return a best-effort result.

use std::fmt;

/// Fatal error types for image redaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrubError {
    /// I/O error reading or writing image data.
    IoError(String),
    /// Image decoding, encoding, or conversion failed.
    ImageError(String),
    /// The token source failed while recognizing text.
    OcrError(String),
    /// The backing recognition engine is not installed or cannot be started.
    EngineUnavailable(String),
    /// Invalid configuration (name map, options).
    ConfigError(String),
}

impl fmt::Display for ScrubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrubError::IoError(msg) => write!(f, "I/O error: {msg}"),
            ScrubError::ImageError(msg) => write!(f, "image error: {msg}"),
            ScrubError::OcrError(msg) => write!(f, "OCR error: {msg}"),
            ScrubError::EngineUnavailable(msg) => write!(f, "OCR engine unavailable: {msg}"),
            ScrubError::ConfigError(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ScrubError {}

impl From<std::io::Error> for ScrubError {
    fn from(err: std::io::Error) -> Self {
        ScrubError::IoError(err.to_string())
    }
}

/// Machine-readable warning code for categorizing redaction issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum RedactWarningCode {
    /// The recognition engine could not be run; the image was left untouched.
    EngineUnavailable,
    /// No system font was found; replacement labels used the built-in bitmap font.
    FontFallback,
    /// The image was below the configured minimum size and was not processed.
    SkippedSmallImage,
}

impl RedactWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            RedactWarningCode::EngineUnavailable => "ENGINE_UNAVAILABLE",
            RedactWarningCode::FontFallback => "FONT_FALLBACK",
            RedactWarningCode::SkippedSmallImage => "SKIPPED_SMALL_IMAGE",
        }
    }
}

impl fmt::Display for RedactWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal warning produced while redacting one image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RedactWarning {
    /// Machine-readable warning code.
    pub code: RedactWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
}

impl RedactWarning {
    /// Create a warning with a specific code and description.
    pub fn with_code(code: RedactWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// Whether the warning means the image was not examined at all.
    pub fn is_blocking(&self) -> bool {
        matches!(self.code, RedactWarningCode::EngineUnavailable)
    }
}

impl fmt::Display for RedactWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)
    }
}
