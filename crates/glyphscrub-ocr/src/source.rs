//! Token source trait for pluggable recognition engines.
//!
//! The [`TokenSource`] trait is the seam between the redaction engine and
//! whatever produces positioned words. [`crate::Tesseract`] is the default
//! implementation; [`PrecomputedTokens`] replays a token stream recorded
//! earlier.

use glyphscrub_core::Token;
use image::RgbImage;

use crate::error::OcrError;

/// A producer of positioned words for an image.
///
/// Implementations return tokens in reading order with boxes in the pixel
/// coordinates of the image passed in. Empty-text tokens may be used as
/// separators between lines or blocks; the matcher never joins a span
/// across one.
pub trait TokenSource {
    /// Recognize the words in `image`.
    ///
    /// An empty vector means nothing was recognized.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Unavailable`] if the underlying engine cannot be
    /// started, or another [`OcrError`] if recognition failed outright.
    fn tokens(&self, image: &RgbImage) -> Result<Vec<Token>, OcrError>;

    /// Whether the engine can run in the current environment.
    ///
    /// Checked once before any image is examined. The default is `true`.
    fn is_available(&self) -> bool {
        true
    }
}

impl<S: TokenSource + ?Sized> TokenSource for &S {
    fn tokens(&self, image: &RgbImage) -> Result<Vec<Token>, OcrError> {
        (**self).tokens(image)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn tokens(&self, image: &RgbImage) -> Result<Vec<Token>, OcrError> {
        (**self).tokens(image)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// A fixed token stream returned for every image.
///
/// Used to replay saved TSV output and to drive the engine without an
/// installed recognizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecomputedTokens {
    tokens: Vec<Token>,
}

impl PrecomputedTokens {
    /// Wrap a token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Parse a token stream from Tesseract TSV output.
    ///
    /// # Errors
    ///
    /// Returns [`OcrError::Tsv`] if the input is malformed.
    pub fn from_tsv(input: &str) -> Result<Self, OcrError> {
        crate::tsv::parse_tsv(input).map(Self::new)
    }

    /// The wrapped tokens.
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl TokenSource for PrecomputedTokens {
    fn tokens(&self, _image: &RgbImage) -> Result<Vec<Token>, OcrError> {
        Ok(self.tokens.clone())
    }
}
