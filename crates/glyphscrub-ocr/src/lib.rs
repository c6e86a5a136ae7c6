//! glyphscrub-ocr: Token sources for the redaction engine.
//!
//! This crate implements the recognition boundary of glyphscrub: the
//! [`TokenSource`] trait, a Tesseract CLI backend, a parser for Tesseract's
//! TSV output, and a precomputed source for replaying saved output.
//! It depends on glyphscrub-core for shared data types.

pub mod error;
pub mod source;
pub mod tesseract;
pub mod tsv;

pub use error::OcrError;
pub use glyphscrub_core;
pub use source::{PrecomputedTokens, TokenSource};
pub use tesseract::{
    DEFAULT_SCALE, MAX_SCALE, MAX_UPSCALED_PIXELS, Tesseract, TesseractConfig, best_run,
    substantive_count,
};
pub use tsv::{parse_tsv, write_tsv};
