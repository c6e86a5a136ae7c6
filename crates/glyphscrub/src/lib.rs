//! glyphscrub: Find names in raster images and paint them over.
//!
//! This is the public API facade crate for glyphscrub. It re-exports types
//! from glyphscrub-core and glyphscrub-ocr, and adds the compositor, font
//! resolution, and the redaction engine that ties them together.
//!
//! # Architecture
//!
//! - **glyphscrub-core**: Image-independent data types and matching algorithms
//! - **glyphscrub-ocr**: Token sources (Tesseract CLI, TSV replay)
//! - **glyphscrub** (this crate): Compositing and the redaction engine
//!
//! # Example
//!
//! ```no_run
//! use glyphscrub::{NameMap, RedactOptions, Redactor};
//!
//! let image = image::open("scan.png").unwrap();
//! let names = NameMap::parse("Alan Williams=Bob Williams");
//! let redactor = Redactor::tesseract(RedactOptions::default());
//! let result = redactor.redact(&image, &names, &["R003134"]).unwrap();
//! println!("{} redactions", result.count);
//! ```

pub mod compositor;
pub mod engine;
pub mod font;

pub use compositor::{Compositor, SAMPLE_MARGIN, font_size, sample_background, text_color};
pub use engine::{RedactOptions, Redaction, Redactor};
pub use font::{FONT_CANDIDATES, GlyphFont};

pub use glyphscrub_core;
pub use glyphscrub_core::{
    CaseShape, CaseVariant, MatchedSpan, NameEntry, NameMap, PixelBox, RedactWarning,
    RedactWarningCode, ScrubError, Term, TermKind, TermSet, Token, normalize_term,
    parse_extra_redact, resolve,
};
pub use glyphscrub_ocr;
pub use glyphscrub_ocr::{
    MAX_SCALE, OcrError, PrecomputedTokens, Tesseract, TesseractConfig, TokenSource, parse_tsv,
    write_tsv,
};
