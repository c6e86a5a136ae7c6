//! glyphscrub-core: Image-independent data types and matching algorithms.
//!
//! This crate provides the foundational types (PixelBox, Token, NameMap,
//! TermSet, MatchedSpan) and algorithms (fuzzy word matching, span
//! resolution) used by glyphscrub. It has no image or OCR dependencies.

pub mod error;
pub mod fuzzy;
pub mod geometry;
pub mod spans;
pub mod terms;
pub mod token;

pub use error::{RedactWarning, RedactWarningCode, ScrubError};
pub use geometry::PixelBox;
pub use spans::{MatchedSpan, resolve};
pub use terms::{
    CaseShape, CaseVariant, NameEntry, NameMap, Term, TermKind, TermSet, normalize_term,
    parse_extra_redact, title_case,
};
pub use token::{Token, union_bbox};
