//! Recognized word tokens as emitted by a token source.

use crate::geometry::PixelBox;

/// One recognized word with its confidence and pixel-space bounding box.
///
/// Tokens are indexed by their position in the emission order; adjacency in
/// that order is taken to reflect visual reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// Recognized text (may be empty for structural separator rows).
    pub text: String,
    /// Recognition confidence. Negative values mark unreliable output.
    pub confidence: i32,
    /// Bounding box in image pixel space.
    pub bbox: PixelBox,
}

impl Token {
    pub fn new(text: impl Into<String>, confidence: i32, bbox: PixelBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }

    /// Text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Whether the token may take part in a confidence-gated match.
    pub fn is_reliable(&self) -> bool {
        self.confidence >= 0
    }

    /// Whether the token carries text the engine reported with positive confidence.
    ///
    /// Used to rank competing recognition runs.
    pub fn is_substantive(&self) -> bool {
        !self.trimmed().is_empty() && self.confidence > 0
    }

    /// Map the token from an upscaled recognition pass back to source space.
    pub fn downscaled(mut self, factor: f64) -> Self {
        self.bbox = self.bbox.downscale(factor);
        self
    }
}

/// Union bounding box of `tokens[start..=end]`.
///
/// Returns `None` when the range is empty or out of bounds.
pub fn union_bbox(tokens: &[Token], start: usize, end: usize) -> Option<PixelBox> {
    let run = tokens.get(start..=end)?;
    let (first, rest) = run.split_first()?;
    Some(rest.iter().fold(first.bbox, |acc, t| acc.union(&t.bbox)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, conf: i32, x: u32) -> Token {
        Token::new(text, conf, PixelBox::new(x, 10, 20, 12))
    }

    #[test]
    fn reliability_threshold_is_zero() {
        assert!(tok("a", 0, 0).is_reliable());
        assert!(!tok("a", -1, 0).is_reliable());
    }

    #[test]
    fn substantive_needs_text_and_positive_confidence() {
        assert!(tok("word", 90, 0).is_substantive());
        assert!(!tok("   ", 90, 0).is_substantive());
        assert!(!tok("word", 0, 0).is_substantive());
    }

    #[test]
    fn union_bbox_spans_run() {
        let tokens = vec![tok("a", 90, 0), tok("b", 90, 30), tok("c", 90, 60)];
        let b = union_bbox(&tokens, 0, 1).unwrap();
        assert_eq!(b, PixelBox::from_edges(0, 10, 50, 22));
    }

    #[test]
    fn union_bbox_out_of_range() {
        let tokens = vec![tok("a", 90, 0)];
        assert!(union_bbox(&tokens, 0, 3).is_none());
        assert!(union_bbox(&tokens, 1, 0).is_none());
    }

    #[test]
    fn downscaled_keeps_text() {
        let t = Token::new("Bob", 80, PixelBox::new(20, 40, 60, 24)).downscaled(2.0);
        assert_eq!(t.text, "Bob");
        assert_eq!(t.bbox, PixelBox::new(10, 20, 30, 12));
    }
}
