//! Redaction engine: recognition, span resolution, and compositing for one
//! image at a time.

use std::sync::OnceLock;

use glyphscrub_core::{
    MatchedSpan, NameMap, RedactWarning, RedactWarningCode, ScrubError, TermSet, resolve,
};
use glyphscrub_ocr::{DEFAULT_SCALE, Tesseract, TesseractConfig, TokenSource};
use image::{DynamicImage, RgbImage};

use crate::compositor::{Compositor, SAMPLE_MARGIN};
use crate::font::GlyphFont;

/// Options for a [`Redactor`].
#[derive(Debug, Clone, PartialEq)]
pub struct RedactOptions {
    /// Upscale factor applied before recognition. Read when building a
    /// Tesseract-backed redactor; other token sources ignore it.
    pub scale: f64,
    /// Distance between a span's box and the border sampled for its
    /// background color.
    pub margin: u32,
    /// Images whose width or height is below this are skipped. 0 never skips.
    pub min_side: u32,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            margin: SAMPLE_MARGIN,
            min_side: 0,
        }
    }
}

/// Result of redacting one image.
#[derive(Debug, Clone)]
pub struct Redaction {
    /// The 3-channel output image, same dimensions as the input.
    pub image: RgbImage,
    /// Number of spans painted over.
    pub count: usize,
    /// Resolved spans, ordered by first token index.
    pub spans: Vec<MatchedSpan>,
    /// Non-fatal issues encountered.
    pub warnings: Vec<RedactWarning>,
}

impl Redaction {
    fn untouched(image: RgbImage, warning: RedactWarning) -> Self {
        Self {
            image,
            count: 0,
            spans: Vec::new(),
            warnings: vec![warning],
        }
    }

    /// Whether any span was painted.
    pub fn is_modified(&self) -> bool {
        self.count > 0
    }

    /// Whether the image was left unexamined because the engine is missing.
    pub fn engine_unavailable(&self) -> bool {
        self.warnings.iter().any(RedactWarning::is_blocking)
    }
}

/// Finds terms in images and paints them over.
///
/// Configuration is passed to each call, so one redactor can serve many
/// images and term sets.
#[derive(Debug)]
pub struct Redactor<S> {
    source: S,
    options: RedactOptions,
    font: GlyphFont,
    available: OnceLock<bool>,
}

impl Redactor<Tesseract> {
    /// A redactor backed by the Tesseract CLI with default invocation
    /// settings and `options.scale` as the upscale factor.
    pub fn tesseract(options: RedactOptions) -> Self {
        Self::tesseract_with_config(TesseractConfig::default(), options)
    }

    /// A redactor backed by the Tesseract CLI with explicit settings.
    pub fn tesseract_with_config(config: TesseractConfig, options: RedactOptions) -> Self {
        let source = Tesseract::new(config).with_scale(options.scale);
        Redactor::new(source).with_options(options)
    }
}

impl<S: TokenSource> Redactor<S> {
    /// Create a redactor over `source` with default options and the first
    /// available system font.
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: RedactOptions::default(),
            font: GlyphFont::system_or_builtin(),
            available: OnceLock::new(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: RedactOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the font used for replacement labels.
    pub fn with_font(mut self, font: GlyphFont) -> Self {
        self.font = font;
        self
    }

    /// The token source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The options in effect.
    pub fn options(&self) -> &RedactOptions {
        &self.options
    }

    /// The font used for replacement labels.
    pub fn font(&self) -> &GlyphFont {
        &self.font
    }

    /// Whether the token source can run. Checked once and cached.
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.source.is_available())
    }

    /// Redact the terms of `name_map` and `extra_redact` from `image`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScrubError`] if recognition fails for a reason other than
    /// the engine being unavailable.
    pub fn redact<E: AsRef<str>>(
        &self,
        image: &DynamicImage,
        name_map: &NameMap,
        extra_redact: &[E],
    ) -> Result<Redaction, ScrubError> {
        let terms = TermSet::new(name_map, extra_redact);
        self.redact_with_terms(image, &terms)
    }

    /// Redact a prepared term set from `image`.
    ///
    /// The image is converted to 3-channel RGB first. When the token source
    /// is unavailable, the converted image is returned unchanged with a
    /// count of 0 and an [`RedactWarningCode::EngineUnavailable`] warning.
    ///
    /// # Errors
    ///
    /// Returns a [`ScrubError`] if recognition fails for a reason other than
    /// the engine being unavailable.
    pub fn redact_with_terms(
        &self,
        image: &DynamicImage,
        terms: &TermSet,
    ) -> Result<Redaction, ScrubError> {
        let mut rgb = image.to_rgb8();

        if !self.is_available() {
            return Ok(unavailable(rgb, "token source reported unavailable"));
        }

        let (w, h) = rgb.dimensions();
        let min_side = self.options.min_side;
        if min_side > 0 && (w < min_side || h < min_side) {
            tracing::warn!(width = w, height = h, min_side, "image below minimum size, skipped");
            return Ok(Redaction::untouched(
                rgb,
                RedactWarning::with_code(
                    RedactWarningCode::SkippedSmallImage,
                    format!("{w}x{h} is below the minimum side of {min_side}px"),
                ),
            ));
        }

        let tokens = match self.source.tokens(&rgb) {
            Ok(tokens) => tokens,
            Err(e) if e.is_unavailable() => return Ok(unavailable(rgb, &e.to_string())),
            Err(e) => return Err(e.into()),
        };

        let spans = resolve(&tokens, terms);
        let compositor = Compositor::new(&self.font).with_margin(self.options.margin);
        let count: usize = spans
            .iter()
            .map(|span| compositor.apply(&mut rgb, span, &tokens))
            .sum();

        let mut warnings = Vec::new();
        if self.font.is_builtin() && spans.iter().any(|s| !s.replacement.is_empty()) {
            tracing::warn!("replacement labels drawn with built-in bitmap font");
            warnings.push(RedactWarning::with_code(
                RedactWarningCode::FontFallback,
                "no system font found; replacement labels use the built-in bitmap font",
            ));
        }

        tracing::info!(
            width = w,
            height = h,
            tokens = tokens.len(),
            redactions = count,
            "image processed"
        );

        Ok(Redaction {
            image: rgb,
            count,
            spans,
            warnings,
        })
    }

    /// Redact each image in order.
    pub fn redact_batch(
        &self,
        images: &[DynamicImage],
        terms: &TermSet,
    ) -> Vec<Result<Redaction, ScrubError>> {
        images
            .iter()
            .map(|img| self.redact_with_terms(img, terms))
            .collect()
    }

    /// Redact images in parallel. Results are in input order.
    #[cfg(feature = "parallel")]
    pub fn redact_batch_parallel(
        &self,
        images: &[DynamicImage],
        terms: &TermSet,
    ) -> Vec<Result<Redaction, ScrubError>>
    where
        S: Sync,
    {
        use rayon::prelude::*;

        // Check before fanning out so workers share one answer.
        self.is_available();
        images
            .par_iter()
            .map(|img| self.redact_with_terms(img, terms))
            .collect()
    }
}

fn unavailable(image: RgbImage, detail: &str) -> Redaction {
    tracing::error!(detail, "OCR engine unavailable, image left unchanged");
    Redaction::untouched(
        image,
        RedactWarning::with_code(RedactWarningCode::EngineUnavailable, detail),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphscrub_core::{PixelBox, Token};
    use glyphscrub_ocr::{OcrError, PrecomputedTokens};
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    struct Offline;

    impl TokenSource for Offline {
        fn tokens(&self, _image: &RgbImage) -> Result<Vec<Token>, OcrError> {
            Err(OcrError::Unavailable("not installed".to_string()))
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    struct Broken;

    impl TokenSource for Broken {
        fn tokens(&self, _image: &RgbImage) -> Result<Vec<Token>, OcrError> {
            Err(OcrError::Failed("exit status 1".to_string()))
        }
    }

    fn white(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, WHITE))
    }

    fn redactor(tokens: Vec<Token>) -> Redactor<PrecomputedTokens> {
        Redactor::new(PrecomputedTokens::new(tokens)).with_font(GlyphFont::builtin())
    }

    #[test]
    fn default_options() {
        let o = RedactOptions::default();
        assert_eq!(o.scale, 2.0);
        assert_eq!(o.margin, 4);
        assert_eq!(o.min_side, 0);
    }

    #[test]
    fn tesseract_redactor_carries_scale() {
        let r = Redactor::tesseract(RedactOptions {
            scale: 3.0,
            ..RedactOptions::default()
        });
        assert_eq!(r.source().scale(), 3.0);
        assert_eq!(r.options().scale, 3.0);
    }

    #[test]
    fn unavailable_source_returns_input() {
        let r = Redactor::new(Offline).with_font(GlyphFont::builtin());
        let map = NameMap::parse("Alan=Bob");
        let out = r.redact(&white(20, 10), &map, &[] as &[&str]).unwrap();
        assert_eq!(out.count, 0);
        assert!(out.engine_unavailable());
        assert_eq!(out.warnings[0].code, RedactWarningCode::EngineUnavailable);
        assert_eq!(out.image, white(20, 10).to_rgb8());
    }

    #[test]
    fn recognition_failure_is_error() {
        let r = Redactor::new(Broken).with_font(GlyphFont::builtin());
        let err = r
            .redact(&white(20, 10), &NameMap::parse("Alan=Bob"), &[] as &[&str])
            .unwrap_err();
        assert!(matches!(err, ScrubError::OcrError(_)));
    }

    #[test]
    fn small_images_skipped() {
        let tokens = vec![Token::new("Alan", 90, PixelBox::new(1, 1, 10, 5))];
        let r = redactor(tokens).with_options(RedactOptions {
            min_side: 32,
            ..RedactOptions::default()
        });
        let out = r
            .redact(&white(100, 20), &NameMap::parse("Alan=Bob"), &[] as &[&str])
            .unwrap();
        assert_eq!(out.count, 0);
        assert_eq!(out.warnings[0].code, RedactWarningCode::SkippedSmallImage);
        assert!(!out.engine_unavailable());
    }

    #[test]
    fn rgba_input_normalized() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            8,
            8,
            image::Rgba([255, 255, 255, 255]),
        ));
        let out = redactor(Vec::new())
            .redact(&rgba, &NameMap::new(), &[] as &[&str])
            .unwrap();
        assert_eq!(out.image.dimensions(), (8, 8));
        assert_eq!(out.count, 0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn builtin_font_warns_only_when_labels_drawn() {
        let tokens = vec![
            Token::new("Alan", 90, PixelBox::new(10, 10, 40, 16)),
            Token::new("R003134", 90, PixelBox::new(60, 10, 40, 16)),
        ];
        let r = redactor(tokens);

        let out = r
            .redact(&white(120, 40), &NameMap::new(), &["R003134"])
            .unwrap();
        assert_eq!(out.count, 1);
        assert!(out.warnings.is_empty());

        let out = r
            .redact(&white(120, 40), &NameMap::parse("Alan=Bob"), &["R003134"])
            .unwrap();
        assert_eq!(out.count, 2);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, RedactWarningCode::FontFallback);
    }

    #[test]
    fn batch_preserves_order() {
        let tokens = vec![Token::new("Alan", 90, PixelBox::new(2, 2, 10, 6))];
        let r = redactor(tokens);
        let terms = TermSet::new(&NameMap::parse("Alan="), &[] as &[&str]);
        let out = r.redact_batch(&[white(30, 20), white(5, 5)], &terms);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap().image.dimensions(), (30, 20));
        assert_eq!(out[1].as_ref().unwrap().image.dimensions(), (5, 5));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_batch_matches_sequential() {
        let tokens = vec![Token::new("Alan", 90, PixelBox::new(2, 2, 10, 6))];
        let r = redactor(tokens);
        let terms = TermSet::new(&NameMap::parse("Alan=Bob"), &[] as &[&str]);
        let images: Vec<_> = (1..6).map(|i| white(20 + i, 20)).collect();
        let seq = r.redact_batch(&images, &terms);
        let par = r.redact_batch_parallel(&images, &terms);
        for (a, b) in seq.iter().zip(&par) {
            let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
            assert_eq!(a.image, b.image);
            assert_eq!(a.count, b.count);
        }
    }
}
