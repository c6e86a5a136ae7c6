//! Tesseract command-line backend.
//!
//! Runs the `tesseract` binary as a subprocess on an upscaled copy of the
//! image, once per configured page segmentation mode, and keeps the run that
//! recognized the most substantive words.

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::Command;

use glyphscrub_core::Token;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};

use crate::error::OcrError;
use crate::source::TokenSource;
use crate::tsv::parse_tsv;

/// Default OCR upscale factor.
pub const DEFAULT_SCALE: f64 = 2.0;

/// Largest accepted upscale factor.
pub const MAX_SCALE: f64 = 8.0;

/// Largest upscaled copy, in pixels, written out for recognition.
pub const MAX_UPSCALED_PIXELS: u64 = 200_000_000;

/// Options for invoking Tesseract.
#[derive(Debug, Clone, PartialEq)]
pub struct TesseractConfig {
    /// Path or name of the `tesseract` executable.
    pub binary: String,
    /// Language passed with `-l`.
    pub language: String,
    /// Page segmentation modes tried in order. 6 assumes a uniform block of
    /// text; 11 looks for sparse text.
    pub modes: Vec<u8>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            modes: vec![6, 11],
        }
    }
}

/// A [`TokenSource`] backed by the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct Tesseract {
    config: TesseractConfig,
    scale: f64,
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new(TesseractConfig::default())
    }
}

impl Tesseract {
    /// Create a backend with the default upscale factor.
    pub fn new(config: TesseractConfig) -> Self {
        Self {
            config,
            scale: DEFAULT_SCALE,
        }
    }

    /// Set the upscale factor applied before recognition.
    ///
    /// Non-positive or non-finite factors are treated as 1.0 (no scaling);
    /// factors above [`MAX_SCALE`] are clamped to it.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale.min(MAX_SCALE)
        } else {
            1.0
        };
        self
    }

    /// The upscale factor in effect.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The invocation options.
    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    fn upscale(&self, image: &RgbImage) -> Result<Option<RgbImage>, OcrError> {
        if self.scale == 1.0 {
            return Ok(None);
        }
        let width = ((f64::from(image.width()) * self.scale) as u64).max(1);
        let height = ((f64::from(image.height()) * self.scale) as u64).max(1);
        if width.saturating_mul(height) > MAX_UPSCALED_PIXELS
            || width > u64::from(u32::MAX)
            || height > u64::from(u32::MAX)
        {
            return Err(OcrError::TooLarge { width, height });
        }
        Ok(Some(image::imageops::resize(
            image,
            width as u32,
            height as u32,
            FilterType::Lanczos3,
        )))
    }

    fn run_mode(&self, path: &Path, mode: u8) -> Result<Vec<Token>, OcrError> {
        let output = Command::new(&self.config.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(mode.to_string())
            .arg("tsv")
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Failed(format!(
                "psm {mode}: {} ({})",
                stderr.trim(),
                output.status
            )));
        }
        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }

    fn spawn_error(&self, err: std::io::Error) -> OcrError {
        if err.kind() == ErrorKind::NotFound {
            OcrError::Unavailable(format!("'{}' not found on PATH", self.config.binary))
        } else {
            OcrError::Io(err)
        }
    }
}

/// Number of tokens with non-empty trimmed text and positive confidence.
pub fn substantive_count(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| t.is_substantive()).count()
}

/// Pick the candidate with the strictly greatest substantive count.
///
/// Earlier candidates win ties. Returns `None` when no candidate has a
/// positive count.
pub fn best_run(runs: impl IntoIterator<Item = Vec<Token>>) -> Option<Vec<Token>> {
    let mut best: Option<Vec<Token>> = None;
    let mut best_count = 0;
    for run in runs {
        let count = substantive_count(&run);
        if count > best_count {
            best_count = count;
            best = Some(run);
        }
    }
    best
}

impl TokenSource for Tesseract {
    fn tokens(&self, image: &RgbImage) -> Result<Vec<Token>, OcrError> {
        let scaled = self.upscale(image)?;
        let input = scaled.as_ref().unwrap_or(image);

        let mut tmp = tempfile::Builder::new()
            .prefix("glyphscrub-")
            .suffix(".png")
            .tempfile()?;
        input.write_to(tmp.as_file_mut(), ImageFormat::Png)?;
        tmp.flush()?;

        let mut runs = Vec::with_capacity(self.config.modes.len());
        let mut last_error = None;
        for &mode in &self.config.modes {
            match self.run_mode(tmp.path(), mode) {
                Ok(tokens) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        psm = mode,
                        tokens = tokens.len(),
                        words = substantive_count(&tokens),
                        "tesseract run finished"
                    );
                    runs.push(tokens);
                }
                Err(e) if e.is_unavailable() => return Err(e),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(psm = mode, error = %e, "tesseract run failed, skipping mode");
                    last_error = Some(e);
                }
            }
        }

        if runs.is_empty() {
            return Err(match last_error {
                Some(OcrError::Failed(msg)) => {
                    OcrError::Failed(format!("all page segmentation modes failed, last: {msg}"))
                }
                Some(other) => other,
                None => OcrError::Failed("no page segmentation modes configured".to_string()),
            });
        }

        let scale = self.scale;
        Ok(best_run(runs)
            .map(|tokens| tokens.into_iter().map(|t| t.downscaled(scale)).collect())
            .unwrap_or_default())
    }

    /// Runs `tesseract --version` and checks that it exits successfully.
    fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}
