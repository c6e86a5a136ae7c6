//! Font resolution and text drawing for replacement labels.
//!
//! A [`GlyphFont`] is either a TrueType face loaded from the first readable
//! system font in [`FONT_CANDIDATES`], or a built-in 5×7 bitmap face used
//! when no system font is available.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use glyphscrub_core::ScrubError;
use image::{Rgb, RgbImage};

/// System font paths tried in order.
pub const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNSText.ttf",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

const CELL_WIDTH: u32 = 6;
const CELL_HEIGHT: u32 = 8;
const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: u32 = 5;

/// A face used to render replacement text.
pub enum GlyphFont {
    /// A TrueType or OpenType face, alpha-blended through `imageproc`.
    TrueType {
        /// Parsed face.
        font: FontVec,
        /// File the face was read from.
        path: PathBuf,
    },
    /// Built-in uppercase 5×7 bitmap face.
    Builtin,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlyphFont::TrueType { path, .. } => {
                f.debug_struct("TrueType").field("path", path).finish()
            }
            GlyphFont::Builtin => f.write_str("Builtin"),
        }
    }
}

impl GlyphFont {
    /// The built-in bitmap face.
    pub fn builtin() -> Self {
        GlyphFont::Builtin
    }

    /// Load a face from a font file. Collections use their first face.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::IoError`] if the file cannot be read, or
    /// [`ScrubError::ConfigError`] if it is not a usable font.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScrubError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ScrubError::IoError(format!("{}: {e}", path.display())))?;
        let font = FontVec::try_from_vec_and_index(data, 0).map_err(|e| {
            ScrubError::ConfigError(format!("{}: not a usable font: {e}", path.display()))
        })?;
        Ok(GlyphFont::TrueType {
            font,
            path: path.to_path_buf(),
        })
    }

    /// The first loadable face among [`FONT_CANDIDATES`].
    pub fn system() -> Option<Self> {
        FONT_CANDIDATES.iter().find_map(|p| Self::from_path(p).ok())
    }

    /// The first loadable system face, or the built-in face.
    pub fn system_or_builtin() -> Self {
        match Self::system() {
            Some(font) => {
                tracing::debug!(font = ?font, "loaded system font");
                font
            }
            None => {
                tracing::warn!("no system font found, using built-in bitmap font");
                GlyphFont::Builtin
            }
        }
    }

    /// Whether this is the built-in bitmap face.
    pub fn is_builtin(&self) -> bool {
        matches!(self, GlyphFont::Builtin)
    }

    /// Human-readable name for logs and reports.
    pub fn name(&self) -> String {
        match self {
            GlyphFont::TrueType { path, .. } => path.display().to_string(),
            GlyphFont::Builtin => "built-in 5x7".to_string(),
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    ///
    /// `size` is the nominal pixel height. Pixels falling outside the image
    /// are dropped.
    pub fn draw(
        &self,
        image: &mut RgbImage,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Rgb<u8>,
    ) {
        match self {
            GlyphFont::TrueType { font, .. } => {
                let scale = PxScale::from(size);
                imageproc::drawing::draw_text_mut(image, color, x, y, scale, font, text);
            }
            GlyphFont::Builtin => draw_bitmap_text(image, text, x, y, bitmap_scale(size), color),
        }
    }
}

/// Integer magnification for the bitmap face at a nominal pixel height.
pub fn bitmap_scale(size: f32) -> u32 {
    let scale = (size / CELL_HEIGHT as f32).round();
    if scale.is_finite() && scale >= 1.0 {
        scale as u32
    } else {
        1
    }
}

/// Width in pixels of `text` in the bitmap face at `scale`.
pub fn bitmap_text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * CELL_WIDTH * scale
}

fn draw_bitmap_text(
    image: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    scale: u32,
    color: Rgb<u8>,
) {
    let (w, h) = image.dimensions();
    let step = (CELL_WIDTH * scale) as i64;
    let scale = i64::from(scale);

    for (i, ch) in text.chars().enumerate() {
        let origin_x = i64::from(x) + i as i64 * step;
        let rows = glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                    continue;
                }
                let px0 = origin_x + i64::from(col) * scale;
                let py0 = i64::from(y) + row as i64 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (px, py) = (px0 + dx, py0 + dy);
                        if px >= 0 && py >= 0 && px < i64::from(w) && py < i64::from(h) {
                            image.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Row bitmaps for one character. Bit 4 is the leftmost column.
/// Lowercase letters render as uppercase; unknown characters render as `?`.
fn glyph(ch: char) -> [u8; GLYPH_ROWS] {
    match ch.to_ascii_uppercase() {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '@' => [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}
