//! Painting over matched spans.
//!
//! For each span the compositor infers a background color from a border
//! around the span's box, fills the box with it, and, when the span has a
//! replacement, draws the replacement in a contrasting color.

use std::collections::HashMap;

use glyphscrub_core::{MatchedSpan, PixelBox, Token};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::font::GlyphFont;

/// Default distance in pixels between a span's box and the sampled border.
pub const SAMPLE_MARGIN: u32 = 4;

/// Smallest font size used for replacement text.
pub const MIN_FONT_SIZE: u32 = 10;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Infer the background color around `bbox`.
///
/// Samples the rows `margin` pixels above and below the box across its
/// width plus margins, then the columns `margin` pixels left and right
/// across its height plus margins, each clamped to the image. The most
/// frequent color wins; ties go to the color seen first in that order.
/// Returns white when nothing could be sampled.
pub fn sample_background(image: &RgbImage, bbox: PixelBox, margin: u32) -> Rgb<u8> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return WHITE;
    }

    let left = bbox.x.saturating_sub(margin);
    let top = bbox.y.saturating_sub(margin);
    let right = bbox.right().saturating_add(margin);
    let bottom = bbox.bottom().saturating_add(margin);

    let mut samples = Vec::new();
    for x in left..right.min(w) {
        samples.push(image.get_pixel_checked(x, top));
        samples.push(image.get_pixel_checked(x, bottom.min(h - 1)));
    }
    for y in top..bottom.min(h) {
        samples.push(image.get_pixel_checked(left, y));
        samples.push(image.get_pixel_checked(right.min(w - 1), y));
    }

    most_common(samples.into_iter().flatten().copied()).unwrap_or(WHITE)
}

/// Most frequent item, ties broken by first occurrence.
fn most_common(items: impl Iterator<Item = Rgb<u8>>) -> Option<Rgb<u8>> {
    let mut counts: HashMap<[u8; 3], (usize, usize)> = HashMap::new();
    for (i, px) in items.enumerate() {
        counts.entry(px.0).or_insert((0, i)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(rgb, _)| Rgb(rgb))
}

/// Black on light backgrounds, white on dark ones.
pub fn text_color(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0;
    let brightness = (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
    if brightness > 128 { BLACK } else { WHITE }
}

/// Replacement font size for a box of the given height.
pub fn font_size(box_height: u32) -> u32 {
    box_height.saturating_sub(4).max(MIN_FONT_SIZE)
}

/// Paints spans onto an image.
#[derive(Debug)]
pub struct Compositor<'a> {
    font: &'a GlyphFont,
    margin: u32,
}

impl<'a> Compositor<'a> {
    /// Create a compositor drawing replacements with `font`.
    pub fn new(font: &'a GlyphFont) -> Self {
        Self {
            font,
            margin: SAMPLE_MARGIN,
        }
    }

    /// Set the background sampling margin.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Paint one span and return the number of redactions made (always 1).
    ///
    /// The fill covers the box edges inclusively, clipped to the image.
    /// Boxes with zero width or height get the fill but no text, as do boxes
    /// whose origin lies outside the image.
    pub fn apply(&self, image: &mut RgbImage, span: &MatchedSpan, tokens: &[Token]) -> usize {
        let Some(bbox) = span.bbox(tokens) else {
            return 1;
        };

        let background = sample_background(image, bbox, self.margin);
        let (w, h) = image.dimensions();
        let inside = bbox.x < w && bbox.y < h;
        if inside {
            let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(
                bbox.width.saturating_add(1).min(w - bbox.x),
                bbox.height.saturating_add(1).min(h - bbox.y),
            );
            draw_filled_rect_mut(image, rect, background);
        }

        tracing::debug!(
            term = %span.term,
            x = bbox.x,
            y = bbox.y,
            width = bbox.width,
            height = bbox.height,
            background = ?background.0,
            "painted span"
        );

        if !inside || bbox.is_empty() || span.replacement.is_empty() {
            return 1;
        }

        let size = font_size(bbox.height.min(h));
        self.font.draw(
            image,
            &span.replacement,
            (bbox.x as i32).saturating_add(2),
            (bbox.y as i32).saturating_add(1),
            size as f32,
            text_color(background),
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphscrub_core::TermKind;

    const GRAY: Rgb<u8> = Rgb([40, 40, 40]);

    fn span(start: usize, end: usize, replacement: &str) -> MatchedSpan {
        MatchedSpan {
            start,
            end,
            term: "alan".to_string(),
            replacement: replacement.to_string(),
            kind: TermKind::Name,
        }
    }

    fn tok(x: u32, y: u32, w: u32, h: u32) -> Token {
        Token::new("Alan", 90, PixelBox::new(x, y, w, h))
    }

    #[test]
    fn uniform_white_background() {
        let img = RgbImage::from_pixel(100, 60, WHITE);
        for bbox in [
            PixelBox::new(10, 10, 30, 12),
            PixelBox::new(0, 0, 20, 20),
            PixelBox::new(90, 50, 10, 10),
        ] {
            let bg = sample_background(&img, bbox, SAMPLE_MARGIN);
            assert_eq!(bg, WHITE);
            assert_eq!(text_color(bg), BLACK);
        }
    }

    #[test]
    fn dark_background_gives_white_text() {
        let img = RgbImage::from_pixel(50, 50, GRAY);
        let bg = sample_background(&img, PixelBox::new(10, 10, 10, 10), SAMPLE_MARGIN);
        assert_eq!(bg, GRAY);
        assert_eq!(text_color(bg), WHITE);
    }

    #[test]
    fn brightness_threshold_is_exclusive() {
        assert_eq!(text_color(Rgb([128, 128, 128])), WHITE);
        assert_eq!(text_color(Rgb([129, 129, 129])), BLACK);
        assert_eq!(text_color(Rgb([255, 0, 130])), WHITE);
    }

    #[test]
    fn background_ignores_box_interior() {
        let mut img = RgbImage::from_pixel(60, 40, WHITE);
        for y in 10..20 {
            for x in 10..30 {
                img.put_pixel(x, y, BLACK);
            }
        }
        let bg = sample_background(&img, PixelBox::new(10, 10, 20, 10), SAMPLE_MARGIN);
        assert_eq!(bg, WHITE);
    }

    #[test]
    fn background_tie_goes_to_first_seen() {
        let red = Rgb([200, 0, 0]);
        let blue = Rgb([0, 0, 200]);
        // 4x2 image, margin 1 around the full first row: six samples of
        // each row color, and the top-left pixel is sampled first.
        let two_rows = |top: Rgb<u8>, bottom: Rgb<u8>| {
            let mut img = RgbImage::from_pixel(4, 2, bottom);
            for x in 0..4 {
                img.put_pixel(x, 0, top);
            }
            img
        };
        let bbox = PixelBox::new(0, 0, 4, 1);
        assert_eq!(sample_background(&two_rows(red, blue), bbox, 1), red);
        assert_eq!(sample_background(&two_rows(blue, red), bbox, 1), blue);
    }

    #[test]
    fn most_common_ties_first_seen() {
        let a = Rgb([1, 1, 1]);
        let b = Rgb([2, 2, 2]);
        assert_eq!(most_common([a, b, b, a].into_iter()), Some(a));
        assert_eq!(most_common([b, a, a, b].into_iter()), Some(b));
        assert_eq!(most_common([b, a, a].into_iter()), Some(a));
        assert_eq!(most_common(std::iter::empty()), None);
    }

    #[test]
    fn empty_image_samples_white() {
        let img = RgbImage::new(0, 0);
        assert_eq!(sample_background(&img, PixelBox::new(0, 0, 5, 5), 4), WHITE);
    }

    #[test]
    fn font_size_has_floor() {
        assert_eq!(font_size(0), 10);
        assert_eq!(font_size(12), 10);
        assert_eq!(font_size(14), 10);
        assert_eq!(font_size(20), 16);
    }

    #[test]
    fn blackbox_fill_covers_union_inclusive() {
        let mut img = RgbImage::from_pixel(60, 30, WHITE);
        // Dark "ink" inside the token boxes.
        for x in 10..40 {
            img.put_pixel(x, 12, BLACK);
        }
        let tokens = vec![tok(10, 10, 12, 8), tok(25, 10, 15, 8)];
        let font = GlyphFont::builtin();
        let n = Compositor::new(&font).apply(&mut img, &span(0, 1, ""), &tokens);
        assert_eq!(n, 1);
        for y in 10..=18 {
            for x in 10..=40 {
                assert_eq!(*img.get_pixel(x, y), WHITE, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn fill_uses_sampled_color() {
        let mut img = RgbImage::from_pixel(40, 30, GRAY);
        for y in 10..15 {
            for x in 10..20 {
                img.put_pixel(x, y, WHITE);
            }
        }
        let tokens = vec![tok(10, 10, 10, 5)];
        let font = GlyphFont::builtin();
        Compositor::new(&font).apply(&mut img, &span(0, 0, ""), &tokens);
        assert_eq!(*img.get_pixel(15, 12), GRAY);
    }

    #[test]
    fn replacement_text_drawn_in_contrast_color() {
        let mut img = RgbImage::from_pixel(120, 40, WHITE);
        let tokens = vec![tok(10, 10, 80, 20)];
        let font = GlyphFont::builtin();
        Compositor::new(&font).apply(&mut img, &span(0, 0, "BOB"), &tokens);
        let ink = img.pixels().filter(|p| **p == BLACK).count();
        assert!(ink > 0);
        // Nothing drawn left of the inset.
        for y in 0..40 {
            for x in 0..12 {
                assert_eq!(*img.get_pixel(x, y), WHITE);
            }
        }
    }

    #[test]
    fn zero_width_box_fills_without_text() {
        let mut img = RgbImage::from_pixel(30, 30, WHITE);
        img.put_pixel(5, 5, BLACK);
        let tokens = vec![tok(5, 5, 0, 10)];
        let font = GlyphFont::builtin();
        let n = Compositor::new(&font).apply(&mut img, &span(0, 0, "BOB"), &tokens);
        assert_eq!(n, 1);
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn out_of_bounds_box_is_harmless() {
        let mut img = RgbImage::from_pixel(20, 20, WHITE);
        let tokens = vec![tok(50, 50, 10, 10), tok(15, 15, 30, 30)];
        let font = GlyphFont::builtin();
        let c = Compositor::new(&font);
        assert_eq!(c.apply(&mut img, &span(0, 0, "X"), &tokens), 1);
        assert_eq!(c.apply(&mut img, &span(1, 1, "Y"), &tokens), 1);
    }

    #[test]
    fn span_without_tokens_counts() {
        let mut img = RgbImage::from_pixel(10, 10, WHITE);
        let font = GlyphFont::builtin();
        assert_eq!(Compositor::new(&font).apply(&mut img, &span(3, 4, ""), &[]), 1);
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let mut img = RgbImage::from_pixel(20, 20, WHITE);
        let far = i32::MAX as u32;
        let tokens = vec![
            tok(far, far, 5, 5),
            tok(u32::MAX - 1, 3, 1, 1),
            tok(2, 2, 10, u32::MAX - 10),
        ];
        let font = GlyphFont::builtin();
        let c = Compositor::new(&font);
        assert_eq!(c.apply(&mut img, &span(0, 0, "X"), &tokens), 1);
        assert_eq!(c.apply(&mut img, &span(1, 1, "Y"), &tokens), 1);
        assert!(img.pixels().all(|p| *p == WHITE));
        assert_eq!(c.apply(&mut img, &span(2, 2, "Z"), &tokens), 1);
    }
}
