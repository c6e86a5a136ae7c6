/// Axis-aligned pixel box with top-left origin.
///
/// Coordinates follow the OCR convention:
/// - `x`: left edge (column of the first covered pixel)
/// - `y`: top edge (row of the first covered pixel)
/// - `width`, `height`: extent in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a box from its left/top and right/bottom edges.
    ///
    /// Edges are saturating: a right edge left of `x0` yields zero width.
    pub fn from_edges(x0: u32, top: u32, x1: u32, bottom: u32) -> Self {
        Self {
            x: x0,
            y: top,
            width: x1.saturating_sub(x0),
            height: bottom.saturating_sub(top),
        }
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the box covers no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Compute the union of two boxes.
    pub fn union(&self, other: &PixelBox) -> PixelBox {
        PixelBox::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Divide every coordinate by `factor`, truncating toward zero.
    ///
    /// Maps boxes recognized on an upscaled copy back to the source image.
    pub fn downscale(&self, factor: f64) -> PixelBox {
        if factor <= 0.0 || factor == 1.0 {
            return *self;
        }
        let shrink = |v: u32| (f64::from(v) / factor) as u32;
        PixelBox {
            x: shrink(self.x),
            y: shrink(self.y),
            width: shrink(self.width),
            height: shrink(self.height),
        }
    }
}
