//! Axis-aligned boxes and image sizes.

use serde::{Deserialize, Serialize};

use super::polygon::Polygon;
use crate::error::{GridError, Result};

/// Width and height of an image or of a model's input frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn of_image(image: &image::RgbImage) -> Self {
        Self::new(image.width() as f64, image.height() as f64)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// An axis-aligned box `[x0, top, x1, bottom]` in a top-left origin frame.
///
/// Serialized as a flat 4-element array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub const fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// The `[0, 0, width, height]` frame of an image.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Build a box from exactly four scalars.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [x0, top, x1, bottom] => Ok(Self::new(*x0, *top, *x1, *bottom)),
            _ => Err(GridError::ShapeViolation(format!(
                "bbox must have 4 elements, got {}",
                values.len()
            ))),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> [f64; 2] {
        [(self.x0 + self.x1) / 2.0, (self.top + self.bottom) / 2.0]
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Swap inverted coordinates so that `x0 <= x1` and `top <= bottom`.
    pub fn normalized(self) -> Self {
        let (x0, x1) = if self.x0 > self.x1 {
            (self.x1, self.x0)
        } else {
            (self.x0, self.x1)
        };
        let (top, bottom) = if self.top > self.bottom {
            (self.bottom, self.top)
        } else {
            (self.top, self.bottom)
        };
        Self::new(x0, top, x1, bottom)
    }

    /// The equivalent 4-corner polygon (top-left, top-right, bottom-right, bottom-left).
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new([
            [self.x0, self.top],
            [self.x1, self.top],
            [self.x1, self.bottom],
            [self.x0, self.bottom],
        ])
    }

    /// Project the box from one coordinate space into another, truncating to whole units.
    pub fn rescale(&self, from: Size, to: Size) -> Self {
        let sx = to.width / from.width;
        let sy = to.height / from.height;
        Self::new(
            (self.x0 * sx).trunc(),
            (self.top * sy).trunc(),
            (self.x1 * sx).trunc(),
            (self.bottom * sy).trunc(),
        )
    }

    /// Snap every coordinate down to a multiple of `divisor`.
    pub fn round_to(&self, divisor: f64) -> Self {
        let snap = |v: f64| (v / divisor).floor() * divisor;
        Self::new(
            snap(self.x0),
            snap(self.top),
            snap(self.x1),
            snap(self.bottom),
        )
    }

    /// Fraction of this box covered by `other`, without margins.
    pub fn covered_fraction(&self, other: &BBox) -> f64 {
        let area = self.area();
        if area == 0.0 {
            return 0.0;
        }
        let x = axis_overlap(self.x0, self.x1, other.x0, other.x1, 0.0);
        let y = axis_overlap(self.top, self.bottom, other.top, other.bottom, 0.0);
        x * y / area
    }
}

impl TryFrom<Vec<f64>> for BBox {
    type Error = GridError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_slice(&values)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.top, b.x1, b.bottom]
    }
}

/// Overlap of `[a_min, a_max]` and `[b_min, b_max]` after dilating both by `margin`.
pub(crate) fn axis_overlap(a_min: f64, a_max: f64, b_min: f64, b_max: f64, margin: f64) -> f64 {
    let hi = (a_max + margin).min(b_max + margin);
    let lo = (a_min - margin).max(b_min - margin);
    (hi - lo).max(0.0)
}
