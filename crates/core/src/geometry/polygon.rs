//! Four-corner polygons.

use serde::{Deserialize, Serialize};

use super::bbox::{BBox, Size};
use crate::error::{GridError, Result};

/// A quadrilateral given as four `(x, y)` corners, conventionally ordered
/// top-left, top-right, bottom-right, bottom-left.
///
/// The corner count and arity are fixed by the type; the fallible
/// constructors and deserialization reject any other shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "[[f64; 2]; 4]")]
pub struct Polygon {
    corners: [[f64; 2]; 4],
}

impl Polygon {
    pub const fn new(corners: [[f64; 2]; 4]) -> Self {
        Self { corners }
    }

    /// Validate a nested corner list coming from an untyped source.
    pub fn from_nested(corners: &[Vec<f64>]) -> Result<Self> {
        if corners.len() != 4 {
            return Err(GridError::ShapeViolation(format!(
                "polygon must have 4 corners, got {}",
                corners.len()
            )));
        }
        let mut out = [[0.0; 2]; 4];
        for (slot, corner) in out.iter_mut().zip(corners) {
            match corner.as_slice() {
                [x, y] => *slot = [*x, *y],
                _ => {
                    return Err(GridError::ShapeViolation(format!(
                        "corner must have 2 elements, got {}",
                        corner.len()
                    )));
                }
            }
        }
        Ok(Self::new(out))
    }

    pub fn corners(&self) -> &[[f64; 2]; 4] {
        &self.corners
    }

    /// Axis-aligned box of the polygon, normalized so that `x0 <= x1` and `top <= bottom`.
    pub fn bbox(&self) -> BBox {
        let [c0, c1, c2, c3] = self.corners;
        BBox::new(
            c0[0].min(c3[0]),
            c0[1].min(c1[1]),
            c1[0].max(c2[0]),
            c2[1].max(c3[1]),
        )
        .normalized()
    }

    /// True when the polygon has no positive extent along either axis.
    ///
    /// Unlike [`Polygon::bbox`] this looks at the raw corner order, so an
    /// inverted result of [`Polygon::intersection_polygon`] counts as empty.
    pub fn is_empty(&self) -> bool {
        let [c0, c1, _, c3] = self.corners;
        c1[0] - c0[0] <= 0.0 || c3[1] - c0[1] <= 0.0
    }

    fn map_corners(&self, f: impl Fn([f64; 2]) -> [f64; 2]) -> Self {
        Self::new(self.corners.map(f))
    }

    /// Project from a model's input frame onto another frame, truncating each coordinate.
    pub fn rescale(&self, from: Size, to: Size) -> Self {
        let sx = to.width / from.width;
        let sy = to.height / from.height;
        self.map_corners(|[x, y]| [(x * sx).trunc(), (y * sy).trunc()])
    }

    /// Clip every corner into `bounds`.
    pub fn fit_to_bounds(&self, bounds: &BBox) -> Self {
        self.map_corners(|[x, y]| {
            [
                x.min(bounds.x1).max(bounds.x0),
                y.min(bounds.bottom).max(bounds.top),
            ]
        })
    }

    /// Smallest axis-aligned polygon covering both boxes.
    pub fn merge(&self, other: &Polygon) -> Self {
        let a = self.bbox();
        let b = other.bbox();
        BBox::new(
            a.x0.min(b.x0),
            a.top.min(b.top),
            a.x1.max(b.x1),
            a.bottom.max(b.bottom),
        )
        .to_polygon()
    }

    /// Corner-wise overlap of two polygons. May be empty, see [`Polygon::is_empty`].
    pub fn intersection_polygon(&self, other: &Polygon) -> Self {
        let [a0, a1, a2, a3] = self.corners;
        let [b0, b1, b2, b3] = other.corners;
        Self::new([
            [a0[0].max(b0[0]), a0[1].max(b0[1])],
            [a1[0].min(b1[0]), a1[1].max(b1[1])],
            [a2[0].min(b2[0]), a2[1].min(b2[1])],
            [a3[0].max(b3[0]), a3[1].min(b3[1])],
        ])
    }

    /// Translate the polygon; `None` leaves that axis untouched.
    pub fn shift(&self, dx: Option<f64>, dy: Option<f64>) -> Self {
        let dx = dx.unwrap_or(0.0);
        let dy = dy.unwrap_or(0.0);
        self.map_corners(|[x, y]| [x + dx, y + dy])
    }
}

impl TryFrom<Vec<Vec<f64>>> for Polygon {
    type Error = GridError;

    fn try_from(corners: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_nested(&corners)
    }
}

impl From<Polygon> for [[f64; 2]; 4] {
    fn from(p: Polygon) -> Self {
        p.corners
    }
}

impl From<BBox> for Polygon {
    fn from(b: BBox) -> Self {
        b.to_polygon()
    }
}
