//! The shared region capability.

use super::bbox::{BBox, axis_overlap};
use super::polygon::Polygon;
use crate::error::{GridError, Result};

fn check_margin_frac(name: &str, frac: f64) -> Result<()> {
    if (0.0..=1.0).contains(&frac) {
        Ok(())
    } else {
        Err(GridError::ParameterViolation(format!(
            "{name} must lie in [0, 1], got {frac}"
        )))
    }
}

/// Anything with a polygonal footprint.
///
/// Implementors only provide [`Region::polygon`]; the derived box and every
/// overlap measure operate on the normalized bounding box.
pub trait Region {
    fn polygon(&self) -> Polygon;

    fn bbox(&self) -> BBox {
        self.polygon().bbox()
    }

    fn width(&self) -> f64 {
        self.bbox().width()
    }

    fn height(&self) -> f64 {
        self.bbox().height()
    }

    fn area(&self) -> f64 {
        self.bbox().area()
    }

    fn center(&self) -> [f64; 2] {
        self.bbox().center()
    }

    /// Horizontal overlap after dilating both boxes by `margin`.
    fn x_overlap<R: Region + ?Sized>(&self, other: &R, margin: f64) -> f64 {
        let a = self.bbox();
        let b = other.bbox();
        axis_overlap(a.x0, a.x1, b.x0, b.x1, margin)
    }

    /// Vertical overlap after dilating both boxes by `margin`.
    fn y_overlap<R: Region + ?Sized>(&self, other: &R, margin: f64) -> f64 {
        let a = self.bbox();
        let b = other.bbox();
        axis_overlap(a.top, a.bottom, b.top, b.bottom, margin)
    }

    fn intersection_area<R: Region + ?Sized>(
        &self,
        other: &R,
        x_margin: f64,
        y_margin: f64,
    ) -> f64 {
        self.x_overlap(other, x_margin) * self.y_overlap(other, y_margin)
    }

    /// Fraction of `self` covered by `other`. Not symmetric.
    ///
    /// Margin fractions are relative to the smaller of the two boxes and must
    /// lie in `[0, 1]`. A zero-area `self` is covered by nothing.
    fn intersection_pct<R: Region + ?Sized>(
        &self,
        other: &R,
        x_margin_frac: f64,
        y_margin_frac: f64,
    ) -> Result<f64> {
        check_margin_frac("x_margin_frac", x_margin_frac)?;
        check_margin_frac("y_margin_frac", y_margin_frac)?;

        let own = self.bbox();
        let area = own.area();
        if area == 0.0 {
            return Ok(0.0);
        }
        let theirs = other.bbox();
        let x_margin = if x_margin_frac > 0.0 {
            (own.width().min(theirs.width()) * x_margin_frac).trunc()
        } else {
            0.0
        };
        let y_margin = if y_margin_frac > 0.0 {
            (own.height().min(theirs.height()) * y_margin_frac).trunc()
        } else {
            0.0
        };
        Ok(self.intersection_area(other, x_margin, y_margin) / area)
    }
}

/// Regions whose geometry can be replaced by the owner of the value.
///
/// Geometric transforms on [`Polygon`] are pure; `map_polygon` is the one
/// place a transformed shape is written back.
pub trait Reshape: Region + Sized {
    fn with_polygon(self, polygon: Polygon) -> Self;

    fn map_polygon(self, f: impl FnOnce(Polygon) -> Polygon) -> Self {
        let polygon = f(self.polygon());
        self.with_polygon(polygon)
    }
}

impl Region for Polygon {
    fn polygon(&self) -> Polygon {
        *self
    }
}

impl Reshape for Polygon {
    fn with_polygon(self, polygon: Polygon) -> Self {
        polygon
    }
}

impl Region for BBox {
    fn polygon(&self) -> Polygon {
        self.to_polygon()
    }

    fn bbox(&self) -> BBox {
        self.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_area_symmetric() {
        let a = BBox::new(0.0, 0.0, 10.0, 8.0);
        let b = BBox::new(4.0, -3.0, 18.0, 5.0);
        assert_eq!(a.intersection_area(&b, 0.0, 0.0), 30.0);
        assert_eq!(
            a.intersection_area(&b, 0.0, 0.0),
            b.intersection_area(&a, 0.0, 0.0)
        );
    }

    #[test]
    fn test_intersection_area_with_margin_counts_adjacent() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(11.0, 0.0, 20.0, 10.0);
        assert_eq!(a.intersection_area(&b, 0.0, 0.0), 0.0);
        assert!(a.intersection_area(&b, 2.0, 0.0) > 0.0);
    }

    #[test]
    fn test_intersection_pct_bounded_by_self() {
        let outer = BBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = BBox::new(10.0, 10.0, 60.0, 30.0);
        assert_eq!(inner.intersection_pct(&outer, 0.0, 0.0).unwrap(), 1.0);
        let pct = outer.intersection_pct(&inner, 0.0, 0.0).unwrap();
        assert!((0.0..=1.0).contains(&pct));
        assert_eq!(pct, 0.1);
    }

    #[test]
    fn test_intersection_pct_rejects_out_of_range_margin() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let err = a.intersection_pct(&a, 1.5, 0.0).unwrap_err();
        assert!(matches!(err, GridError::ParameterViolation(_)));
        assert!(a.intersection_pct(&a, 0.0, -0.1).is_err());
        assert!(a.intersection_pct(&a, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_intersection_pct_zero_area_self() {
        let line = BBox::new(0.0, 5.0, 10.0, 5.0);
        let page = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(line.intersection_pct(&page, 0.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_intersection_pct_margin_from_smaller_box() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(12.0, 0.0, 32.0, 10.0);
        // Smaller width is 10, so a 0.5 fraction dilates by 5.
        let pct = a.intersection_pct(&b, 0.5, 0.0).unwrap();
        assert_eq!(pct, 0.8);
    }

    #[test]
    fn test_polygon_and_bbox_share_overlap_math() {
        let p = BBox::new(0.0, 0.0, 4.0, 4.0).to_polygon();
        let b = BBox::new(2.0, 2.0, 6.0, 6.0);
        assert_eq!(p.x_overlap(&b, 0.0), 2.0);
        assert_eq!(b.y_overlap(&p, 0.0), 2.0);
    }

    #[test]
    fn test_map_polygon_replaces_geometry() {
        let p = BBox::new(0.0, 0.0, 4.0, 4.0).to_polygon();
        let moved = p.map_polygon(|p| p.shift(Some(1.0), Some(1.0)));
        assert_eq!(moved.bbox(), BBox::new(1.0, 1.0, 5.0, 5.0));
    }
}
