//! Geometric primitives for detected regions.
//!
//! Detectors emit either 4-corner polygons or axis-aligned boxes. Both forms
//! project onto a normalized [`BBox`], and all overlap math goes through the
//! [`Region`] trait so it works uniformly on either shape.

mod bbox;
mod polygon;
mod region;

pub use bbox::{BBox, Size};
pub use polygon::Polygon;
pub use region::{Region, Reshape};
