//! Table assembly types and settings.

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;
use crate::regions::PolygonBox;

// Default constants
pub(crate) const DEFAULT_SPAN_THRESHOLD: f64 = 0.5;
pub(crate) const DEFAULT_ABSORB_THRESHOLD: f64 = 0.5;
pub(crate) const DEFAULT_LINE_IN_TABLE_PCT: f64 = 0.5;

/// Thresholds used when turning raw detections into a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssemblerSettings {
    /// Fraction of a row (column) a cell must cover for that row (column)
    /// to count toward the cell's span.
    pub span_threshold: f64,
    /// Fraction of a single-slot cell that must lie inside a spanning cell
    /// for it to be absorbed by that cell.
    pub absorb_threshold: f64,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            span_threshold: DEFAULT_SPAN_THRESHOLD,
            absorb_threshold: DEFAULT_ABSORB_THRESHOLD,
        }
    }
}

/// Raw output of the table-structure model for one table crop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStructure {
    pub cells: Vec<PolygonBox>,
    #[serde(default)]
    pub rows: Vec<PolygonBox>,
    #[serde(default)]
    pub cols: Vec<PolygonBox>,
}

/// A candidate cell handed to the structure model, in the crop's frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellCandidate {
    pub bbox: BBox,
    pub text: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Axis {
    Row,
    Col,
}
