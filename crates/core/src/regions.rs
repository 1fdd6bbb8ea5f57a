//! Typed detections: geometry plus the semantic fields each detector attaches.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Polygon, Region, Reshape};

/// Writes `polygon` alongside its derived `bbox`; reading ignores `bbox`.
mod polygon_fields {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::geometry::{BBox, Polygon};

    #[derive(Serialize)]
    struct Written<'a> {
        polygon: &'a Polygon,
        bbox: BBox,
    }

    #[derive(Deserialize)]
    struct Read {
        polygon: Polygon,
    }

    pub fn serialize<S: Serializer>(polygon: &Polygon, serializer: S) -> Result<S::Ok, S::Error> {
        Written {
            polygon,
            bbox: polygon.bbox(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Polygon, D::Error> {
        Read::deserialize(deserializer).map(|read| read.polygon)
    }
}

/// A bare detection with an optional confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonBox {
    #[serde(flatten, with = "polygon_fields")]
    pub polygon: Polygon,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl PolygonBox {
    pub fn new(polygon: Polygon) -> Self {
        Self {
            polygon,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

impl From<BBox> for PolygonBox {
    fn from(b: BBox) -> Self {
        Self::new(b.to_polygon())
    }
}

/// A labeled layout region, e.g. `"Table"` or `"Text"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    #[serde(flatten, with = "polygon_fields")]
    pub polygon: Polygon,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub label: String,
    /// Reading-order index.
    pub position: usize,
    #[serde(default)]
    pub top_k: Option<IndexMap<String, f64>>,
}

/// A detected ruling line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnLine {
    pub bbox: BBox,
    pub vertical: bool,
    pub horizontal: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    #[serde(flatten, with = "polygon_fields")]
    pub polygon: Polygon,
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A table cell with its grid position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(flatten, with = "polygon_fields")]
    pub polygon: Polygon,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub row_id: usize,
    #[serde(default)]
    pub col_id: Option<usize>,
    pub colspan: usize,
    #[serde(default)]
    pub rowspan: Option<usize>,
    pub within_row_id: usize,
    pub cell_id: usize,
    #[serde(default)]
    pub merge_up: bool,
    #[serde(default)]
    pub merge_down: bool,
}

impl TableCell {
    /// A cell placed at `row_id` with no column, spans or ids yet.
    pub fn unassigned(polygon: Polygon, row_id: usize) -> Self {
        Self {
            polygon,
            confidence: None,
            row_id,
            col_id: None,
            colspan: 1,
            rowspan: None,
            within_row_id: 0,
            cell_id: 0,
            merge_up: false,
            merge_down: false,
        }
    }

    pub fn label(&self) -> String {
        let rowspan = self
            .rowspan
            .map(|r| r.to_string())
            .unwrap_or_else(|| "None".to_string());
        format!("{} {}/{}", self.row_id, rowspan, self.colspan)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(flatten, with = "polygon_fields")]
    pub polygon: Polygon,
    pub row_id: usize,
}

impl TableRow {
    pub fn label(&self) -> String {
        format!("Row {}", self.row_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableCol {
    #[serde(flatten, with = "polygon_fields")]
    pub polygon: Polygon,
    pub col_id: usize,
}

impl TableCol {
    pub fn label(&self) -> String {
        format!("Column {}", self.col_id)
    }
}

macro_rules! polygon_region {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Region for $ty {
                fn polygon(&self) -> Polygon {
                    self.polygon
                }
            }

            impl Reshape for $ty {
                fn with_polygon(mut self, polygon: Polygon) -> Self {
                    self.polygon = polygon;
                    self
                }
            }
        )*
    };
}

polygon_region!(PolygonBox, LayoutBox, TextLine, TableCell, TableRow, TableCol);

impl Region for ColumnLine {
    fn polygon(&self) -> Polygon {
        self.bbox.to_polygon()
    }

    fn bbox(&self) -> BBox {
        self.bbox.normalized()
    }
}

impl Reshape for ColumnLine {
    fn with_polygon(mut self, polygon: Polygon) -> Self {
        self.bbox = polygon.bbox();
        self
    }
}

/// Any typed detection, for code that handles regions of mixed kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedRegion {
    Detection(PolygonBox),
    Layout(LayoutBox),
    Column(ColumnLine),
    Text(TextLine),
    Cell(TableCell),
    Row(TableRow),
    Col(TableCol),
}

impl TypedRegion {
    /// Human-readable label used when drawing the region.
    pub fn label(&self) -> Option<String> {
        match self {
            TypedRegion::Detection(d) => d.confidence.map(|c| format!("{c:.2}")),
            TypedRegion::Layout(l) => Some(l.label.clone()),
            TypedRegion::Column(c) => Some(if c.vertical { "V" } else { "H" }.to_string()),
            TypedRegion::Text(t) => Some(t.text.clone()),
            TypedRegion::Cell(c) => Some(c.label()),
            TypedRegion::Row(r) => Some(r.label()),
            TypedRegion::Col(c) => Some(c.label()),
        }
    }
}

impl Region for TypedRegion {
    fn polygon(&self) -> Polygon {
        match self {
            TypedRegion::Detection(d) => d.polygon(),
            TypedRegion::Layout(l) => l.polygon(),
            TypedRegion::Column(c) => c.polygon(),
            TypedRegion::Text(t) => t.polygon(),
            TypedRegion::Cell(c) => c.polygon(),
            TypedRegion::Row(r) => r.polygon(),
            TypedRegion::Col(c) => c.polygon(),
        }
    }
}

impl Reshape for TypedRegion {
    fn with_polygon(self, polygon: Polygon) -> Self {
        match self {
            TypedRegion::Detection(d) => TypedRegion::Detection(d.with_polygon(polygon)),
            TypedRegion::Layout(l) => TypedRegion::Layout(l.with_polygon(polygon)),
            TypedRegion::Column(c) => TypedRegion::Column(c.with_polygon(polygon)),
            TypedRegion::Text(t) => TypedRegion::Text(t.with_polygon(polygon)),
            TypedRegion::Cell(c) => TypedRegion::Cell(c.with_polygon(polygon)),
            TypedRegion::Row(r) => TypedRegion::Row(r.with_polygon(polygon)),
            TypedRegion::Col(c) => TypedRegion::Col(c.with_polygon(polygon)),
        }
    }
}

macro_rules! typed_region_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for TypedRegion {
                fn from(value: $ty) -> Self {
                    TypedRegion::$variant(value)
                }
            }
        )*
    };
}

typed_region_from!(
    Detection(PolygonBox),
    Layout(LayoutBox),
    Column(ColumnLine),
    Text(TextLine),
    Cell(TableCell),
    Row(TableRow),
    Col(TableCol),
);
