//! Per-image result aggregates.
//!
//! Every region held by an aggregate is expressed in the frame described by
//! its `image_bbox`, which is always `[0, 0, width, height]`.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Reshape, Size};
use crate::regions::{ColumnLine, LayoutBox, PolygonBox, TableCell, TableCol, TableRow, TextLine};

/// A dense score map produced alongside text detection.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text_lines: Vec<TextLine>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    pub image_bbox: BBox,
}

impl OcrResult {
    /// Project every text line into a frame of `size`.
    pub fn rescaled(self, size: Size) -> Self {
        let from = self.image_bbox.size();
        let text_lines = self
            .text_lines
            .into_iter()
            .map(|line| line.map_polygon(|p| p.rescale(from, size)))
            .collect();
        Self {
            text_lines,
            languages: self.languages,
            image_bbox: BBox::from_size(size),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextDetectionResult {
    pub bboxes: Vec<PolygonBox>,
    #[serde(default)]
    pub vertical_lines: Vec<ColumnLine>,
    #[serde(skip)]
    pub heatmap: Option<Heatmap>,
    #[serde(skip)]
    pub affinity_map: Option<Heatmap>,
    pub image_bbox: BBox,
}

impl TextDetectionResult {
    pub fn empty(size: Size) -> Self {
        Self {
            bboxes: Vec::new(),
            vertical_lines: Vec::new(),
            heatmap: None,
            affinity_map: None,
            image_bbox: BBox::from_size(size),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub bboxes: Vec<LayoutBox>,
    pub image_bbox: BBox,
    /// Whether the image was tiled and reconstructed before detection.
    #[serde(default)]
    pub sliced: bool,
}

impl LayoutResult {
    /// Boxes carrying `label`, in detection order.
    pub fn boxes_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a LayoutBox> + 'a {
        self.bboxes.iter().filter(move |b| b.label == label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableResult {
    /// Merged view: one entry per logical cell with its final spans.
    pub cells: Vec<TableCell>,
    /// One span-1 entry per occupied slot. A slot covered by a spanning cell
    /// holds the raw detection absorbed into it, or else a piece split from
    /// the spanning cell and clipped to the slot's band.
    pub unmerged_cells: Vec<TableCell>,
    pub rows: Vec<TableRow>,
    pub cols: Vec<TableCol>,
    pub image_bbox: BBox,
}

impl TableResult {
    pub fn empty(image_bbox: BBox) -> Self {
        Self {
            cells: Vec::new(),
            unmerged_cells: Vec::new(),
            rows: Vec::new(),
            cols: Vec::new(),
            image_bbox,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
