//! Interfaces to the upstream detection models.
//!
//! The models themselves live outside this crate. Each call takes a batch of
//! requests and must return exactly one result per request, in order. Every
//! request carries the identity of the page or table it belongs to.

use image::RgbImage;

use crate::error::Result;
use crate::geometry::BBox;
use crate::results::{LayoutResult, TextDetectionResult};
use crate::table::{CellCandidate, TableStructure};

/// A page within a document. `page` is 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub document: String,
    pub page: usize,
}

impl PageKey {
    pub fn new(document: impl Into<String>, page: usize) -> Self {
        Self {
            document: document.into(),
            page,
        }
    }

    pub fn table(&self, table_idx: usize) -> TableKey {
        TableKey {
            document: self.document.clone(),
            page: self.page,
            table_idx,
        }
    }
}

/// A table within a page. `table_idx` is 0-based.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub document: String,
    pub page: usize,
    pub table_idx: usize,
}

impl TableKey {
    pub fn page_key(&self) -> PageKey {
        PageKey::new(self.document.clone(), self.page)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetectionTarget {
    Page(PageKey),
    Table(TableKey),
}

#[derive(Clone, Copy, Debug)]
pub struct TextDetectionRequest<'a> {
    pub target: &'a DetectionTarget,
    pub image: &'a RgbImage,
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutRequest<'a> {
    pub page: &'a PageKey,
    pub image: &'a RgbImage,
    pub lines: &'a TextDetectionResult,
}

/// One cropped table ready for the structure model.
#[derive(Clone, Debug)]
pub struct TableInput {
    pub key: TableKey,
    /// Table box in the page frame.
    pub bbox: BBox,
    pub image: RgbImage,
    /// Candidate cells in the crop's frame.
    pub cells: Vec<CellCandidate>,
}

pub trait TextDetector: Send + Sync {
    fn detect_text(
        &self,
        requests: &[TextDetectionRequest<'_>],
    ) -> Result<Vec<TextDetectionResult>>;
}

pub trait LayoutDetector: Send + Sync {
    fn detect_layout(&self, requests: &[LayoutRequest<'_>]) -> Result<Vec<LayoutResult>>;
}

pub trait TableStructureModel: Send + Sync {
    /// Row, column and refined cell detections for each table, in the crop's frame.
    fn recognize(&self, tables: &[TableInput]) -> Result<Vec<TableStructure>>;
}
