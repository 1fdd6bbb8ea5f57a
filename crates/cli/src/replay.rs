//! Detectors that answer from a recording of earlier model outputs.
//!
//! The recording is a JSON object with a `pages` array. Each entry names its
//! `document` and 1-based `page`, and may carry the page-level `text` and
//! `layout` detections plus a `tables` array holding, per table in order, an
//! optional crop-level `text` detection and the model's `structure`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;
use tablegrid_core::error::{GridError, Result};
use tablegrid_core::geometry::Size;
use tablegrid_core::pipeline::{
    DetectionTarget, LayoutDetector, LayoutRequest, TableInput, TableStructureModel,
    TextDetectionRequest, TextDetector,
};
use tablegrid_core::results::{LayoutResult, TextDetectionResult};
use tablegrid_core::table::TableStructure;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Recording {
    pages: Vec<RecordedPage>,
}

#[derive(Debug, Deserialize)]
struct RecordedPage {
    document: String,
    page: usize,
    #[serde(default)]
    text: Option<TextDetectionResult>,
    #[serde(default)]
    layout: Option<LayoutResult>,
    #[serde(default)]
    tables: Vec<RecordedTable>,
}

#[derive(Debug, Deserialize)]
struct RecordedTable {
    #[serde(default)]
    text: Option<TextDetectionResult>,
    structure: TableStructure,
}

pub struct ReplayDetector {
    pages: HashMap<(String, usize), RecordedPage>,
}

impl ReplayDetector {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read detections {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("invalid detections {}", path.display()))
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let recording: Recording = serde_json::from_str(data)?;
        let mut pages = HashMap::with_capacity(recording.pages.len());
        for page in recording.pages {
            let key = (page.document.clone(), page.page);
            if pages.contains_key(&key) {
                bail!("duplicate recording for {} page {}", key.0, key.1);
            }
            pages.insert(key, page);
        }
        debug!(pages = pages.len(), "loaded detector recording");
        Ok(Self { pages })
    }

    fn page(&self, document: &str, page: usize) -> Result<&RecordedPage> {
        self.pages
            .get(&(document.to_string(), page))
            .ok_or_else(|| GridError::Detector(format!("no recording for {document} page {page}")))
    }

    fn table(&self, document: &str, page: usize, table_idx: usize) -> Result<&RecordedTable> {
        self.page(document, page)?
            .tables
            .get(table_idx)
            .ok_or_else(|| {
                GridError::Detector(format!(
                    "no recording for {document} page {page} table {table_idx}"
                ))
            })
    }
}

impl TextDetector for ReplayDetector {
    fn detect_text(
        &self,
        requests: &[TextDetectionRequest<'_>],
    ) -> Result<Vec<TextDetectionResult>> {
        requests
            .iter()
            .map(|request| {
                let recorded = match request.target {
                    DetectionTarget::Page(key) => self
                        .pages
                        .get(&(key.document.clone(), key.page))
                        .and_then(|p| p.text.clone()),
                    DetectionTarget::Table(key) => self
                        .table(&key.document, key.page, key.table_idx)
                        .ok()
                        .and_then(|t| t.text.clone()),
                };
                Ok(recorded
                    .unwrap_or_else(|| TextDetectionResult::empty(Size::of_image(request.image))))
            })
            .collect()
    }
}

impl LayoutDetector for ReplayDetector {
    fn detect_layout(&self, requests: &[LayoutRequest<'_>]) -> Result<Vec<LayoutResult>> {
        requests
            .iter()
            .map(|request| {
                let key = request.page;
                self.page(&key.document, key.page)?
                    .layout
                    .clone()
                    .ok_or_else(|| {
                        GridError::Detector(format!(
                            "no recorded layout for {} page {}",
                            key.document, key.page
                        ))
                    })
            })
            .collect()
    }
}

impl TableStructureModel for ReplayDetector {
    fn recognize(&self, tables: &[TableInput]) -> Result<Vec<TableStructure>> {
        tables
            .iter()
            .map(|table| {
                let key = &table.key;
                Ok(self
                    .table(&key.document, key.page, key.table_idx)?
                    .structure
                    .clone())
            })
            .collect()
    }
}
