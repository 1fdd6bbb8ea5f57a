//! Pipeline output and the per-document prediction records.

use image::RgbImage;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::detectors::TableKey;
use crate::geometry::BBox;
use crate::results::TableResult;

/// A serialized table result tagged with where it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    #[serde(flatten)]
    pub result: TableResult,
    /// 1-based page within the document.
    pub page: usize,
    /// 0-based table within the page.
    pub table_idx: usize,
}

/// Records grouped by document name, in first-seen order.
pub type TablePredictions = IndexMap<String, Vec<TableRecord>>;

/// One assembled table.
#[derive(Clone, Debug)]
pub struct TableOutcome {
    pub key: TableKey,
    /// Table box in the page frame.
    pub bbox: BBox,
    /// The crop the structure model saw.
    pub image: RgbImage,
    pub result: TableResult,
}

impl TableOutcome {
    pub fn record(&self) -> TableRecord {
        TableRecord {
            result: self.result.clone(),
            page: self.key.page,
            table_idx: self.key.table_idx,
        }
    }

    /// File stem used for this table's debug images.
    pub fn debug_stem(&self) -> String {
        format!(
            "{}_page{}_table{}",
            self.key.document, self.key.page, self.key.table_idx
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct PipelineOutput {
    /// Every table found, in input page order then table order.
    pub tables: Vec<TableOutcome>,
}

impl PipelineOutput {
    pub fn predictions(&self) -> TablePredictions {
        let mut out = TablePredictions::new();
        for table in &self.tables {
            out.entry(table.key.document.clone())
                .or_default()
                .push(table.record());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{TableCell, TableRow};

    fn outcome(document: &str, page: usize, table_idx: usize) -> TableOutcome {
        let bbox = BBox::new(0.0, 0.0, 10.0, 10.0);
        TableOutcome {
            key: TableKey {
                document: document.to_string(),
                page,
                table_idx,
            },
            bbox,
            image: RgbImage::new(10, 10),
            result: TableResult::empty(bbox),
        }
    }

    #[test]
    fn test_predictions_group_by_document() {
        let output = PipelineOutput {
            tables: vec![outcome("b", 1, 0), outcome("a", 2, 0), outcome("b", 3, 1)],
        };
        let predictions = output.predictions();
        let docs: Vec<&String> = predictions.keys().collect();
        assert_eq!(docs, vec!["b", "a"]);
        assert_eq!(predictions["b"].len(), 2);
        assert_eq!(predictions["b"][1].page, 3);
        assert_eq!(predictions["b"][1].table_idx, 1);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = outcome("doc", 2, 1).record();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["page"], 2);
        assert_eq!(value["table_idx"], 1);
        assert!(value["cells"].as_array().unwrap().is_empty());
        assert_eq!(value["image_bbox"], serde_json::json!([0.0, 0.0, 10.0, 10.0]));

        let back: TableRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_regions_carry_bbox() {
        let mut table = outcome("doc", 1, 0);
        let polygon = BBox::new(1.0, 2.0, 6.0, 4.0).to_polygon();
        table.result.cells.push(TableCell::unassigned(polygon, 0));
        table.result.rows.push(TableRow { polygon, row_id: 0 });
        let value = serde_json::to_value(table.record()).unwrap();
        assert_eq!(value["cells"][0]["bbox"], serde_json::json!([1.0, 2.0, 6.0, 4.0]));
        assert_eq!(value["rows"][0]["bbox"], serde_json::json!([1.0, 2.0, 6.0, 4.0]));

        let back: TableRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.result.cells[0].polygon, polygon);
    }

    #[test]
    fn test_debug_stem() {
        assert_eq!(outcome("scan", 4, 2).debug_stem(), "scan_page4_table2");
    }
}
