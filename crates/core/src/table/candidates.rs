//! Candidate cells for the structure model and table crops.

use image::RgbImage;
use image::imageops;

use super::types::CellCandidate;
use crate::error::Result;
use crate::geometry::{BBox, Region, Size};
use crate::regions::PolygonBox;
use crate::results::{OcrResult, TextDetectionResult};

/// Derive each table's candidate cells from page-level text lines.
///
/// Lines are first projected from the OCR frame into the image frame of
/// `image_size`. A line belongs to a table when at least `min_pct` of it lies
/// inside the table box; it is then moved into the local frame of the crop
/// [`crop_image`] cuts for that box and clipped to it.
pub fn table_cell_candidates(
    table_boxes: &[BBox],
    text_lines: &OcrResult,
    image_size: Size,
    min_pct: f64,
) -> Result<Vec<Vec<CellCandidate>>> {
    let from = text_lines.image_bbox.size();
    let (width, height) = (image_size.width as u32, image_size.height as u32);
    let mut out = Vec::with_capacity(table_boxes.len());
    for table in table_boxes {
        let (x, y, w, h) = pixel_rect(table, width, height);
        let crop_bounds = BBox::new(0.0, 0.0, w as f64, h as f64);
        let mut cells = Vec::new();
        for line in &text_lines.text_lines {
            let polygon = line.polygon.rescale(from, image_size);
            if polygon.intersection_pct(table, 0.0, 0.0)? < min_pct {
                continue;
            }
            let local = polygon
                .shift(Some(-(x as f64)), Some(-(y as f64)))
                .fit_to_bounds(&crop_bounds);
            cells.push(CellCandidate {
                bbox: local.bbox(),
                text: Some(line.text.clone()),
            });
        }
        out.push(cells);
    }
    Ok(out)
}

/// Candidate cells from a text-detection pass over a table crop.
pub fn detected_cell_candidates(detection: &TextDetectionResult) -> Vec<CellCandidate> {
    detection
        .bboxes
        .iter()
        .map(|b: &PolygonBox| CellCandidate {
            bbox: b.bbox(),
            text: None,
        })
        .collect()
}

/// Pixel rectangle `(x, y, width, height)` covering `bbox`, clamped to the image.
///
/// Fractional edges are widened outward and the result is at least 1×1.
pub fn pixel_rect(bbox: &BBox, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let b = bbox.normalized();
    let max_x = width.saturating_sub(1) as f64;
    let max_y = height.saturating_sub(1) as f64;
    let x0 = b.x0.floor().clamp(0.0, max_x) as u32;
    let y0 = b.top.floor().clamp(0.0, max_y) as u32;
    let x1 = (b.x1.ceil() as i64).clamp(x0 as i64 + 1, width.max(1) as i64) as u32;
    let y1 = (b.bottom.ceil() as i64).clamp(y0 as i64 + 1, height.max(1) as i64) as u32;
    (x0, y0, x1 - x0, y1 - y0)
}

/// Crop `image` to `bbox`.
pub fn crop_image(image: &RgbImage, bbox: &BBox) -> RgbImage {
    let (x, y, w, h) = pixel_rect(bbox, image.width(), image.height());
    imageops::crop_imm(image, x, y, w, h).to_image()
}
