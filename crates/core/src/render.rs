//! Debug overlays for assembled tables.
//!
//! Boxes are always drawn; labels only when the style carries a font.

use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info};

use crate::error::{GridError, Result};
use crate::geometry::{BBox, Region};
use crate::results::TableResult;
use crate::table::pixel_rect;

const CELL_COLOR: Rgb<u8> = Rgb([0, 160, 0]);
const ROW_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const COL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const DEFAULT_FONT_SCALE: f32 = 16.0;
const DEFAULT_THICKNESS: u32 = 2;

const SYSTEM_FONT_PATHS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Drawing options shared by every overlay.
pub struct OverlayStyle {
    /// Label font. Labels are skipped when None.
    pub font: Option<FontVec>,
    pub font_scale: f32,
    /// Outline thickness in pixels.
    pub thickness: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: DEFAULT_FONT_SCALE,
            thickness: DEFAULT_THICKNESS,
        }
    }
}

impl std::fmt::Debug for OverlayStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStyle")
            .field("font", &self.font.is_some())
            .field("font_scale", &self.font_scale)
            .field("thickness", &self.thickness)
            .finish()
    }
}

impl OverlayStyle {
    pub fn with_font_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data).map_err(|_| {
            GridError::InvalidArgument(format!("cannot parse font file {}", path.display()))
        })?;
        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }

    /// Load the first usable font from common system locations, or none.
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(data) = std::fs::read(path)
                && let Ok(font) = FontVec::try_from_vec(data)
            {
                info!("loaded system font {}", path);
                return Self {
                    font: Some(font),
                    ..Self::default()
                };
            }
        }
        debug!("no system font found, overlay labels will be skipped");
        Self::default()
    }
}

fn draw_box(image: &mut RgbImage, bbox: &BBox, color: Rgb<u8>, style: &OverlayStyle) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let (x, y, w, h) = pixel_rect(bbox, width, height);
    for t in 0..style.thickness.max(1) {
        if 2 * t >= w || 2 * t >= h {
            break;
        }
        let rect = Rect::at((x + t) as i32, (y + t) as i32).of_size(w - 2 * t, h - 2 * t);
        draw_hollow_rect_mut(image, rect, color);
    }
}

fn draw_label(image: &mut RgbImage, bbox: &BBox, text: &str, color: Rgb<u8>, style: &OverlayStyle) {
    let Some(font) = &style.font else { return };
    let (width, height) = image.dimensions();
    let (x, y, _, _) = pixel_rect(bbox, width, height);
    let inset = style.thickness as i32 + 1;
    draw_text_mut(
        image,
        color,
        x as i32 + inset,
        y as i32 + inset,
        style.font_scale,
        font,
        text,
    );
}

/// Outline every final cell, labeled `row/col`.
pub fn cell_overlay(image: &RgbImage, result: &TableResult, style: &OverlayStyle) -> RgbImage {
    let mut out = image.clone();
    for cell in &result.cells {
        let bbox = cell.bbox();
        draw_box(&mut out, &bbox, CELL_COLOR, style);
        let col = cell
            .col_id
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        draw_label(&mut out, &bbox, &format!("{}/{}", cell.row_id, col), CELL_COLOR, style);
    }
    out
}

/// Outline rows in blue and columns in red.
pub fn row_col_overlay(image: &RgbImage, result: &TableResult, style: &OverlayStyle) -> RgbImage {
    let mut out = image.clone();
    for row in &result.rows {
        let bbox = row.bbox();
        draw_box(&mut out, &bbox, ROW_COLOR, style);
        draw_label(&mut out, &bbox, &format!("Row {}", row.row_id), ROW_COLOR, style);
    }
    for col in &result.cols {
        let bbox = col.bbox();
        draw_box(&mut out, &bbox, COL_COLOR, style);
        draw_label(&mut out, &bbox, &format!("Col {}", col.col_id), COL_COLOR, style);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::regions::{TableCell, TableCol, TableRow};

    fn result() -> TableResult {
        let bbox = BBox::new(0.0, 0.0, 40.0, 20.0);
        let mut cell = TableCell::unassigned(Polygon::from(BBox::new(0.0, 0.0, 20.0, 10.0)), 0);
        cell.col_id = Some(0);
        TableResult {
            cells: vec![cell.clone()],
            unmerged_cells: vec![cell],
            rows: vec![TableRow {
                polygon: Polygon::from(BBox::new(0.0, 0.0, 40.0, 10.0)),
                row_id: 0,
            }],
            cols: vec![TableCol {
                polygon: Polygon::from(BBox::new(20.0, 0.0, 40.0, 20.0)),
                col_id: 0,
            }],
            image_bbox: bbox,
        }
    }

    #[test]
    fn test_cell_overlay_draws_outline() {
        let image = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        let out = cell_overlay(&image, &result(), &OverlayStyle::default());
        assert_eq!(out.dimensions(), (40, 20));
        assert_eq!(*out.get_pixel(0, 0), CELL_COLOR);
        assert_eq!(*out.get_pixel(1, 1), CELL_COLOR);
        assert_eq!(*out.get_pixel(10, 5), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_row_col_overlay_colors() {
        let image = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        let out = row_col_overlay(&image, &result(), &OverlayStyle::default());
        assert_eq!(*out.get_pixel(5, 0), ROW_COLOR);
        assert_eq!(*out.get_pixel(39, 15), COL_COLOR);
    }

    #[test]
    fn test_missing_font_file() {
        let err = OverlayStyle::with_font_path(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }
}
