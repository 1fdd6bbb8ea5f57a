//! Grid assembly from raw cell, row and column detections.
//!
//! Rows and columns are numbered in reading order, every cell is placed on
//! the grid by axis overlap, and cells that substantially cover several rows
//! or columns become spanning cells. Two views are produced: the merged
//! `cells` and the per-slot `unmerged_cells`.

use itertools::Itertools;
use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use super::types::{AssemblerSettings, Axis, TableStructure};
use crate::geometry::{BBox, Polygon, Region};
use crate::regions::{PolygonBox, TableCell, TableCol, TableRow};
use crate::results::TableResult;

/// A row or column band after ordering.
#[derive(Clone, Copy, Debug)]
struct Band {
    polygon: Polygon,
    bbox: BBox,
}

/// Start index and extent of a cell along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placement {
    start: usize,
    span: usize,
}

impl Placement {
    fn end(&self) -> usize {
        self.start + self.span - 1
    }

    fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx <= self.end()
    }
}

#[derive(Clone, Debug)]
struct PlacedCell {
    polygon: Polygon,
    bbox: BBox,
    confidence: Option<f64>,
    row: Placement,
    col: Placement,
}

impl PlacedCell {
    fn is_spanning(&self) -> bool {
        self.row.span > 1 || self.col.span > 1
    }
}

fn extent(b: &BBox, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::Row => (b.top, b.bottom),
        Axis::Col => (b.x0, b.x1),
    }
}

fn overlap_along(a: &BBox, b: &BBox, axis: Axis) -> f64 {
    match axis {
        Axis::Row => a.y_overlap(b, 0.0),
        Axis::Col => a.x_overlap(b, 0.0),
    }
}

/// Detected bands sorted top-to-bottom (rows) or left-to-right (columns).
fn ordered_bands(regions: &[PolygonBox], axis: Axis) -> Vec<Band> {
    let mut bands: Vec<(usize, Band)> = regions
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            (
                idx,
                Band {
                    polygon: r.polygon,
                    bbox: r.bbox(),
                },
            )
        })
        .collect();
    bands.sort_by_key(|(idx, band)| {
        let b = band.bbox;
        let (lead, cross) = match axis {
            Axis::Row => (b.top, b.x0),
            Axis::Col => (b.x0, b.top),
        };
        (OrderedFloat(lead), OrderedFloat(cross), *idx)
    });
    bands.into_iter().map(|(_, band)| band).collect()
}

/// Ordered bands, or a single band covering `frame` when none were detected.
fn grid_bands(regions: &[PolygonBox], axis: Axis, frame: BBox) -> Vec<Band> {
    let bands = ordered_bands(regions, axis);
    if !bands.is_empty() {
        return bands;
    }
    vec![Band {
        polygon: frame.to_polygon(),
        bbox: frame,
    }]
}

fn row_records(bands: &[Band]) -> Vec<TableRow> {
    bands
        .iter()
        .enumerate()
        .map(|(row_id, band)| TableRow {
            polygon: band.polygon,
            row_id,
        })
        .collect()
}

fn col_records(bands: &[Band]) -> Vec<TableCol> {
    bands
        .iter()
        .enumerate()
        .map(|(col_id, band)| TableCol {
            polygon: band.polygon,
            col_id,
        })
        .collect()
}

/// Band with maximal overlap, ties to the lower index.
///
/// A cell that overlaps no band goes to the band whose center is closest.
fn best_band(cell: &BBox, bands: &[Band], axis: Axis) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (idx, band) in bands.iter().enumerate() {
        let overlap = overlap_along(cell, &band.bbox, axis);
        if overlap > best.map_or(0.0, |(_, o)| o) {
            best = Some((idx, overlap));
        }
    }
    if let Some((idx, _)) = best {
        return idx;
    }

    let (lo, hi) = extent(cell, axis);
    let center = (lo + hi) / 2.0;
    let mut nearest = 0;
    let mut nearest_dist = f64::INFINITY;
    for (idx, band) in bands.iter().enumerate() {
        let (b_lo, b_hi) = extent(&band.bbox, axis);
        let dist = ((b_lo + b_hi) / 2.0 - center).abs();
        if dist < nearest_dist {
            nearest = idx;
            nearest_dist = dist;
        }
    }
    trace!(?axis, band = nearest, "cell overlaps no band, using nearest center");
    nearest
}

fn place(cell: &BBox, bands: &[Band], axis: Axis, threshold: f64) -> Placement {
    let covered: Vec<usize> = bands
        .iter()
        .enumerate()
        .filter(|(_, band)| {
            let (lo, hi) = extent(&band.bbox, axis);
            let len = hi - lo;
            len > 0.0 && overlap_along(cell, &band.bbox, axis) / len >= threshold
        })
        .map(|(idx, _)| idx)
        .collect();

    match (covered.first(), covered.last()) {
        (Some(&first), Some(&last)) if covered.len() >= 2 => Placement {
            start: first,
            span: last - first + 1,
        },
        _ => Placement {
            start: best_band(cell, bands, axis),
            span: 1,
        },
    }
}

/// Clip `cell` to `band` along `axis`; keeps the band extent when they do not meet.
fn clip_along(cell: (f64, f64), band: (f64, f64)) -> (f64, f64) {
    let lo = cell.0.max(band.0);
    let hi = cell.1.min(band.1);
    if lo <= hi { (lo, hi) } else { band }
}

/// Assign reading-order `cell_id`s and per-row `within_row_id`s.
fn number_cells(cells: &mut [TableCell]) {
    cells.sort_by_key(|c| {
        let b = c.bbox();
        (
            c.row_id,
            c.col_id,
            OrderedFloat(b.x0),
            OrderedFloat(b.top),
        )
    });
    let mut next_id = 0;
    for (_, row) in &cells.iter_mut().chunk_by(|c| c.row_id) {
        for (pos, cell) in row.enumerate() {
            cell.within_row_id = pos;
            cell.cell_id = next_id;
            next_id += 1;
        }
    }
}

/// Turns raw table-structure detections into an indexed grid.
#[derive(Clone, Debug, Default)]
pub struct TableAssembler {
    settings: AssemblerSettings,
}

impl TableAssembler {
    pub fn new(settings: AssemblerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AssemblerSettings {
        &self.settings
    }

    /// Assemble one table whose detections live in the frame `image_bbox`.
    ///
    /// Without cells the result has no cells but still lists the detected
    /// rows and columns in reading order.
    pub fn assemble(&self, structure: &TableStructure, image_bbox: BBox) -> TableResult {
        if structure.cells.is_empty() {
            return TableResult {
                rows: row_records(&ordered_bands(&structure.rows, Axis::Row)),
                cols: col_records(&ordered_bands(&structure.cols, Axis::Col)),
                ..TableResult::empty(image_bbox)
            };
        }

        let rows = grid_bands(&structure.rows, Axis::Row, image_bbox);
        let cols = grid_bands(&structure.cols, Axis::Col, image_bbox);
        let threshold = self.settings.span_threshold;

        let placed: Vec<PlacedCell> = structure
            .cells
            .iter()
            .map(|cell| {
                let bbox = cell.bbox();
                PlacedCell {
                    polygon: cell.polygon,
                    bbox,
                    confidence: cell.confidence,
                    row: place(&bbox, &rows, Axis::Row, threshold),
                    col: place(&bbox, &cols, Axis::Col, threshold),
                }
            })
            .collect();

        let absorbed_by = self.absorption(&placed);

        let mut cells = Vec::with_capacity(placed.len());
        let mut unmerged_cells = Vec::with_capacity(placed.len());
        for (idx, cell) in placed.iter().enumerate() {
            if absorbed_by[idx].is_some() {
                continue;
            }
            cells.push(merged_cell(cell));
            if !cell.is_spanning() {
                unmerged_cells.push(slot_cell(
                    cell.polygon,
                    cell.confidence,
                    cell,
                    cell.row.start,
                    cell.col.start,
                ));
                continue;
            }
            for r in cell.row.start..=cell.row.end() {
                for c in cell.col.start..=cell.col.end() {
                    let mut occupied = false;
                    for (member_idx, member) in placed.iter().enumerate() {
                        if absorbed_by[member_idx] == Some(idx)
                            && member.row.start == r
                            && member.col.start == c
                        {
                            unmerged_cells.push(slot_cell(
                                member.polygon,
                                member.confidence,
                                cell,
                                r,
                                c,
                            ));
                            occupied = true;
                        }
                    }
                    if !occupied {
                        let polygon = split_polygon(cell, &rows[r], &cols[c]);
                        unmerged_cells.push(slot_cell(polygon, cell.confidence, cell, r, c));
                    }
                }
            }
        }

        number_cells(&mut cells);
        number_cells(&mut unmerged_cells);

        debug!(
            raw = placed.len(),
            cells = cells.len(),
            unmerged = unmerged_cells.len(),
            rows = rows.len(),
            cols = cols.len(),
            "assembled table"
        );

        TableResult {
            cells,
            unmerged_cells,
            rows: row_records(&rows),
            cols: col_records(&cols),
            image_bbox,
        }
    }

    /// For every single-slot cell, the spanning cell that absorbs it, if any.
    fn absorption(&self, placed: &[PlacedCell]) -> Vec<Option<usize>> {
        placed
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                if cell.is_spanning() {
                    return None;
                }
                let mut best: Option<(usize, f64)> = None;
                for (host_idx, host) in placed.iter().enumerate() {
                    if host_idx == idx
                        || !host.is_spanning()
                        || !host.row.contains(cell.row.start)
                        || !host.col.contains(cell.col.start)
                    {
                        continue;
                    }
                    let pct = cell.bbox.covered_fraction(&host.bbox);
                    if pct >= self.settings.absorb_threshold
                        && pct > best.map_or(f64::NEG_INFINITY, |(_, p)| p)
                    {
                        best = Some((host_idx, pct));
                    }
                }
                best.map(|(host_idx, _)| host_idx)
            })
            .collect()
    }
}

fn merged_cell(cell: &PlacedCell) -> TableCell {
    TableCell {
        polygon: cell.polygon,
        confidence: cell.confidence,
        row_id: cell.row.start,
        col_id: Some(cell.col.start),
        colspan: cell.col.span,
        rowspan: Some(cell.row.span),
        within_row_id: 0,
        cell_id: 0,
        merge_up: false,
        merge_down: cell.row.span > 1,
    }
}

/// A span-1 cell standing for slot (`row`, `col`) of `host`'s span.
fn slot_cell(
    polygon: Polygon,
    confidence: Option<f64>,
    host: &PlacedCell,
    row: usize,
    col: usize,
) -> TableCell {
    TableCell {
        polygon,
        confidence,
        row_id: row,
        col_id: Some(col),
        colspan: 1,
        rowspan: Some(1),
        within_row_id: 0,
        cell_id: 0,
        merge_up: row > host.row.start,
        merge_down: row < host.row.end(),
    }
}

/// Geometry of `cell` restricted to one row/column slot of its span.
fn split_polygon(cell: &PlacedCell, row: &Band, col: &Band) -> Polygon {
    let b = cell.bbox;
    let (x0, x1) = if cell.col.span > 1 {
        clip_along((b.x0, b.x1), (col.bbox.x0, col.bbox.x1))
    } else {
        (b.x0, b.x1)
    };
    let (top, bottom) = if cell.row.span > 1 {
        clip_along((b.top, b.bottom), (row.bbox.top, row.bbox.bottom))
    } else {
        (b.top, b.bottom)
    };
    BBox::new(x0, top, x1, bottom).to_polygon()
}
