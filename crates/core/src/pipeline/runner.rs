//! Page-to-table recognition pipeline.

use std::sync::Arc;

use image::RgbImage;
use itertools::izip;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::config::PipelineConfig;
use super::detectors::{
    DetectionTarget, LayoutDetector, LayoutRequest, PageKey, TableInput, TableKey,
    TableStructureModel, TextDetectionRequest, TextDetector,
};
use super::index::{TableIndex, page_numbers};
use super::record::{PipelineOutput, TableOutcome};
use crate::error::{GridError, Result};
use crate::geometry::{BBox, Region, Size};
use crate::results::OcrResult;
use crate::table::{
    TableAssembler, TableStructure, crop_image, detected_cell_candidates, table_cell_candidates,
};

/// One input image. Consecutive inputs with the same `name` are pages of one document.
#[derive(Clone, Debug)]
pub struct PageInput {
    pub name: String,
    pub image: RgbImage,
    /// Recognized text lines for the page, if already available.
    pub text_lines: Option<OcrResult>,
}

impl PageInput {
    pub fn new(name: impl Into<String>, image: RgbImage) -> Self {
        Self {
            name: name.into(),
            image,
            text_lines: None,
        }
    }

    pub fn with_text_lines(mut self, text_lines: OcrResult) -> Self {
        self.text_lines = Some(text_lines);
        self
    }
}

/// Locates tables on pages, runs the structure model over them and
/// assembles each into a grid.
pub struct PageTablePipeline {
    text_detector: Arc<dyn TextDetector>,
    layout_detector: Arc<dyn LayoutDetector>,
    structure_model: Arc<dyn TableStructureModel>,
    config: PipelineConfig,
    assembler: TableAssembler,
}

impl PageTablePipeline {
    pub fn new(
        text_detector: Arc<dyn TextDetector>,
        layout_detector: Arc<dyn LayoutDetector>,
        structure_model: Arc<dyn TableStructureModel>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let assembler = TableAssembler::new(config.assembler.clone());
        Ok(Self {
            text_detector,
            layout_detector,
            structure_model,
            config,
            assembler,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every page through the pipeline.
    ///
    /// A failure is reported for the page it occurred on; no partial output
    /// is returned.
    pub fn run(&self, pages: &[PageInput]) -> Result<PipelineOutput> {
        let numbers = page_numbers(pages.iter().map(|p| p.name.as_str()));
        let keys: Vec<PageKey> = pages
            .iter()
            .zip(&numbers)
            .map(|(page, n)| PageKey::new(page.name.clone(), n + 1))
            .collect();

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.thread_count())
            .build()
            .map_err(|e| GridError::InvalidArgument(e.to_string()))?;

        let mut prepared: Vec<(usize, Result<Vec<TableInput>>)> = pool.install(|| {
            pages
                .par_iter()
                .zip(keys.par_iter())
                .enumerate()
                .map(|(pos, (page, key))| (pos, self.prepare_page(key, page)))
                .collect()
        });
        prepared.sort_by_key(|(pos, _)| *pos);

        let mut counts = Vec::with_capacity(pages.len());
        let mut inputs = Vec::new();
        for (pos, result) in prepared {
            let key = &keys[pos];
            let tables = result.map_err(|e| e.at_page(&key.document, key.page))?;
            counts.push(tables.len());
            inputs.extend(tables);
        }
        let index = TableIndex::new(counts);
        info!(pages = pages.len(), tables = index.total(), "located tables");

        let structures = self.recognize(&inputs)?;

        let assembled: Vec<TableOutcome> = pool.install(|| {
            inputs
                .into_par_iter()
                .zip(structures.into_par_iter())
                .map(|(input, structure)| {
                    let frame = BBox::from_size(Size::of_image(&input.image));
                    let result = self.assembler.assemble(&structure, frame);
                    debug!(
                        document = %input.key.document,
                        page = input.key.page,
                        table_idx = input.key.table_idx,
                        cells = result.cells.len(),
                        rows = result.rows.len(),
                        cols = result.cols.len(),
                        "assembled table"
                    );
                    TableOutcome {
                        key: input.key,
                        bbox: input.bbox,
                        image: input.image,
                        result,
                    }
                })
                .collect()
        });

        let tables = assembled
            .into_iter()
            .zip(index.iter())
            .map(|(mut outcome, loc)| {
                outcome.key = keys[loc.page_pos].table(loc.table_idx);
                outcome
            })
            .collect();
        Ok(PipelineOutput { tables })
    }

    /// Find the page's tables and derive each one's crop and candidate cells.
    fn prepare_page(&self, key: &PageKey, page: &PageInput) -> Result<Vec<TableInput>> {
        let size = Size::of_image(&page.image);
        let table_boxes = if self.config.skip_table_detection {
            vec![BBox::from_size(size)]
        } else {
            self.locate_tables(key, page, size)?
        };
        if table_boxes.is_empty() {
            debug!(document = %key.document, page = key.page, "no tables on page");
            return Ok(Vec::new());
        }

        let crops: Vec<RgbImage> = table_boxes
            .iter()
            .map(|bbox| crop_image(&page.image, bbox))
            .collect();
        let table_keys: Vec<_> = (0..table_boxes.len()).map(|i| key.table(i)).collect();

        let cells = match (&page.text_lines, self.config.detect_boxes) {
            (Some(lines), false) => {
                table_cell_candidates(&table_boxes, lines, size, self.config.line_in_table_pct)?
            }
            _ => {
                let targets: Vec<DetectionTarget> = table_keys
                    .iter()
                    .cloned()
                    .map(DetectionTarget::Table)
                    .collect();
                let requests: Vec<TextDetectionRequest<'_>> = targets
                    .iter()
                    .zip(&crops)
                    .map(|(target, image)| TextDetectionRequest { target, image })
                    .collect();
                let detections = self.text_detector.detect_text(&requests)?;
                expect_count("text detector", requests.len(), detections.len())?;
                detections.iter().map(detected_cell_candidates).collect()
            }
        };

        Ok(izip!(table_keys, table_boxes, crops, cells)
            .map(|(key, bbox, image, cells)| TableInput {
                key,
                bbox,
                image,
                cells,
            })
            .collect())
    }

    /// Table boxes from layout detection, in the page image's frame.
    fn locate_tables(&self, key: &PageKey, page: &PageInput, size: Size) -> Result<Vec<BBox>> {
        let target = DetectionTarget::Page(key.clone());
        let lines = single(
            "text detector",
            self.text_detector.detect_text(&[TextDetectionRequest {
                target: &target,
                image: &page.image,
            }])?,
        )?;

        let layout = single(
            "layout detector",
            self.layout_detector.detect_layout(&[LayoutRequest {
                page: key,
                image: &page.image,
                lines: &lines,
            }])?,
        )?;

        let from = layout.image_bbox.size();
        let bounds = BBox::from_size(size);
        Ok(layout
            .boxes_labeled(&self.config.table_label)
            .map(|b| {
                let polygon = if from == size {
                    b.polygon()
                } else {
                    b.polygon().rescale(from, size)
                };
                polygon.fit_to_bounds(&bounds).bbox()
            })
            .filter(|bbox| bbox.area() > 0.0)
            .collect())
    }

    /// Run the structure model in batches, keeping results in flat table order.
    ///
    /// A batch can hold tables from several pages. When such a batch fails it
    /// is re-run one page at a time so the error names the page at fault.
    fn recognize(&self, inputs: &[TableInput]) -> Result<Vec<TableStructure>> {
        let mut out = Vec::with_capacity(inputs.len());
        for (batch_idx, batch) in inputs.chunks(self.config.table_batch_size).enumerate() {
            let structures = match self.recognize_batch(batch) {
                Ok(structures) => structures,
                Err(err) => {
                    let pages = batch.chunk_by(|a, b| same_page(&a.key, &b.key)).count();
                    if pages < 2 {
                        return Err(at_table_page(err, &batch[0].key));
                    }
                    warn!(
                        batch = batch_idx,
                        pages,
                        error = %err,
                        "table batch failed, retrying per page"
                    );
                    self.recognize_per_page(batch)?
                }
            };
            debug!(batch = batch_idx, tables = batch.len(), "recognized table batch");
            out.extend(structures);
        }
        Ok(out)
    }

    fn recognize_per_page(&self, batch: &[TableInput]) -> Result<Vec<TableStructure>> {
        let mut out = Vec::with_capacity(batch.len());
        for group in batch.chunk_by(|a, b| same_page(&a.key, &b.key)) {
            let structures = self
                .recognize_batch(group)
                .map_err(|err| at_table_page(err, &group[0].key))?;
            out.extend(structures);
        }
        Ok(out)
    }

    fn recognize_batch(&self, batch: &[TableInput]) -> Result<Vec<TableStructure>> {
        let structures = self.structure_model.recognize(batch)?;
        expect_count("table structure model", batch.len(), structures.len())?;
        Ok(structures)
    }
}

fn same_page(a: &TableKey, b: &TableKey) -> bool {
    a.page == b.page && a.document == b.document
}

fn at_table_page(err: GridError, key: &TableKey) -> GridError {
    err.at_page(&key.document, key.page)
}

fn count_mismatch(source: &str, expected: usize, got: usize) -> GridError {
    GridError::Detector(format!("{source} returned {got} results for {expected} inputs"))
}

fn expect_count(source: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(count_mismatch(source, expected, got));
    }
    Ok(())
}

/// The only result of a one-request detector call.
fn single<T>(source: &str, results: Vec<T>) -> Result<T> {
    let [only] = <[T; 1]>::try_from(results)
        .map_err(|results: Vec<T>| count_mismatch(source, 1, results.len()))?;
    Ok(only)
}
