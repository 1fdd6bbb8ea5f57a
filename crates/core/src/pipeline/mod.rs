//! Batch orchestration from page images to assembled tables.
//!
//! Pages flow through three stages: table location and candidate cells per
//! page, batched structure recognition over every table, then grid assembly
//! per table. Detection models plug in through the traits in [`detectors`].

mod config;
pub mod detectors;
mod index;
mod record;
mod runner;

pub use config::PipelineConfig;
pub use detectors::{
    DetectionTarget, LayoutDetector, LayoutRequest, PageKey, TableInput, TableKey,
    TableStructureModel, TextDetectionRequest, TextDetector,
};
pub use index::{TableIndex, TableLocation, page_numbers};
pub use record::{PipelineOutput, TableOutcome, TablePredictions, TableRecord};
pub use runner::{PageInput, PageTablePipeline};
