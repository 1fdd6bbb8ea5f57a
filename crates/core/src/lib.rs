//! tablegrid - region geometry and table structure recognition for page images.
//!
//! Detection models are external and plug in through the traits in
//! [`pipeline::detectors`]. This crate supplies the region types they
//! produce, the overlap geometry over them, and the assembly of raw row,
//! column and cell detections into a table grid.

pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod regions;
pub mod render;
pub mod results;
pub mod table;

pub use error::{GridError, Result};
pub use pipeline::{PageInput, PageTablePipeline, PipelineConfig, PipelineOutput};
pub use table::{AssemblerSettings, TableAssembler, TableStructure};
