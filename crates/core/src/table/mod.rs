//! Table structure assembly.
//!
//! This module turns a table's raw cell, row and column detections into a
//! consistent grid with spans and merge flags, and prepares the candidate
//! cells and crops the structure model consumes.

mod assembler;
mod candidates;
mod types;

// Re-export public types
pub use types::{AssemblerSettings, CellCandidate, TableStructure};

pub(crate) use types::DEFAULT_LINE_IN_TABLE_PCT;

// Re-export public API
pub use assembler::TableAssembler;
pub use candidates::{crop_image, detected_cell_candidates, pixel_rect, table_cell_candidates};
