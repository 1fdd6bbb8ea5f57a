//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::table::{AssemblerSettings, DEFAULT_LINE_IN_TABLE_PCT};

pub(crate) const DEFAULT_TABLE_LABEL: &str = "Table";
pub(crate) const DEFAULT_TABLE_BATCH_SIZE: usize = 8;

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Options for [`super::PageTablePipeline`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run text detection on every table crop even when page text lines exist.
    pub detect_boxes: bool,

    /// Inputs are already cropped tables: treat each whole image as one table.
    pub skip_table_detection: bool,

    /// Layout label that marks a table region.
    pub table_label: String,

    /// Fraction of a text line that must fall inside a table for the line to
    /// become one of its candidate cells.
    pub line_in_table_pct: f64,

    /// Number of tables handed to the structure model per call.
    pub table_batch_size: usize,

    /// Worker threads for per-page and per-table work. None means one per core.
    pub num_threads: Option<usize>,

    pub assembler: AssemblerSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detect_boxes: false,
            skip_table_detection: false,
            table_label: DEFAULT_TABLE_LABEL.to_string(),
            line_in_table_pct: DEFAULT_LINE_IN_TABLE_PCT,
            table_batch_size: DEFAULT_TABLE_BATCH_SIZE,
            num_threads: None,
            assembler: AssemblerSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn thread_count(&self) -> usize {
        self.num_threads.unwrap_or_else(default_thread_count)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.line_in_table_pct) {
            return Err(GridError::ParameterViolation(format!(
                "line_in_table_pct must lie in [0, 1], got {}",
                self.line_in_table_pct
            )));
        }
        if self.table_batch_size == 0 {
            return Err(GridError::InvalidArgument(
                "table_batch_size must be at least 1".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(GridError::InvalidArgument(
                "num_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.table_label, "Table");
        assert!(config.thread_count() >= 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PipelineConfig {
            line_in_table_pct: 1.5,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            table_batch_size: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            num_threads: Some(0),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
