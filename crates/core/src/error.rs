//! Error types for tablegrid.

use thiserror::Error;

/// Primary error type for geometry, assembly and pipeline operations.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("shape violation: {0}")]
    ShapeViolation(String),

    #[error("parameter violation: {0}")]
    ParameterViolation(String),

    #[error("detector error: {0}")]
    Detector(String),

    #[error("{document} page {page}: {source}")]
    Page {
        document: String,
        page: usize,
        #[source]
        source: Box<GridError>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    /// Attach the page a failure belongs to, so the caller can retry just that unit.
    pub fn at_page(self, document: &str, page: usize) -> Self {
        match self {
            err @ GridError::Page { .. } => err,
            other => GridError::Page {
                document: document.to_string(),
                page,
                source: Box::new(other),
            },
        }
    }
}

/// Convenience Result type alias for GridError.
pub type Result<T> = std::result::Result<T, GridError>;
