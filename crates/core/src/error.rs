//! Error types for tablegrid.

use thiserror::Error;

/// A bounding box whose coordinates break the box invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("x_max ({x_max}) must be greater than x_min ({x_min})")]
    EmptyWidth { x_min: u32, x_max: u32 },

    #[error("y_max ({y_max}) must be greater than y_min ({y_min})")]
    EmptyHeight { y_min: u32, y_max: u32 },

    #[error("negative coordinate: {0}")]
    NegativeCoordinate(i64),

    #[error("coordinate {0} does not fit in 32 bits")]
    CoordinateOverflow(i64),
}

/// Violations of the table model invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("grid must have at least one row and one column, got {n_rows}x{n_cols}")]
    EmptyGrid { n_rows: usize, n_cols: usize },

    #[error("grid of {n_rows}x{n_cols} needs {expected} cells, got {got}")]
    GridShape {
        n_rows: usize,
        n_cols: usize,
        expected: usize,
        got: usize,
    },

    #[error("cell position ({row}, {col}) exceeds grid dimensions ({n_rows}x{n_cols})")]
    CellOutOfRange {
        row: usize,
        col: usize,
        n_rows: usize,
        n_cols: usize,
    },

    #[error("duplicate cell at ({row}, {col})")]
    DuplicateCell { row: usize, col: usize },

    #[error("source file cannot be empty")]
    EmptySourceFile,

    #[error("page image cannot be empty")]
    EmptyImage,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Failures of the two text sources consulted for a grid slot.
///
/// These never escape the text resolver; a failing slot gets empty text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("page has no text layer")]
    NoTextLayer,

    #[error("text layer error: {0}")]
    TextLayer(String),

    #[error("crop region {0:?} lies outside the page image")]
    EmptyCrop([u32; 4]),

    #[error("no page image to crop from")]
    NoPageImage,

    #[error("OCR is disabled")]
    OcrDisabled,

    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Errors raised while driving the external extraction stages.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("table detection failed: {0}")]
    Detection(String),

    #[error("structure recognition failed: {0}")]
    Recognition(String),

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Convenience Result type alias for ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;
