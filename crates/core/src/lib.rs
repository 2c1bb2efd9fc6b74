//! tablegrid - table grid reconstruction from table-structure detections.

pub mod error;
pub mod extraction;
pub mod geometry;
pub mod grid;
pub mod model;

pub use error::{ExtractError, GeometryError, ModelError, Result, TextError};
pub use extraction::{
    ExtractionResponse, ExtractionSettings, PageSource, StructureRecognizer, TableDetector,
    TableExtractor,
};
pub use geometry::BoundingBox;
pub use grid::{GridBuilder, GridSettings, build_grid};
pub use model::{
    DetectedCell, DetectedTable, DetectionLabel, GridCell, PageImage, PageWord, TableGrid,
    TableMetadata,
};
