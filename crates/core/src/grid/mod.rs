//! Table grid reconstruction.
//!
//! This module turns an unordered, noisy set of structure detections into a
//! rectangular grid: boundary lines from the clustered edges of every
//! detection, slot ownership by interval overlap, and per-slot text from the
//! page. Column artifact filtering is a separate stage applied to recognizer
//! output before the grid is built.

mod assignment;
mod boundaries;
mod builder;
mod clustering;
mod columns;
mod settings;
mod text;
mod validation;

pub use assignment::{SlotAssignment, assign_cells};
pub use boundaries::{GridBoundaries, resolve_boundaries};
pub use builder::{GridBuilder, build_grid};
pub use clustering::cluster_coordinates;
pub use columns::filter_column_artifacts;
pub(crate) use columns::{DEFAULT_ARTIFACT_WIDTH_RATIO, without_column_artifact};
pub use settings::GridSettings;
pub use text::{CropOcr, NoOcr, OcrEngine, PageOcr, RegionOcr, TextLayer, TextResolver};
pub use validation::{calculate_grid_confidence, is_valid_table_structure};
