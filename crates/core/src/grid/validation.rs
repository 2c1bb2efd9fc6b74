//! Plausibility checks on detection sets and finished grids.

use crate::model::{DetectedCell, TableGrid};

use super::settings::GridSettings;

/// Cheap gate run before boundary resolution.
///
/// Passing does not guarantee a grid; boundary resolution can still fail.
pub fn is_valid_table_structure(cells: &[DetectedCell], settings: &GridSettings) -> bool {
    if cells.len() < settings.min_detections {
        return false;
    }
    let has_structure = cells.iter().any(|c| c.label.is_structural());
    has_structure || cells.len() >= settings.min_detections_unlabeled
}

/// Mean cell confidence of a grid, 0.0 for a grid without cells.
pub fn calculate_grid_confidence(grid: &TableGrid) -> f64 {
    let cells = grid.cells();
    if cells.is_empty() {
        return 0.0;
    }
    cells.iter().map(|c| c.confidence).sum::<f64>() / cells.len() as f64
}
