//! Grid construction from structure detections.
//!
//! This module turns validated detections into a complete `TableGrid`:
//! boundaries from the edges of every detection, then slot ownership, then
//! one cell per slot with text from the resolver.

use tracing::{debug, warn};

use crate::geometry::BoundingBox;
use crate::model::{DEFAULT_CELL_TYPE, DetectedCell, GridCell, TableGrid};

use super::assignment::{SlotAssignment, assign_cells};
use super::boundaries::{GridBoundaries, resolve_boundaries};
use super::settings::GridSettings;
use super::text::{RegionOcr, TextLayer, TextResolver};
use super::validation::is_valid_table_structure;

/// Builds table grids with a fixed set of settings.
#[derive(Clone, Debug, Default)]
pub struct GridBuilder {
    settings: GridSettings,
}

impl GridBuilder {
    pub fn new(settings: GridSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Reconstruct the grid of one table.
    ///
    /// Returns `None` when there are no detections, when the detections do
    /// not look like a table, or when either axis resolves to fewer than two
    /// boundary lines.
    pub fn build(
        &self,
        cells: &[DetectedCell],
        table_box: BoundingBox,
        text_layer: &dyn TextLayer,
        ocr: &dyn RegionOcr,
    ) -> Option<TableGrid> {
        if cells.is_empty() {
            return None;
        }
        if !is_valid_table_structure(cells, &self.settings) {
            debug!(detections = cells.len(), "rejected table structure");
            return None;
        }

        let Some(boundaries) = resolve_boundaries(cells, self.settings.edge_cluster_threshold) else {
            debug!(detections = cells.len(), "fewer than two boundaries on an axis");
            return None;
        };
        debug!(
            n_rows = boundaries.n_rows(),
            n_cols = boundaries.n_cols(),
            "resolved grid boundaries"
        );

        let assignment = assign_cells(cells, &boundaries);
        let resolver = TextResolver::new(text_layer, ocr);
        let grid_cells = fill_grid(cells, &boundaries, &assignment, &table_box, &resolver);

        match TableGrid::new(grid_cells, boundaries.n_rows(), boundaries.n_cols(), table_box) {
            Ok(grid) => Some(grid),
            Err(err) => {
                warn!(%err, "discarding inconsistent grid");
                None
            }
        }
    }
}

/// Materialize every slot, filled or empty, in row-major order.
pub(crate) fn fill_grid(
    cells: &[DetectedCell],
    boundaries: &GridBoundaries,
    assignment: &SlotAssignment,
    table_box: &BoundingBox,
    resolver: &TextResolver<'_>,
) -> Vec<GridCell> {
    let mut out = Vec::with_capacity(boundaries.n_rows() * boundaries.n_cols());
    for row in 0..boundaries.n_rows() {
        for col in 0..boundaries.n_cols() {
            let bbox = boundaries.slot_box(row, col, table_box);
            let owner = assignment.owner(row, col).map(|idx| &cells[idx]);
            let confidence = owner.map_or(0.0, |cell| cell.confidence);
            let text = if bbox.area() > 0 {
                resolver.resolve_owned(&bbox, owner)
            } else {
                String::new()
            };
            out.push(GridCell {
                row,
                col,
                text,
                bbox,
                cell_type: DEFAULT_CELL_TYPE.to_string(),
                confidence,
            });
        }
    }
    out
}

/// Reconstruct a table grid with default settings.
pub fn build_grid(
    detected_cells: &[DetectedCell],
    table_box: BoundingBox,
    text_layer: &dyn TextLayer,
    ocr: &dyn RegionOcr,
) -> Option<TableGrid> {
    GridBuilder::default().build(detected_cells, table_box, text_layer, ocr)
}
