//! Row and column boundary lines from detection edges.

use crate::geometry::BoundingBox;
use crate::model::DetectedCell;

use super::clustering::cluster_coordinates;

/// Ascending boundary lines; `rows` partition y, `cols` partition x.
///
/// Both axes always hold at least two lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridBoundaries {
    rows: Vec<u32>,
    cols: Vec<u32>,
}

impl GridBoundaries {
    /// Accepts sorted, de-duplicated lines with at least two per axis.
    pub fn new(rows: Vec<u32>, cols: Vec<u32>) -> Option<Self> {
        let valid = |lines: &[u32]| lines.len() >= 2 && lines.windows(2).all(|w| w[0] < w[1]);
        (valid(&rows) && valid(&cols)).then_some(Self { rows, cols })
    }

    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    pub fn cols(&self) -> &[u32] {
        &self.cols
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len() - 1
    }

    /// Region of slot `(row, col)` clipped to `table_box`.
    pub fn slot_box(&self, row: usize, col: usize, table_box: &BoundingBox) -> BoundingBox {
        BoundingBox::clipped(
            self.cols[col],
            self.rows[row],
            self.cols[col + 1],
            self.rows[row + 1],
            table_box,
        )
    }
}

/// Cluster centers rounded to whole pixels, ascending and unique.
fn snap_lines(coords: &[f64], threshold: f64) -> Vec<u32> {
    let mut lines: Vec<u32> = cluster_coordinates(coords, threshold)
        .into_iter()
        // Centers are means of u32 edges, so they always fit.
        .map(|c| c.round_ties_even() as u32)
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Derive boundaries from the edges of every detection, whatever its label.
///
/// Returns `None` when either axis yields fewer than two distinct lines.
pub fn resolve_boundaries(cells: &[DetectedCell], threshold: f64) -> Option<GridBoundaries> {
    let mut y_edges = Vec::with_capacity(cells.len() * 2);
    let mut x_edges = Vec::with_capacity(cells.len() * 2);
    for cell in cells {
        y_edges.push(f64::from(cell.bbox.y_min()));
        y_edges.push(f64::from(cell.bbox.y_max()));
        x_edges.push(f64::from(cell.bbox.x_min()));
        x_edges.push(f64::from(cell.bbox.x_max()));
    }
    GridBoundaries::new(snap_lines(&y_edges, threshold), snap_lines(&x_edges, threshold))
}
