//! Ownership of grid slots by detections.

use crate::model::DetectedCell;

use super::boundaries::GridBoundaries;

/// The winning detection for every slot, row-major, as indices into the
/// detection slice the assignment was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotAssignment {
    owners: Vec<Option<usize>>,
    n_cols: usize,
}

impl SlotAssignment {
    pub fn owner(&self, row: usize, col: usize) -> Option<usize> {
        if col >= self.n_cols {
            return None;
        }
        self.owners.get(row * self.n_cols + col).copied().flatten()
    }

    /// Number of slots with an owner.
    pub fn filled(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }
}

/// Half-open interval overlap on one axis.
fn spans_overlap(lo: u32, hi: u32, line_lo: u32, line_hi: u32) -> bool {
    hi > line_lo && lo < line_hi
}

/// Assign each detection to every slot it overlaps.
///
/// A detection can own several slots. When detections compete for a slot
/// the strictly more confident one wins, so ties keep the earlier detection.
pub fn assign_cells(cells: &[DetectedCell], boundaries: &GridBoundaries) -> SlotAssignment {
    let rows = boundaries.rows();
    let cols = boundaries.cols();
    let n_cols = boundaries.n_cols();
    let mut owners: Vec<Option<usize>> = vec![None; boundaries.n_rows() * n_cols];

    for (idx, cell) in cells.iter().enumerate() {
        let b = &cell.bbox;
        for (r, row) in rows.windows(2).enumerate() {
            if !spans_overlap(b.y_min(), b.y_max(), row[0], row[1]) {
                continue;
            }
            for (c, col) in cols.windows(2).enumerate() {
                if !spans_overlap(b.x_min(), b.x_max(), col[0], col[1]) {
                    continue;
                }
                let slot = &mut owners[r * n_cols + c];
                match *slot {
                    Some(current) if cells[current].confidence >= cell.confidence => {}
                    _ => *slot = Some(idx),
                }
            }
        }
    }

    SlotAssignment { owners, n_cols }
}
