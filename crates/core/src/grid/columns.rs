//! Removal of spurious over-wide column detections.
//!
//! Structure detectors sometimes emit one "column" box that spans several
//! real columns and then competes with each of them for slot ownership.

use std::borrow::Cow;

use tracing::debug;

use crate::model::{DetectedCell, DetectionLabel};

/// Default width multiple above which the widest column is an artifact.
pub(crate) const DEFAULT_ARTIFACT_WIDTH_RATIO: f64 = 3.0;

/// Index of the artifact column among `columns`, if any.
///
/// The candidate is the widest column (the last one when several tie). It is
/// an artifact when it horizontally contains another column, or when it is
/// more than `width_ratio` times wider than the mean of the others.
pub(crate) fn find_column_artifact(columns: &[&DetectedCell], width_ratio: f64) -> Option<usize> {
    if columns.len() < 2 {
        return None;
    }
    let (widest_idx, widest) = columns
        .iter()
        .enumerate()
        .max_by_key(|(_, c)| c.bbox.width())?;

    let others_width: f64 = columns
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != widest_idx)
        .map(|(_, c)| f64::from(c.bbox.width()))
        .sum();
    let mean_width = others_width / (columns.len() - 1) as f64;

    let contains_other = columns
        .iter()
        .enumerate()
        .any(|(idx, c)| idx != widest_idx && widest.bbox.contains_x_span(&c.bbox));
    let too_wide = f64::from(widest.bbox.width()) > width_ratio * mean_width;

    if contains_other || too_wide {
        debug!(
            width = widest.bbox.width(),
            mean_width, contains_other, "dropping artifact column"
        );
        Some(widest_idx)
    } else {
        None
    }
}

/// Drop at most one artifact from a set of column detections.
pub fn filter_column_artifacts(mut columns: Vec<DetectedCell>, width_ratio: f64) -> Vec<DetectedCell> {
    let artifact = {
        let refs: Vec<&DetectedCell> = columns.iter().collect();
        find_column_artifact(&refs, width_ratio)
    };
    if let Some(idx) = artifact {
        columns.remove(idx);
    }
    columns
}

/// Apply the artifact filter to the column-labeled subset of `cells`,
/// keeping every other detection in input order.
pub(crate) fn without_column_artifact(
    cells: &[DetectedCell],
    width_ratio: f64,
) -> Cow<'_, [DetectedCell]> {
    let (positions, columns): (Vec<usize>, Vec<&DetectedCell>) = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.label == DetectionLabel::Column)
        .unzip();

    match find_column_artifact(&columns, width_ratio) {
        Some(idx) => {
            let drop = positions[idx];
            Cow::Owned(
                cells
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != drop)
                    .map(|(_, c)| c.clone())
                    .collect(),
            )
        }
        None => Cow::Borrowed(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn column(x0: u32, x1: u32) -> DetectedCell {
        DetectedCell::new(
            BoundingBox::new(x0, 0, x1, 100).unwrap(),
            DetectionLabel::Column,
            0.9,
        )
        .unwrap()
    }

    fn spans(cells: &[DetectedCell]) -> Vec<(u32, u32)> {
        cells.iter().map(|c| (c.bbox.x_min(), c.bbox.x_max())).collect()
    }

    #[test]
    fn containing_column_is_removed() {
        let out = filter_column_artifacts(vec![column(0, 100), column(0, 25), column(25, 50)], 3.0);
        assert_eq!(spans(&out), vec![(0, 25), (25, 50)]);
    }

    #[test]
    fn disproportionate_column_is_removed() {
        let out = filter_column_artifacts(vec![column(0, 10), column(20, 30), column(40, 200)], 3.0);
        assert_eq!(spans(&out), vec![(0, 10), (20, 30)]);
    }

    #[test]
    fn regular_columns_are_kept() {
        let input = vec![column(0, 30), column(30, 60), column(60, 100)];
        let out = filter_column_artifacts(input, 3.0);
        assert_eq!(spans(&out), vec![(0, 30), (30, 60), (60, 100)]);
    }

    #[test]
    fn lone_column_is_kept() {
        let out = filter_column_artifacts(vec![column(0, 500)], 3.0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn only_one_box_is_removed() {
        // Two identical wide boxes: the later one goes, the earlier stays.
        let out = filter_column_artifacts(
            vec![column(0, 100), column(0, 100), column(0, 20), column(20, 40)],
            3.0,
        );
        assert_eq!(spans(&out), vec![(0, 100), (0, 20), (20, 40)]);
    }

    #[test]
    fn other_labels_are_untouched() {
        let row = DetectedCell::new(BoundingBox::new(0, 0, 400, 20).unwrap(), DetectionLabel::Row, 0.9)
            .unwrap();
        let cells = vec![row, column(0, 100), column(0, 25), column(25, 50)];
        let out = without_column_artifact(&cells, 3.0);
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label, DetectionLabel::Row);

        let cells = vec![cells[0].clone(), column(0, 25), column(25, 50)];
        assert!(matches!(without_column_artifact(&cells, 3.0), Cow::Borrowed(_)));
    }
}
