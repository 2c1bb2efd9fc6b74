//! One-dimensional coordinate clustering.
//!
//! Detection edges that describe the same grid line rarely agree to the
//! pixel. These functions collapse nearby coordinates into single line
//! positions, widening the merge distance when the input is sparse and
//! narrowing it when legitimately distinct lines sit close together.

use itertools::Itertools;
use ordered_float::OrderedFloat;

/// Mean gaps below this are treated as a dense set of real lines.
const DENSE_GAP: f64 = 5.0;

/// Sorted, de-duplicated finite values.
fn sorted_unique(coords: &[f64]) -> Vec<f64> {
    let mut xs: Vec<f64> = coords.iter().copied().filter(|v| v.is_finite()).collect();
    xs.sort_by_key(|v| OrderedFloat(*v));
    xs.dedup();
    xs
}

/// Merge distance adapted to the spacing of `sorted`.
pub(crate) fn adaptive_threshold(sorted: &[f64], base: f64) -> f64 {
    if sorted.len() < 3 {
        return base;
    }
    let gaps: Vec<f64> = sorted.iter().tuple_windows().map(|(a, b)| b - a).collect();
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let threshold = base.max(mean * 0.7);
    if mean < DENSE_GAP {
        threshold.min(mean * 2.0)
    } else {
        threshold
    }
}

/// Group sorted values; a value joins the current group while it lies
/// closer than `threshold` to the group's last member.
pub(crate) fn cluster_sorted(xs: &[f64], threshold: f64) -> Vec<Vec<f64>> {
    let mut groups: Vec<Vec<f64>> = Vec::new();
    for &x in xs {
        match groups.last_mut() {
            Some(current) if current.last().is_some_and(|last| x - last < threshold) => {
                current.push(x);
            }
            _ => groups.push(vec![x]),
        }
    }
    groups
}

/// Cluster coordinates into ascending representative centers.
///
/// Returns an empty vector only for empty (or all non-finite) input.
pub fn cluster_coordinates(coords: &[f64], base_threshold: f64) -> Vec<f64> {
    let xs = sorted_unique(coords);
    if xs.is_empty() {
        return Vec::new();
    }
    let threshold = adaptive_threshold(&xs, base_threshold);

    let centers: Vec<f64> = cluster_sorted(&xs, threshold)
        .iter()
        .map(|group| group.iter().sum::<f64>() / group.len() as f64)
        .collect();

    // Collapse centers closer than half the threshold to the previous one.
    let mut kept: Vec<f64> = Vec::with_capacity(centers.len());
    for center in centers {
        match kept.last() {
            Some(last) if center - last < threshold / 2.0 => {}
            _ => kept.push(center),
        }
    }
    kept
}
