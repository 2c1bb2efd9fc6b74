//! Grid reconstruction settings.

// Default constants
pub(crate) const DEFAULT_EDGE_CLUSTER_THRESHOLD: f64 = 10.0;
pub(crate) const DEFAULT_MIN_DETECTIONS: usize = 2;
pub(crate) const DEFAULT_MIN_DETECTIONS_UNLABELED: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct GridSettings {
    /// Base distance under which detection edges merge into one boundary.
    pub edge_cluster_threshold: f64,
    /// Fewer detections than this are never a table.
    pub min_detections: usize,
    /// Detection count that is accepted even without row/column labels.
    pub min_detections_unlabeled: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            edge_cluster_threshold: DEFAULT_EDGE_CLUSTER_THRESHOLD,
            min_detections: DEFAULT_MIN_DETECTIONS,
            min_detections_unlabeled: DEFAULT_MIN_DETECTIONS_UNLABELED,
        }
    }
}
