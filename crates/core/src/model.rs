//! Table entities: detections in, grids out.

use image::RgbImage;
use indexmap::IndexMap;

use crate::error::ModelError;
use crate::geometry::BoundingBox;

/// Detections at or above this confidence are considered reliable.
pub const HIGH_CONFIDENCE: f64 = 0.6;

/// Cell type given to every materialized grid slot.
pub const DEFAULT_CELL_TYPE: &str = "table cell";

fn check_confidence(confidence: f64) -> Result<f64, ModelError> {
    if (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(ModelError::ConfidenceOutOfRange(confidence))
    }
}

/// Label attached to a structure detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectionLabel {
    Row,
    Column,
    ColumnHeader,
    ProjectedRowHeader,
    SpanningCell,
    Other,
}

impl DetectionLabel {
    /// Map a detector class name onto a label. Unknown names become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "table row" => DetectionLabel::Row,
            "table column" => DetectionLabel::Column,
            "table column header" => DetectionLabel::ColumnHeader,
            "table projected row header" => DetectionLabel::ProjectedRowHeader,
            "table spanning cell" => DetectionLabel::SpanningCell,
            _ => DetectionLabel::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionLabel::Row => "table row",
            DetectionLabel::Column => "table column",
            DetectionLabel::ColumnHeader => "table column header",
            DetectionLabel::ProjectedRowHeader => "table projected row header",
            DetectionLabel::SpanningCell => "table spanning cell",
            DetectionLabel::Other => "other",
        }
    }

    /// Whether the label names a row or a column.
    pub fn is_structural(&self) -> bool {
        match self {
            DetectionLabel::Row
            | DetectionLabel::Column
            | DetectionLabel::ColumnHeader
            | DetectionLabel::ProjectedRowHeader => true,
            DetectionLabel::SpanningCell | DetectionLabel::Other => false,
        }
    }
}

/// A raw structure detection.
#[derive(Clone, Debug)]
pub struct DetectedCell {
    pub bbox: BoundingBox,
    pub label: DetectionLabel,
    pub confidence: f64,
    /// Pixels under the detection, top-left aligned with `bbox`. OCR reads
    /// the part under a slot this detection owns instead of the page.
    pub image_crop: Option<RgbImage>,
}

impl DetectedCell {
    pub fn new(bbox: BoundingBox, label: DetectionLabel, confidence: f64) -> Result<Self, ModelError> {
        Ok(Self {
            bbox,
            label,
            confidence: check_confidence(confidence)?,
            image_crop: None,
        })
    }

    pub fn with_image_crop(mut self, crop: RgbImage) -> Self {
        self.image_crop = Some(crop);
        self
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE
    }
}

/// One `(row, col)` slot of a reconstructed grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub bbox: BoundingBox,
    pub cell_type: String,
    pub confidence: f64,
}

impl GridCell {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_header(&self) -> bool {
        self.row == 0 || self.cell_type.to_lowercase().contains("header")
    }
}

/// A complete rectangular grid: exactly one cell per slot, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct TableGrid {
    cells: Vec<GridCell>,
    n_rows: usize,
    n_cols: usize,
    table_box: BoundingBox,
}

impl TableGrid {
    /// Assemble a grid, sorting cells row-major and checking that every slot
    /// is present exactly once.
    pub fn new(
        mut cells: Vec<GridCell>,
        n_rows: usize,
        n_cols: usize,
        table_box: BoundingBox,
    ) -> Result<Self, ModelError> {
        if n_rows == 0 || n_cols == 0 {
            return Err(ModelError::EmptyGrid { n_rows, n_cols });
        }
        let expected = n_rows * n_cols;
        if cells.len() != expected {
            return Err(ModelError::GridShape {
                n_rows,
                n_cols,
                expected,
                got: cells.len(),
            });
        }
        let mut seen = vec![false; expected];
        for cell in &cells {
            if cell.row >= n_rows || cell.col >= n_cols {
                return Err(ModelError::CellOutOfRange {
                    row: cell.row,
                    col: cell.col,
                    n_rows,
                    n_cols,
                });
            }
            let slot = cell.row * n_cols + cell.col;
            if seen[slot] {
                return Err(ModelError::DuplicateCell {
                    row: cell.row,
                    col: cell.col,
                });
            }
            seen[slot] = true;
        }
        cells.sort_by_key(|c| (c.row, c.col));
        Ok(Self {
            cells,
            n_rows,
            n_cols,
            table_box,
        })
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn table_box(&self) -> BoundingBox {
        self.table_box
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        if row >= self.n_rows || col >= self.n_cols {
            return None;
        }
        self.cells.get(row * self.n_cols + col)
    }

    /// Cells of one row, left to right.
    pub fn row(&self, row: usize) -> Option<&[GridCell]> {
        if row >= self.n_rows {
            return None;
        }
        let start = row * self.n_cols;
        Some(&self.cells[start..start + self.n_cols])
    }

    /// Trimmed text of the first row.
    pub fn headers(&self) -> Vec<String> {
        self.row(0)
            .map(|cells| cells.iter().map(|c| c.text.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Every row after the first as a header-keyed map, in column order.
    ///
    /// Columns without header text are keyed `Column{n}` (1-based). When two
    /// headers repeat, the rightmost column wins the key.
    pub fn to_rows(&self) -> Vec<IndexMap<String, String>> {
        let headers: Vec<String> = self
            .headers()
            .into_iter()
            .enumerate()
            .map(|(idx, h)| if h.is_empty() { format!("Column{}", idx + 1) } else { h })
            .collect();
        (1..self.n_rows)
            .filter_map(|r| self.row(r))
            .map(|cells| {
                headers
                    .iter()
                    .zip(cells)
                    .map(|(h, c)| (h.clone(), c.text.trim().to_string()))
                    .collect()
            })
            .collect()
    }

    /// Mean confidence over all cells.
    pub fn confidence(&self) -> f64 {
        crate::grid::calculate_grid_confidence(self)
    }
}

/// Summary of a detected table, as reported to callers.
#[derive(Clone, Debug, PartialEq)]
pub struct TableMetadata {
    pub detection_score: f64,
    pub page_number: usize,
    pub source_file: String,
    pub bbox: [u32; 4],
    pub n_rows: usize,
    pub n_cols: usize,
}

/// A table found on a page, optionally with its reconstructed grid.
#[derive(Clone, Debug)]
pub struct DetectedTable {
    pub detection_box: BoundingBox,
    pub confidence: f64,
    pub page_number: usize,
    pub source_file: String,
    pub grid: Option<TableGrid>,
}

impl DetectedTable {
    pub fn new(
        detection_box: BoundingBox,
        confidence: f64,
        page_number: usize,
        source_file: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let source_file = source_file.into();
        if source_file.trim().is_empty() {
            return Err(ModelError::EmptySourceFile);
        }
        Ok(Self {
            detection_box,
            confidence: check_confidence(confidence)?,
            page_number,
            source_file,
            grid: None,
        })
    }

    pub fn is_structured(&self) -> bool {
        self.grid.is_some()
    }

    pub fn metadata(&self) -> TableMetadata {
        TableMetadata {
            detection_score: self.confidence,
            page_number: self.page_number,
            source_file: self.source_file.clone(),
            bbox: self.detection_box.to_array(),
            n_rows: self.grid.as_ref().map_or(0, TableGrid::n_rows),
            n_cols: self.grid.as_ref().map_or(0, TableGrid::n_cols),
        }
    }
}

/// A word from the page's native text layer, in image-pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PageWord {
    pub bbox: BoundingBox,
    pub text: String,
}

impl PageWord {
    pub fn new(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }
}

/// A rendered page together with its optional text layer.
#[derive(Clone, Debug)]
pub struct PageImage {
    pub page_number: usize,
    pub source_file: String,
    pub image: RgbImage,
    pub words: Option<Vec<PageWord>>,
}

impl PageImage {
    pub fn new(
        page_number: usize,
        source_file: impl Into<String>,
        image: RgbImage,
    ) -> Result<Self, ModelError> {
        let source_file = source_file.into();
        if source_file.trim().is_empty() {
            return Err(ModelError::EmptySourceFile);
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(ModelError::EmptyImage);
        }
        Ok(Self {
            page_number,
            source_file,
            image,
            words: None,
        })
    }

    pub fn with_words(mut self, words: Vec<PageWord>) -> Self {
        self.words = Some(words);
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x0: u32, y0: u32, x1: u32, y1: u32) -> BoundingBox {
        BoundingBox::new(x0, y0, x1, y1).unwrap()
    }

    fn cell(row: usize, col: usize, text: &str) -> GridCell {
        GridCell {
            row,
            col,
            text: text.to_string(),
            bbox: bbox(0, 0, 10, 10),
            cell_type: DEFAULT_CELL_TYPE.to_string(),
            confidence: 0.5,
        }
    }

    #[test]
    fn labels_round_trip_through_detector_names() {
        for label in [
            DetectionLabel::Row,
            DetectionLabel::Column,
            DetectionLabel::ColumnHeader,
            DetectionLabel::ProjectedRowHeader,
            DetectionLabel::SpanningCell,
        ] {
            assert_eq!(DetectionLabel::from_label(label.as_str()), label);
        }
        assert_eq!(DetectionLabel::from_label("Table Row "), DetectionLabel::Row);
        assert_eq!(DetectionLabel::from_label("table"), DetectionLabel::Other);
        assert!(!DetectionLabel::SpanningCell.is_structural());
        assert!(DetectionLabel::ProjectedRowHeader.is_structural());
    }

    #[test]
    fn detected_cell_rejects_bad_confidence() {
        let err = DetectedCell::new(bbox(0, 0, 5, 5), DetectionLabel::Row, 1.5).unwrap_err();
        assert_eq!(err, ModelError::ConfidenceOutOfRange(1.5));
        let ok = DetectedCell::new(bbox(0, 0, 5, 5), DetectionLabel::Row, 0.6).unwrap();
        assert!(ok.is_high_confidence());
    }

    #[test]
    fn grid_rejects_missing_and_duplicate_slots() {
        let table = bbox(0, 0, 20, 20);
        let err = TableGrid::new(vec![cell(0, 0, "a")], 1, 2, table).unwrap_err();
        assert!(matches!(err, ModelError::GridShape { expected: 2, got: 1, .. }));

        let err = TableGrid::new(vec![cell(0, 0, "a"), cell(0, 0, "b")], 1, 2, table).unwrap_err();
        assert_eq!(err, ModelError::DuplicateCell { row: 0, col: 0 });

        let err = TableGrid::new(vec![cell(0, 0, "a"), cell(0, 2, "b")], 1, 2, table).unwrap_err();
        assert!(matches!(err, ModelError::CellOutOfRange { col: 2, .. }));
    }

    #[test]
    fn grid_sorts_cells_row_major() {
        let grid = TableGrid::new(
            vec![cell(1, 1, "d"), cell(0, 1, "b"), cell(1, 0, "c"), cell(0, 0, "a")],
            2,
            2,
            bbox(0, 0, 20, 20),
        )
        .unwrap();
        let texts: Vec<&str> = grid.cells().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        assert_eq!(grid.cell(1, 0).map(|c| c.text.as_str()), Some("c"));
        assert!(grid.cell(2, 0).is_none());
    }

    #[test]
    fn rows_are_keyed_by_header_text() {
        let grid = TableGrid::new(
            vec![
                cell(0, 0, " Name "),
                cell(0, 1, ""),
                cell(1, 0, "Ada"),
                cell(1, 1, " 36 "),
                cell(2, 0, "Alan"),
                cell(2, 1, "41"),
            ],
            3,
            2,
            bbox(0, 0, 20, 30),
        )
        .unwrap();
        assert_eq!(grid.headers(), vec!["Name".to_string(), String::new()]);
        let rows = grid.to_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name").map(String::as_str), Some("Ada"));
        assert_eq!(rows[0].get("Column2").map(String::as_str), Some("36"));
        let keys: Vec<&String> = rows[1].keys().collect();
        assert_eq!(keys, vec!["Name", "Column2"]);
    }

    #[test]
    fn header_cells() {
        let mut c = cell(1, 0, "  ");
        assert!(c.is_empty());
        assert!(!c.is_header());
        c.cell_type = "Column Header".to_string();
        assert!(c.is_header());
        assert!(cell(0, 3, "x").is_header());
    }

    #[test]
    fn table_metadata_without_grid() {
        let table = DetectedTable::new(bbox(5, 5, 50, 60), 0.97, 2, "doc.pdf").unwrap();
        assert!(!table.is_structured());
        let meta = table.metadata();
        assert_eq!(meta.bbox, [5, 5, 50, 60]);
        assert_eq!((meta.n_rows, meta.n_cols), (0, 0));
        assert_eq!(meta.page_number, 2);
        assert!(matches!(
            DetectedTable::new(bbox(5, 5, 50, 60), 0.97, 2, "  "),
            Err(ModelError::EmptySourceFile)
        ));
    }

    #[test]
    fn page_image_requires_pixels() {
        assert!(matches!(
            PageImage::new(0, "doc.pdf", RgbImage::new(0, 10)),
            Err(ModelError::EmptyImage)
        ));
        let page = PageImage::new(0, "doc.pdf", RgbImage::new(40, 30)).unwrap();
        assert_eq!((page.width(), page.height()), (40, 30));
    }
}
