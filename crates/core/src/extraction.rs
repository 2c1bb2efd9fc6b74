//! Document-level table extraction.
//!
//! Drives the external stages (page rendering, table detection, structure
//! recognition, OCR) and runs grid reconstruction for every detected table.
//! Pages and the tables on a page are independent, so both fan out over a
//! rayon pool; results are merged back in page order.

use std::borrow::Cow;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ExtractError, Result};
use crate::geometry::BoundingBox;
use crate::grid::{
    DEFAULT_ARTIFACT_WIDTH_RATIO, GridBuilder, GridSettings, NoOcr, OcrEngine, PageOcr,
    without_column_artifact,
};
use crate::model::{DetectedCell, DetectedTable, PageImage, TableGrid, TableMetadata};

/// Renders pages of a source document.
pub trait PageSource: Send + Sync {
    fn page_count(&self, source_file: &str) -> Result<usize>;
    fn page_image(&self, source_file: &str, page_number: usize) -> Result<PageImage>;
}

/// Finds table regions on a rendered page.
pub trait TableDetector: Send + Sync {
    fn detect_tables(&self, page: &PageImage) -> Result<Vec<DetectedTable>>;
}

/// Detects rows, columns, headers and spanning cells inside a table region.
pub trait StructureRecognizer: Send + Sync {
    fn recognize_structure(&self, page: &PageImage, table_box: BoundingBox) -> Result<Vec<DetectedCell>>;
}

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionSettings {
    pub grid: GridSettings,
    /// Process pages and tables on a rayon pool.
    pub parallel: bool,
    /// Pool size. None uses the available parallelism.
    pub threads: Option<usize>,
    /// Drop at most one over-wide column from each recognizer result before
    /// the grid is built.
    pub filter_column_artifacts: bool,
    /// A column wider than this multiple of the mean of the others is an artifact.
    pub artifact_width_ratio: f64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            parallel: true,
            threads: None,
            filter_column_artifacts: true,
            artifact_width_ratio: DEFAULT_ARTIFACT_WIDTH_RATIO,
        }
    }
}

/// Structured tables found in a document, or the reason extraction failed.
#[derive(Clone, Debug)]
pub struct ExtractionResponse {
    pub tables: Vec<DetectedTable>,
    pub source_file: String,
    pub error: Option<String>,
}

impl ExtractionResponse {
    pub fn new(tables: Vec<DetectedTable>, source_file: impl Into<String>) -> Self {
        Self {
            tables,
            source_file: source_file.into(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            tables: Vec::new(),
            source_file: source_file.into(),
            error: Some(error.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> Vec<TableMetadata> {
        self.tables.iter().map(DetectedTable::metadata).collect()
    }

    pub fn grids(&self) -> impl Iterator<Item = &TableGrid> {
        self.tables.iter().filter_map(|t| t.grid.as_ref())
    }
}

/// Extracts structured tables from documents.
pub struct TableExtractor {
    pages: Box<dyn PageSource>,
    detector: Box<dyn TableDetector>,
    recognizer: Box<dyn StructureRecognizer>,
    ocr: Option<Box<dyn OcrEngine>>,
    builder: GridBuilder,
    settings: ExtractionSettings,
}

impl TableExtractor {
    pub fn new(
        pages: Box<dyn PageSource>,
        detector: Box<dyn TableDetector>,
        recognizer: Box<dyn StructureRecognizer>,
    ) -> Self {
        Self {
            pages,
            detector,
            recognizer,
            ocr: None,
            builder: GridBuilder::default(),
            settings: ExtractionSettings::default(),
        }
    }

    /// Enable OCR for slots the text layer leaves empty.
    pub fn with_ocr(mut self, ocr: Box<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_settings(mut self, settings: ExtractionSettings) -> Self {
        self.builder = GridBuilder::new(settings.grid.clone());
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Extract tables from one page, or from every page when `page_number`
    /// is None.
    ///
    /// A failing single page fails the response. When extracting the whole
    /// document, failing pages and tables are logged and skipped.
    pub fn extract_tables(&self, source_file: &str, page_number: Option<usize>) -> ExtractionResponse {
        let result = match page_number {
            Some(page) => self.extract_single_page(source_file, page),
            None => self.extract_all_pages(source_file),
        };
        match result {
            Ok(tables) => {
                info!(source_file, tables = tables.len(), "table extraction finished");
                ExtractionResponse::new(tables, source_file)
            }
            Err(err) => {
                warn!(source_file, %err, "table extraction failed");
                ExtractionResponse::failed(err.to_string(), source_file)
            }
        }
    }

    fn extract_single_page(&self, source_file: &str, page: usize) -> Result<Vec<DetectedTable>> {
        let count = self.pages.page_count(source_file)?;
        if page >= count {
            return Err(ExtractError::PageOutOfRange { page, count });
        }
        self.run(|| self.extract_page(source_file, page))
    }

    fn extract_all_pages(&self, source_file: &str) -> Result<Vec<DetectedTable>> {
        let count = self.pages.page_count(source_file)?;
        let extract = |page: usize| match self.extract_page(source_file, page) {
            Ok(tables) => (page, tables),
            Err(err) => {
                warn!(source_file, page, %err, "skipping page");
                (page, Vec::new())
            }
        };

        let mut results: Vec<(usize, Vec<DetectedTable>)> = if self.settings.parallel {
            self.run(|| Ok((0..count).into_par_iter().map(extract).collect()))?
        } else {
            (0..count).map(extract).collect()
        };

        results.sort_by_key(|(idx, _)| *idx);
        Ok(results.into_iter().flat_map(|(_, tables)| tables).collect())
    }

    /// Run `op` inside a dedicated pool when parallel extraction is enabled.
    fn run<T: Send>(&self, op: impl FnOnce() -> Result<T> + Send) -> Result<T> {
        if !self.settings.parallel {
            return op();
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.threads.unwrap_or_else(default_thread_count))
            .build()
            .map_err(|e| ExtractError::ThreadPool(e.to_string()))?;
        pool.install(op)
    }

    /// Structured tables of one page. Tables whose grid cannot be built are
    /// dropped.
    pub fn extract_page(&self, source_file: &str, page_number: usize) -> Result<Vec<DetectedTable>> {
        let page = self.pages.page_image(source_file, page_number)?;
        let detected = self.detector.detect_tables(&page)?;
        debug!(page = page_number, tables = detected.len(), "detected tables");

        let process = |(idx, table): (usize, DetectedTable)| match self.structure_table(&page, table) {
            Ok(table) => (idx, table),
            Err(err) => {
                warn!(page = page_number, table = idx, %err, "skipping table");
                (idx, None)
            }
        };

        let mut results: Vec<(usize, Option<DetectedTable>)> = if self.settings.parallel {
            detected.into_par_iter().enumerate().map(process).collect()
        } else {
            detected.into_iter().enumerate().map(process).collect()
        };

        results.sort_by_key(|(idx, _)| *idx);
        Ok(results.into_iter().filter_map(|(_, table)| table).collect())
    }

    /// Recognize the structure of one detected table and attach its grid.
    pub fn structure_table(&self, page: &PageImage, mut table: DetectedTable) -> Result<Option<DetectedTable>> {
        let recognized = self.recognizer.recognize_structure(page, table.detection_box)?;
        let cells = if self.settings.filter_column_artifacts {
            without_column_artifact(&recognized, self.settings.artifact_width_ratio)
        } else {
            Cow::Borrowed(recognized.as_slice())
        };
        let grid = match &self.ocr {
            Some(engine) => {
                let ocr = PageOcr::new(&page.image, engine.as_ref());
                self.builder.build(&cells, table.detection_box, page, &ocr)
            }
            None => self.builder.build(&cells, table.detection_box, page, &NoOcr),
        };
        Ok(grid.map(|grid| {
            table.grid = Some(grid);
            table
        }))
    }
}
