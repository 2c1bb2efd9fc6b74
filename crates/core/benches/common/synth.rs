use std::env;

use tablegrid_core::{BoundingBox, DetectedCell, DetectionLabel, PageWord};

pub fn bench_seed() -> u64 {
    env::var("TABLEGRID_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE)
}

#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform jitter in `0..=max`.
    pub fn jitter(&mut self, max: u32) -> u32 {
        (self.next_u64() % (u64::from(max) + 1)) as u32
    }
}

/// Structure detections and words for a `rows` x `cols` table.
pub struct SyntheticTable {
    pub table_box: BoundingBox,
    pub cells: Vec<DetectedCell>,
    pub words: Vec<PageWord>,
}

const CELL_W: u32 = 80;
const CELL_H: u32 = 24;

/// Row and column detections with a few pixels of edge noise, one header
/// detection and one word per slot.
pub fn synthetic_table(rows: u32, cols: u32, seed: u64) -> SyntheticTable {
    let mut rng = XorShift64::new(seed);
    let (x0, y0) = (50, 50);
    let width = cols * CELL_W;
    let height = rows * CELL_H;
    let table_box = BoundingBox::new(x0, y0, x0 + width, y0 + height).unwrap();

    let mut cells = Vec::with_capacity((rows + cols + 1) as usize);
    let mut detect = |x_min: u32, y_min: u32, x_max: u32, y_max: u32, label, rng: &mut XorShift64| {
        let bbox = BoundingBox::new(
            x_min + rng.jitter(2),
            y_min + rng.jitter(2),
            x_max - rng.jitter(2),
            y_max - rng.jitter(2),
        )
        .unwrap();
        let confidence = 0.7 + (rng.jitter(29) as f64) / 100.0;
        cells.push(DetectedCell::new(bbox, label, confidence).unwrap());
    };
    for r in 0..rows {
        let top = y0 + r * CELL_H;
        detect(x0, top, x0 + width, top + CELL_H, DetectionLabel::Row, &mut rng);
    }
    for c in 0..cols {
        let left = x0 + c * CELL_W;
        detect(left, y0, left + CELL_W, y0 + height, DetectionLabel::Column, &mut rng);
    }
    detect(x0, y0, x0 + width, y0 + CELL_H, DetectionLabel::ColumnHeader, &mut rng);

    let mut words = Vec::with_capacity((rows * cols) as usize);
    for r in 0..rows {
        for c in 0..cols {
            let left = x0 + c * CELL_W + 10;
            let top = y0 + r * CELL_H + 6;
            let bbox = BoundingBox::new(left, top, left + 40, top + 12).unwrap();
            words.push(PageWord::new(bbox, format!("r{r}c{c}")));
        }
    }

    SyntheticTable {
        table_box,
        cells,
        words,
    }
}
