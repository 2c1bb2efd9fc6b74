//! Text resolution for grid slots.
//!
//! A slot's text comes from the page's native text layer when any word
//! overlaps it, otherwise from OCR over the slot's pixels. Those pixels come
//! from the owning detection's own crop when it carries one, else from the
//! rendered page. Either source may fail; failures are logged and the slot
//! gets empty text.

use image::RgbImage;
use image::imageops::crop_imm;
use tracing::debug;

use crate::error::TextError;
use crate::geometry::BoundingBox;
use crate::model::{DetectedCell, PageImage, PageWord};

/// Words of a page's native text layer, in image-pixel coordinates.
pub trait TextLayer {
    fn words(&self) -> Result<Vec<PageWord>, TextError>;
}

impl TextLayer for PageImage {
    fn words(&self) -> Result<Vec<PageWord>, TextError> {
        self.words.clone().ok_or(TextError::NoTextLayer)
    }
}

impl TextLayer for Vec<PageWord> {
    fn words(&self) -> Result<Vec<PageWord>, TextError> {
        Ok(self.clone())
    }
}

/// Recognizes text in an image crop.
pub trait OcrEngine: Send + Sync {
    fn extract_text(&self, crop: &RgbImage) -> Result<String, TextError>;
}

impl<F> OcrEngine for F
where
    F: Fn(&RgbImage) -> Result<String, TextError> + Send + Sync,
{
    fn extract_text(&self, crop: &RgbImage) -> Result<String, TextError> {
        self(crop)
    }
}

/// Reads the text inside a region of the rendered page.
pub trait RegionOcr {
    fn read_region(&self, region: BoundingBox) -> Result<String, TextError>;

    /// Text of pixels that do not come from the page, such as a detection crop.
    fn read_image(&self, image: &RgbImage) -> Result<String, TextError> {
        let _ = image;
        Err(TextError::OcrDisabled)
    }
}

fn recognize(engine: &dyn OcrEngine, image: &RgbImage) -> Result<String, TextError> {
    engine.extract_text(image).map(|text| text.trim().to_string())
}

/// OCR over crops of a rendered page image.
pub struct PageOcr<'a> {
    image: &'a RgbImage,
    engine: &'a dyn OcrEngine,
}

impl<'a> PageOcr<'a> {
    pub fn new(image: &'a RgbImage, engine: &'a dyn OcrEngine) -> Self {
        Self { image, engine }
    }
}

impl RegionOcr for PageOcr<'_> {
    fn read_region(&self, region: BoundingBox) -> Result<String, TextError> {
        let x0 = region.x_min().min(self.image.width());
        let y0 = region.y_min().min(self.image.height());
        let x1 = region.x_max().min(self.image.width());
        let y1 = region.y_max().min(self.image.height());
        if x1 <= x0 || y1 <= y0 {
            return Err(TextError::EmptyCrop(region.to_array()));
        }
        let crop = crop_imm(self.image, x0, y0, x1 - x0, y1 - y0).to_image();
        recognize(self.engine, &crop)
    }

    fn read_image(&self, image: &RgbImage) -> Result<String, TextError> {
        recognize(self.engine, image)
    }
}

/// OCR over detection crops only, for callers without a rendered page.
pub struct CropOcr<'a> {
    engine: &'a dyn OcrEngine,
}

impl<'a> CropOcr<'a> {
    pub fn new(engine: &'a dyn OcrEngine) -> Self {
        Self { engine }
    }
}

impl RegionOcr for CropOcr<'_> {
    fn read_region(&self, _region: BoundingBox) -> Result<String, TextError> {
        Err(TextError::NoPageImage)
    }

    fn read_image(&self, image: &RgbImage) -> Result<String, TextError> {
        recognize(self.engine, image)
    }
}

/// The part of `cell`'s crop that lies under `slot`.
///
/// The crop's top-left pixel is taken to be the detection's top-left corner.
pub(crate) fn detection_crop(cell: &DetectedCell, slot: &BoundingBox) -> Option<RgbImage> {
    let crop = cell.image_crop.as_ref()?;
    let region = cell.bbox.intersection(slot)?;
    let x0 = (region.x_min() - cell.bbox.x_min()).min(crop.width());
    let y0 = (region.y_min() - cell.bbox.y_min()).min(crop.height());
    let x1 = (region.x_max() - cell.bbox.x_min()).min(crop.width());
    let y1 = (region.y_max() - cell.bbox.y_min()).min(crop.height());
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(crop_imm(crop, x0, y0, x1 - x0, y1 - y0).to_image())
}

/// OCR that is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOcr;

impl RegionOcr for NoOcr {
    fn read_region(&self, _region: BoundingBox) -> Result<String, TextError> {
        Err(TextError::OcrDisabled)
    }
}

/// Two-tier text lookup for the slots of one table.
pub struct TextResolver<'a> {
    words: Result<Vec<PageWord>, TextError>,
    ocr: &'a dyn RegionOcr,
}

impl<'a> TextResolver<'a> {
    /// Fetches the text layer once; a failing layer sends every slot to OCR.
    pub fn new(text_layer: &dyn TextLayer, ocr: &'a dyn RegionOcr) -> Self {
        let words = text_layer.words();
        if let Err(err) = &words {
            debug!(%err, "text layer unavailable, falling back to OCR");
        }
        Self { words, ocr }
    }

    /// Space-joined text of the words overlapping `slot`.
    pub fn layer_text(&self, slot: &BoundingBox) -> Result<String, TextError> {
        let words = self.words.as_ref().map_err(Clone::clone)?;
        let joined = words
            .iter()
            .filter(|w| w.bbox.overlaps(slot))
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(joined.trim().to_string())
    }

    pub fn ocr_text(&self, slot: &BoundingBox) -> Result<String, TextError> {
        self.ocr.read_region(*slot)
    }

    /// Text for `slot`; never fails.
    pub fn resolve(&self, slot: &BoundingBox) -> String {
        self.resolve_owned(slot, None)
    }

    /// Text for `slot` owned by `owner`. When OCR is needed and the owner
    /// carries an image crop, the part of that crop under the slot is read
    /// instead of the page.
    pub fn resolve_owned(&self, slot: &BoundingBox, owner: Option<&DetectedCell>) -> String {
        match self.layer_text(slot) {
            Ok(text) if !text.is_empty() => return text,
            Ok(_) => {}
            Err(TextError::NoTextLayer) => {}
            Err(err) => debug!(slot = ?slot.to_array(), %err, "text layer lookup failed"),
        }
        let ocr = match owner.and_then(|cell| detection_crop(cell, slot)) {
            Some(crop) => self.ocr.read_image(&crop),
            None => self.ocr_text(slot),
        };
        match ocr {
            Ok(text) => text,
            Err(err) => {
                debug!(slot = ?slot.to_array(), %err, "no text for slot");
                String::new()
            }
        }
    }
}
