//! Integer bounding boxes in image-pixel coordinates (top-left origin).

use crate::error::GeometryError;

/// An axis-aligned box with `x_max > x_min` and `y_max > y_min`.
///
/// Coordinates are unsigned, so the non-negative invariant holds by
/// construction. Slot boxes clipped by the grid filler are the only boxes
/// that may be degenerate; see [`BoundingBox::clipped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl BoundingBox {
    pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<Self, GeometryError> {
        if x_max <= x_min {
            return Err(GeometryError::EmptyWidth { x_min, x_max });
        }
        if y_max <= y_min {
            return Err(GeometryError::EmptyHeight { y_min, y_max });
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Build a box from signed coordinates, e.g. detector output that was
    /// shifted by a table offset.
    pub fn from_signed(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Result<Self, GeometryError> {
        let coord = |v: i64| -> Result<u32, GeometryError> {
            if v < 0 {
                return Err(GeometryError::NegativeCoordinate(v));
            }
            u32::try_from(v).map_err(|_| GeometryError::CoordinateOverflow(v))
        };
        Self::new(coord(x_min)?, coord(y_min)?, coord(x_max)?, coord(y_max)?)
    }

    /// Slot box clipped to `bounds`. Collapses to zero width or height when
    /// the slot lies outside `bounds`.
    pub(crate) fn clipped(x_min: u32, y_min: u32, x_max: u32, y_max: u32, bounds: &Self) -> Self {
        let x_min = x_min.clamp(bounds.x_min, bounds.x_max);
        let y_min = y_min.clamp(bounds.y_min, bounds.y_max);
        Self {
            x_min,
            y_min,
            x_max: x_max.min(bounds.x_max).max(x_min),
            y_max: y_max.min(bounds.y_max).max(y_min),
        }
    }

    pub const fn x_min(&self) -> u32 {
        self.x_min
    }

    pub const fn y_min(&self) -> u32 {
        self.y_min
    }

    pub const fn x_max(&self) -> u32 {
        self.x_max
    }

    pub const fn y_max(&self) -> u32 {
        self.y_max
    }

    pub const fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub const fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    pub const fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn center_x(&self) -> f64 {
        (f64::from(self.x_min) + f64::from(self.x_max)) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (f64::from(self.y_min) + f64::from(self.y_max)) / 2.0
    }

    pub const fn to_array(&self) -> [u32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// True when the interiors of the two boxes intersect.
    pub const fn overlaps(&self, other: &Self) -> bool {
        !(self.x_max <= other.x_min
            || other.x_max <= self.x_min
            || self.y_max <= other.y_min
            || other.y_max <= self.y_min)
    }

    /// The overlapping region, if the interiors intersect.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        })
    }

    /// True when `other` spans no wider than this box horizontally.
    pub const fn contains_x_span(&self, other: &Self) -> bool {
        other.x_min >= self.x_min && other.x_max <= self.x_max
    }
}
