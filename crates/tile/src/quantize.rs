//! Image space to tile grid quantization.

use common::{GridPoint, LineSegment, Point, Segment};

/// Offset applied to pixel hits so that pixel `(x, y)` maps to its center.
pub const PIXEL_CENTER_OFFSET: f64 = 0.5;

/// Maps image-space coordinates onto the integer tile grid.
///
/// Both axes share the scale derived from the image width, so the tile grid
/// is square in image units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantizer {
    extent: i32,
    scale: f64,
}

impl Quantizer {
    /// Create a quantizer for an image `image_width` pixels wide.
    ///
    /// The caller validates the arguments: `extent` must be in
    /// `1..=i32::MAX` and `image_width` must be positive.
    pub fn new(extent: u32, image_width: u32) -> Self {
        debug_assert!(extent > 0 && extent <= i32::MAX as u32);
        debug_assert!(image_width > 0);
        Self {
            extent: extent as i32,
            scale: extent as f64 / image_width as f64,
        }
    }

    /// Grid units per image pixel.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn extent(&self) -> i32 {
        self.extent
    }

    /// Quantize one coordinate, clamping into `[0, extent - 1]`.
    ///
    /// Float rounding can land a coordinate on the far edge of the grid (or
    /// just outside it); the clamp folds those back in. NaN maps to 0.
    #[inline]
    pub fn quantize(&self, coord: f64) -> i32 {
        let scaled = (coord * self.scale).round() as i32;
        scaled.clamp(0, self.extent - 1)
    }

    #[inline]
    pub fn quantize_point(&self, point: Point) -> GridPoint {
        GridPoint::new(self.quantize(point.x), self.quantize(point.y))
    }

    /// Quantize a pixel hit, sampling the pixel's center.
    #[inline]
    pub fn quantize_pixel(&self, pixel: Point) -> GridPoint {
        self.quantize_point(pixel_center(pixel))
    }

    #[inline]
    pub fn quantize_segment(&self, segment: &Segment) -> LineSegment {
        LineSegment {
            start: self.quantize_point(segment.start),
            end: self.quantize_point(segment.end),
        }
    }
}

/// The center of the pixel whose top-left corner is `pixel`.
#[inline]
pub fn pixel_center(pixel: Point) -> Point {
    Point::new(pixel.x + PIXEL_CENTER_OFFSET, pixel.y + PIXEL_CENTER_OFFSET)
}
