//! Geometric primitives.
//!
//! Two coordinate spaces are in play: image space, where the rasterizer
//! produces floating-point pixel coordinates, and the integer tile grid that
//! all geometry is quantized into before encoding.

use serde::{Deserialize, Serialize};

/// A point in image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A line segment in image space, as handed to the clipper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    #[inline]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

/// An axis-aligned clipping rectangle in image space.
///
/// Both edges are inclusive: a point lying exactly on `max_x` is inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipBounds {
    #[inline]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds covering `[0, width] x [0, height]`.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.max_x > self.min_x && self.max_y > self.min_y)
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// A point on the integer tile grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const ORIGIN: GridPoint = GridPoint { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A quantized line segment on the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: GridPoint,
    pub end: GridPoint,
}

impl LineSegment {
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            start: GridPoint::new(x0, y0),
            end: GridPoint::new(x1, y1),
        }
    }

    /// A segment whose endpoints coincide draws nothing.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_bounds_contains_edges() {
        let bounds = ClipBounds::from_size(256.0, 128.0);
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(256.0, 128.0)));
        assert!(!bounds.contains(Point::new(256.5, 10.0)));
        assert!(!bounds.contains(Point::new(10.0, -0.1)));
    }

    #[test]
    fn test_clip_bounds_empty() {
        assert!(ClipBounds::from_size(0.0, 10.0).is_empty());
        assert!(!ClipBounds::from_size(1.0, 1.0).is_empty());
        assert_eq!(ClipBounds::new(2.0, 3.0, 10.0, 7.0).width(), 8.0);
    }

    #[test]
    fn test_degenerate_segment() {
        assert!(LineSegment::new(4, 4, 4, 4).is_degenerate());
        assert!(!LineSegment::new(4, 4, 5, 4).is_degenerate());
    }

    #[test]
    fn test_segment_finite() {
        assert!(Segment::new(0.0, 1.0, 2.0, 3.0).is_finite());
        assert!(!Segment::new(f64::NAN, 1.0, 2.0, 3.0).is_finite());
    }
}
