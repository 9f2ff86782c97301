//! Line clipping against a rectangular viewport.

use common::{ClipBounds, Point, Segment};

/// Clips segments against a rectangular bound.
///
/// Returns `None` when the segment lies wholly outside `bounds`, otherwise the
/// (possibly shortened) segment with both endpoints inside `bounds`.
pub trait LineClipper {
    fn clip(&self, segment: Segment, bounds: &ClipBounds) -> Option<Segment>;
}

/// Cohen-Sutherland clipper.
#[derive(Clone, Copy, Debug, Default)]
pub struct CohenSutherland;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

// Each pass moves one endpoint onto a bound edge, so four passes always
// settle a finite segment.
const MAX_ITERATIONS: u32 = 8;

fn outcode(point: Point, bounds: &ClipBounds) -> u8 {
    let mut code = INSIDE;
    if point.x < bounds.min_x {
        code |= LEFT;
    } else if point.x > bounds.max_x {
        code |= RIGHT;
    }
    if point.y < bounds.min_y {
        code |= TOP;
    } else if point.y > bounds.max_y {
        code |= BOTTOM;
    }
    code
}

impl LineClipper for CohenSutherland {
    fn clip(&self, segment: Segment, bounds: &ClipBounds) -> Option<Segment> {
        if !segment.is_finite() || bounds.is_empty() {
            return None;
        }

        let Segment {
            start: mut p0,
            end: mut p1,
        } = segment;
        let mut code0 = outcode(p0, bounds);
        let mut code1 = outcode(p1, bounds);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == INSIDE {
                return Some(Segment { start: p0, end: p1 });
            }
            if (code0 & code1) != INSIDE {
                return None;
            }

            let out = if code0 != INSIDE { code0 } else { code1 };
            let dx = p1.x - p0.x;
            let dy = p1.y - p0.y;

            // dy (or dx) cannot be zero here: an endpoint is outside on this
            // axis while the other is not on the same side.
            let crossing = if out & BOTTOM != 0 {
                Point::new(p0.x + dx * (bounds.max_y - p0.y) / dy, bounds.max_y)
            } else if out & TOP != 0 {
                Point::new(p0.x + dx * (bounds.min_y - p0.y) / dy, bounds.min_y)
            } else if out & RIGHT != 0 {
                Point::new(bounds.max_x, p0.y + dy * (bounds.max_x - p0.x) / dx)
            } else {
                Point::new(bounds.min_x, p0.y + dy * (bounds.min_x - p0.x) / dx)
            };

            if out == code0 {
                p0 = crossing;
                code0 = outcode(p0, bounds);
            } else {
                p1 = crossing;
                code1 = outcode(p1, bounds);
            }
        }

        tracing::warn!("clipper did not converge for {:?}", segment);
        None
    }
}
