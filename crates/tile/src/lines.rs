//! Accumulated line geometry.

use common::LineSegment;

/// Stores quantized line segments in insertion order.
///
/// Insertion order matters: consecutive segments that share an endpoint are
/// merged into one polyline run by the encoder.
#[derive(Clone, Debug, Default)]
pub struct LineAccumulator {
    segments: Vec<LineSegment>,
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
        }
    }

    /// Append a segment. Returns `false` if it was dropped as zero-length.
    pub fn record_segment(&mut self, segment: LineSegment) -> bool {
        if segment.is_degenerate() {
            return false;
        }
        self.segments.push(segment);
        true
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
