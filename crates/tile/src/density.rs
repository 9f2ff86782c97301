//! Density bucketing of point hits.
//!
//! A pixel that is hit many times would need unbounded alpha precision to be
//! rendered as one dot. Instead, each hit at a cell goes to the next of a
//! fixed number of layers, cycling: the k-th hit (0-indexed) lands in layer
//! `k mod layer_count`. A renderer drawing every layer with a constant alpha
//! then approximates the accumulated brightness with a bounded number of
//! passes.
//!
//! Hits are counted on a coarse square grid whose resolution is independent
//! of the tile grid.

use crate::config::MAX_DENSITY_RESOLUTION;
use common::{GridPoint, Point};

/// Routes quantized point hits into cycling density layers.
#[derive(Clone, Debug)]
pub struct DensityBucketer {
    layers: Vec<Vec<GridPoint>>,
    hits: Vec<u32>,
    resolution: usize,
    image_width: f64,
    image_height: f64,
}

impl DensityBucketer {
    /// Create a bucketer for an image of `width x height` pixels.
    ///
    /// The caller validates the arguments: `layer_count`, `resolution`,
    /// `width` and `height` must be positive, and `resolution` is bounded by
    /// [`MAX_DENSITY_RESOLUTION`](crate::config::MAX_DENSITY_RESOLUTION).
    /// [`TileConfig::validate`](crate::TileConfig::validate) checks all of
    /// this for a context.
    pub fn new(layer_count: usize, resolution: usize, width: u32, height: u32) -> Self {
        Self::with_capacity(layer_count, resolution, width, height, 0)
    }

    pub fn with_capacity(
        layer_count: usize,
        resolution: usize,
        width: u32,
        height: u32,
        capacity: usize,
    ) -> Self {
        debug_assert!(layer_count > 0 && resolution > 0);
        debug_assert!(resolution <= MAX_DENSITY_RESOLUTION);
        debug_assert!(width > 0 && height > 0);
        Self {
            layers: (0..layer_count).map(|_| Vec::with_capacity(capacity)).collect(),
            hits: vec![0; resolution * resolution],
            resolution,
            image_width: width as f64,
            image_height: height as f64,
        }
    }

    /// Counter cell for an image-space position, clamped onto the grid.
    pub fn cell_of(&self, at: Point) -> (usize, usize) {
        let max = (self.resolution - 1) as f64;
        let res = self.resolution as f64;
        // NaN survives clamp but casts to 0.
        let cx = (at.x * res / self.image_width).clamp(0.0, max) as usize;
        let cy = (at.y * res / self.image_height).clamp(0.0, max) as usize;
        (cx, cy)
    }

    /// Record a hit at image-space position `at`, storing `point`.
    ///
    /// Returns the index of the layer that received the point.
    pub fn record_hit(&mut self, at: Point, point: GridPoint) -> usize {
        let (cx, cy) = self.cell_of(at);
        let counter = &mut self.hits[cy * self.resolution + cx];
        let layer = *counter as usize % self.layers.len();
        // Wrapping keeps the cycle intact for power-of-two layer counts and
        // cannot be reached in practice for others.
        *counter = counter.wrapping_add(1);
        self.layers[layer].push(point);
        layer
    }

    /// Number of hits recorded so far at the given counter cell.
    pub fn hits_at(&self, cx: usize, cy: usize) -> u32 {
        self.hits[cy * self.resolution + cx]
    }

    pub fn layer(&self, index: usize) -> &[GridPoint] {
        &self.layers[index]
    }

    pub fn layers(&self) -> impl Iterator<Item = &[GridPoint]> {
        self.layers.iter().map(Vec::as_slice)
    }

    /// Layers holding at least one point, with their indices.
    pub fn non_empty_layers(&self) -> impl Iterator<Item = (usize, &[GridPoint])> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, points)| !points.is_empty())
            .map(|(index, points)| (index, points.as_slice()))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of points across all layers.
    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_cycling() {
        let mut bucketer = DensityBucketer::new(16, 256, 256, 256);
        let at = Point::new(4.5, 4.5);
        let point = GridPoint::new(72, 72);

        for k in 0..17 {
            assert_eq!(bucketer.record_hit(at, point), k % 16);
        }

        for index in 1..16 {
            assert_eq!(bucketer.layer(index).len(), 1);
        }
        assert_eq!(bucketer.layer(0).len(), 2);
        assert_eq!(bucketer.hits_at(4, 4), 17);
    }

    #[test]
    fn test_cells_are_independent() {
        let mut bucketer = DensityBucketer::new(16, 256, 256, 256);
        assert_eq!(bucketer.record_hit(Point::new(0.5, 0.5), GridPoint::new(8, 8)), 0);
        assert_eq!(bucketer.record_hit(Point::new(1.5, 0.5), GridPoint::new(24, 8)), 0);
        assert_eq!(bucketer.record_hit(Point::new(0.5, 0.5), GridPoint::new(8, 8)), 1);
        assert_eq!(bucketer.non_empty_layers().count(), 2);
    }

    #[test]
    fn test_cell_scale_independent_of_image() {
        // 1024 pixels wide: four pixels share one counter cell.
        let bucketer = DensityBucketer::new(16, 256, 1024, 512);
        assert_eq!(bucketer.cell_of(Point::new(3.5, 1.5)), (0, 0));
        assert_eq!(bucketer.cell_of(Point::new(4.5, 2.5)), (1, 1));
    }

    #[test]
    fn test_cell_clamped() {
        let bucketer = DensityBucketer::new(16, 256, 256, 256);
        assert_eq!(bucketer.cell_of(Point::new(-5.0, 300.0)), (0, 255));
        assert_eq!(bucketer.cell_of(Point::new(f64::NAN, 255.5)), (0, 255));
    }

    #[test]
    fn test_empty() {
        let bucketer = DensityBucketer::new(4, 16, 64, 64);
        assert!(bucketer.is_empty());
        assert_eq!(bucketer.layer_count(), 4);
        assert_eq!(bucketer.layers().count(), 4);
        assert_eq!(bucketer.non_empty_layers().count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_zero_resolution_rejected() {
        DensityBucketer::new(16, 0, 256, 256);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_oversized_resolution_rejected() {
        DensityBucketer::new(16, MAX_DENSITY_RESOLUTION + 1, 256, 256);
    }
}
