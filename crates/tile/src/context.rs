//! Per-render graphics context.

use crate::clip::{CohenSutherland, LineClipper};
use crate::config::TileConfig;
use crate::density::DensityBucketer;
use crate::lines::LineAccumulator;
use crate::proto::Tile;
use crate::quantize::{pixel_center, Quantizer};
use crate::serialize::{build_tile, serialize};
use common::{ClipBounds, Point, Segment, TileError, TileResult};

/// Accumulates the primitives of one tile render.
///
/// Created once per render with [`GraphicsContext::init`], fed by the
/// rasterizer through the `record_*` methods, and consumed by
/// [`GraphicsContext::finalize`].
pub struct GraphicsContext<C = CohenSutherland> {
    width: u32,
    height: u32,
    config: TileConfig,
    quantizer: Quantizer,
    clipper: C,
    lines: LineAccumulator,
    density: DensityBucketer,
}

impl GraphicsContext {
    /// Create a context for an image of `width x height` pixels.
    pub fn init(width: u32, height: u32) -> TileResult<Self> {
        Self::with_config(width, height, TileConfig::default())
    }

    /// Create a context with a custom configuration.
    pub fn with_config(width: u32, height: u32, config: TileConfig) -> TileResult<Self> {
        if width == 0 || height == 0 {
            return Err(TileError::InvalidDimensions { width, height });
        }
        config.validate()?;

        tracing::debug!(
            "graphics context {}x{} (extent {}, {} density layers)",
            width,
            height,
            config.extent,
            config.density_layers
        );

        Ok(Self {
            width,
            height,
            quantizer: Quantizer::new(config.extent, width),
            clipper: CohenSutherland,
            lines: LineAccumulator::with_capacity(config.initial_capacity),
            density: DensityBucketer::with_capacity(
                config.density_layers,
                config.density_resolution,
                width,
                height,
                config.initial_capacity,
            ),
            config,
        })
    }
}

impl<C: LineClipper> GraphicsContext<C> {
    /// Replace the line clipper.
    pub fn with_clipper<D: LineClipper>(self, clipper: D) -> GraphicsContext<D> {
        GraphicsContext {
            width: self.width,
            height: self.height,
            config: self.config,
            quantizer: self.quantizer,
            clipper,
            lines: self.lines,
            density: self.density,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &TileConfig {
        &self.config
    }

    pub fn lines(&self) -> &LineAccumulator {
        &self.lines
    }

    pub fn density(&self) -> &DensityBucketer {
        &self.density
    }

    /// Clip an image-space segment to the viewport and store it.
    ///
    /// Segments wholly outside `[0, viewport_width] x [0, viewport_height]`
    /// are dropped, as are segments that collapse to a single grid point.
    pub fn record_clipped_line(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        viewport_width: f64,
        viewport_height: f64,
    ) {
        let segment = Segment::new(x0, y0, x1, y1);
        let bounds = ClipBounds::from_size(viewport_width, viewport_height);

        let Some(clipped) = self.clipper.clip(segment, &bounds) else {
            tracing::trace!("segment {:?} rejected by clipper", segment);
            return;
        };

        let quantized = self.quantizer.quantize_segment(&clipped);
        if !self.lines.record_segment(quantized) {
            tracing::trace!("segment {:?} collapsed to a point", clipped);
        }
    }

    /// Record an antialiased pixel hit at pixel `(x, y)`.
    pub fn record_point(&mut self, x: f64, y: f64) {
        let center = pixel_center(Point::new(x, y));
        let point = self.quantizer.quantize_point(center);
        self.density.record_hit(center, point);
    }

    /// Record a brush stamp centered on `(x, y)`.
    pub fn record_brush(&mut self, x: f64, y: f64) {
        self.record_point(x - 0.5, y - 0.5);
    }

    /// Build the tile message without serializing it.
    pub fn build_tile(&self) -> TileResult<Tile> {
        build_tile(&self.config, &self.lines, &self.density)
    }

    /// Finish the render and return the tile message.
    pub fn finalize_uncompressed(self) -> TileResult<Tile> {
        self.build_tile()
    }

    /// Finish the render and return the compressed tile bytes.
    pub fn finalize(self) -> TileResult<Vec<u8>> {
        tracing::debug!(
            "finalizing tile: {} segments, {} points",
            self.lines.len(),
            self.density.len()
        );
        let tile = self.build_tile()?;
        serialize(&tile, self.config.compression_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{GridPoint, LineSegment};

    #[test]
    fn test_init_rejects_empty_image() {
        assert!(matches!(
            GraphicsContext::init(0, 256),
            Err(TileError::InvalidDimensions { width: 0, height: 256 })
        ));
    }

    #[test]
    fn test_init_rejects_bad_config() {
        let config = TileConfig::new().with_density_layers(0);
        assert!(matches!(
            GraphicsContext::with_config(256, 256, config),
            Err(TileError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_init_rejects_oversized_density_grid() {
        let config = TileConfig::new().with_density_resolution(1usize << 32);
        assert!(matches!(
            GraphicsContext::with_config(256, 256, config),
            Err(TileError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_record_clipped_line_quantizes() {
        let mut context = GraphicsContext::init(256, 256).unwrap();
        context.record_clipped_line(0.0, 0.0, 10.0, 10.0, 256.0, 256.0);
        assert_eq!(context.lines().segments(), &[LineSegment::new(0, 0, 160, 160)]);
    }

    #[test]
    fn test_record_clipped_line_clips() {
        let mut context = GraphicsContext::init(256, 256).unwrap();
        context.record_clipped_line(-10.0, 5.0, 300.0, 5.0, 256.0, 256.0);
        assert_eq!(context.lines().segments(), &[LineSegment::new(0, 80, 4095, 80)]);
    }

    #[test]
    fn test_record_clipped_line_rejects_outside() {
        let mut context = GraphicsContext::init(256, 256).unwrap();
        context.record_clipped_line(300.0, 10.0, 400.0, 20.0, 256.0, 256.0);
        assert!(context.lines().is_empty());
    }

    #[test]
    fn test_record_clipped_line_drops_collapsed() {
        let mut context = GraphicsContext::init(256, 256).unwrap();
        context.record_clipped_line(1.0, 1.0, 1.01, 1.0, 256.0, 256.0);
        assert!(context.lines().is_empty());
    }

    #[test]
    fn test_record_point_centers_pixel() {
        let mut context = GraphicsContext::init(256, 256).unwrap();
        context.record_point(3.0, 4.0);
        assert_eq!(context.density().layer(0), &[GridPoint::new(56, 72)]);
        assert_eq!(context.density().hits_at(3, 4), 1);
    }

    #[test]
    fn test_record_brush_uses_stamp_center() {
        let mut context = GraphicsContext::init(256, 256).unwrap();
        context.record_brush(3.0, 4.0);
        assert_eq!(context.density().layer(0), &[GridPoint::new(48, 64)]);
    }

    #[test]
    fn test_custom_clipper() {
        struct RejectAll;
        impl LineClipper for RejectAll {
            fn clip(&self, _segment: Segment, _bounds: &ClipBounds) -> Option<Segment> {
                None
            }
        }

        let mut context = GraphicsContext::init(256, 256).unwrap().with_clipper(RejectAll);
        context.record_clipped_line(0.0, 0.0, 10.0, 10.0, 256.0, 256.0);
        assert!(context.lines().is_empty());
    }
}
