//! Tile configuration.

use common::{TileError, TileResult};
use serde::{Deserialize, Serialize};

/// Default tile grid extent.
pub const DEFAULT_EXTENT: u32 = 4096;

/// Default number of density layers. With default rendering, 16 overlapping
/// dots reach full brightness.
pub const DEFAULT_DENSITY_LAYERS: usize = 16;

/// Default side length of the per-cell hit counter grid.
pub const DEFAULT_DENSITY_RESOLUTION: usize = 256;

/// Largest accepted hit counter grid side. The grid holds one `u32` per cell.
pub const MAX_DENSITY_RESOLUTION: usize = 4096;

/// Largest accepted number of density layers.
pub const MAX_DENSITY_LAYERS: usize = 1 << 16;

/// Largest accepted initial capacity of a geometry buffer.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// Tile configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Side length of the integer tile grid.
    pub extent: u32,
    /// Layer version written to every layer.
    pub version: u32,
    /// Name of the layer holding line geometry.
    pub lines_layer: String,
    /// Name of the layer holding density point geometry.
    pub points_layer: String,
    /// Number of parallel density layers.
    pub density_layers: usize,
    /// Side length of the hit counter grid.
    pub density_resolution: usize,
    /// Initial capacity of each geometry buffer.
    pub initial_capacity: usize,
    /// zlib compression level (0-9).
    pub compression_level: u32,
}

impl TileConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid extent.
    pub fn with_extent(mut self, extent: u32) -> Self {
        self.extent = extent;
        self
    }

    /// Set the number of density layers.
    pub fn with_density_layers(mut self, layers: usize) -> Self {
        self.density_layers = layers;
        self
    }

    /// Set the hit counter grid resolution.
    pub fn with_density_resolution(mut self, resolution: usize) -> Self {
        self.density_resolution = resolution;
        self
    }

    /// Set the layer names.
    pub fn with_layer_names(mut self, lines: &str, points: &str) -> Self {
        self.lines_layer = lines.to_string();
        self.points_layer = points.to_string();
        self
    }

    /// Set the compression level.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Set the initial buffer capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Check that the configuration can drive a render.
    pub fn validate(&self) -> TileResult<()> {
        if self.extent == 0 || self.extent > i32::MAX as u32 {
            return Err(TileError::config(format!(
                "extent must be in 1..={}, got {}",
                i32::MAX,
                self.extent
            )));
        }
        if self.density_layers == 0 || self.density_layers > MAX_DENSITY_LAYERS {
            return Err(TileError::config(format!(
                "density_layers must be in 1..={}, got {}",
                MAX_DENSITY_LAYERS, self.density_layers
            )));
        }
        if self.density_resolution == 0 || self.density_resolution > MAX_DENSITY_RESOLUTION {
            return Err(TileError::config(format!(
                "density_resolution must be in 1..={}, got {}",
                MAX_DENSITY_RESOLUTION, self.density_resolution
            )));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(TileError::config(format!(
                "initial_capacity must be at most {}, got {}",
                MAX_INITIAL_CAPACITY, self.initial_capacity
            )));
        }
        if self.compression_level > 9 {
            return Err(TileError::config(format!(
                "compression_level must be in 0..=9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
            version: 1,
            lines_layer: "lines".to_string(),
            points_layer: "points".to_string(),
            density_layers: DEFAULT_DENSITY_LAYERS,
            density_resolution: DEFAULT_DENSITY_RESOLUTION,
            initial_capacity: 1024,
            compression_level: 6,
        }
    }
}
