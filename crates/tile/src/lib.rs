//! Vector tile builder.
//!
//! This crate turns the drawing primitives of a rasterizer into a compressed
//! vector tile:
//! - Quantization of image coordinates onto the tile grid
//! - Line clipping and accumulation
//! - Density bucketing of repeated point hits
//! - Geometry command encoding
//! - Tile serialization and zlib compression

pub mod clip;
pub mod compress;
pub mod config;
pub mod context;
pub mod density;
pub mod encoder;
pub mod lines;
pub mod proto;
pub mod quantize;
pub mod serialize;

pub use clip::{CohenSutherland, LineClipper};
pub use config::TileConfig;
pub use context::GraphicsContext;
pub use encoder::{Command, GeometryEncoder, GeometryOp};
pub use proto::{Feature, GeomType, Layer, Tile};
