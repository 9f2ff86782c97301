//! Common types shared across the tile pipeline.

pub mod error;
pub mod geometry;

pub use error::{TileError, TileResult};
pub use geometry::{ClipBounds, GridPoint, LineSegment, Point, Segment};
