//! Vector tile renderer driver.
//!
//! Reads drawing primitives, accumulates them in a [`tile::GraphicsContext`]
//! and emits the compressed tile.

pub mod input;

pub use input::{read_into, InputError, Primitive, Viewport};

/// Tiler version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
