//! Common error types.

use thiserror::Error;

/// Main error type for tile building.
#[derive(Error, Debug)]
pub enum TileError {
    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Command run length {length} exceeds the encodable maximum")]
    RunLengthOverflow { length: u32 },

    #[error("Coordinate delta overflow")]
    CoordinateOverflow,

    #[error("Invalid command id: {0}")]
    InvalidCommand(u32),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type TileResult<T> = Result<T, TileError>;

impl TileError {
    pub fn compression(msg: impl Into<String>) -> Self {
        Self::Compression(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
