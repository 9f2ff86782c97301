//! Assembly of accumulated geometry into a tile.

use crate::compress::compress;
use crate::config::TileConfig;
use crate::density::DensityBucketer;
use crate::encoder::{encode_lines, encode_points};
use crate::lines::LineAccumulator;
use crate::proto::{Feature, Layer, Tile};
use common::TileResult;

/// Build the two-layer tile from accumulated geometry.
///
/// The lines layer holds a single feature with every segment, or no feature
/// at all when nothing was recorded. The points layer holds one feature per
/// non-empty density layer, in layer order. Both layers are always present.
pub fn build_tile(
    config: &TileConfig,
    lines: &LineAccumulator,
    density: &DensityBucketer,
) -> TileResult<Tile> {
    let mut tile = Tile::new();

    let mut line_layer = Layer::new(config.lines_layer.as_str(), config.version, config.extent);
    if !lines.is_empty() {
        line_layer.push_feature(Feature::line_string(encode_lines(lines.segments())?));
    }
    tile.push_layer(line_layer);

    let mut point_layer = Layer::new(config.points_layer.as_str(), config.version, config.extent);
    for (index, points) in density.non_empty_layers() {
        tracing::trace!("density layer {} holds {} points", index, points.len());
        point_layer.push_feature(Feature::line_string(encode_points(points)?));
    }
    tile.push_layer(point_layer);

    Ok(tile)
}

/// Serialize a tile and compress the bytes.
pub fn serialize(tile: &Tile, compression_level: u32) -> TileResult<Vec<u8>> {
    let encoded = tile.encode();
    compress(&encoded, compression_level)
}
