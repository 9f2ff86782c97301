//! Vector tile message and its protobuf wire encoding.
//!
//! Only the parts of the vector tile (v1) schema this crate produces are
//! modelled: layers with a name, version and extent, holding features with a
//! geometry type and a packed geometry word stream. Unknown fields are skipped
//! on decode.

use common::{TileError, TileResult};

// Field numbers from vector_tile.proto.
mod field {
    pub const TILE_LAYERS: u32 = 3;

    pub const LAYER_NAME: u32 = 1;
    pub const LAYER_FEATURES: u32 = 2;
    pub const LAYER_EXTENT: u32 = 5;
    pub const LAYER_VERSION: u32 = 15;

    pub const FEATURE_ID: u32 = 1;
    pub const FEATURE_TYPE: u32 = 3;
    pub const FEATURE_GEOMETRY: u32 = 4;
}

mod wire {
    pub const VARINT: u8 = 0;
    pub const FIXED64: u8 = 1;
    pub const LEN: u8 = 2;
    pub const FIXED32: u8 = 5;
}

/// Geometry type of a feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeomType {
    #[default]
    Unknown,
    Point,
    LineString,
    Polygon,
}

impl GeomType {
    pub const fn as_u32(self) -> u32 {
        match self {
            GeomType::Unknown => 0,
            GeomType::Point => 1,
            GeomType::LineString => 2,
            GeomType::Polygon => 3,
        }
    }

    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => GeomType::Point,
            2 => GeomType::LineString,
            3 => GeomType::Polygon,
            _ => GeomType::Unknown,
        }
    }
}

/// A single geometry within a layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feature {
    /// Optional feature id.
    pub id: Option<u64>,
    /// Geometry type.
    pub geom_type: GeomType,
    /// Command/parameter word stream.
    pub geometry: Vec<u32>,
}

impl Feature {
    pub fn line_string(geometry: Vec<u32>) -> Self {
        Self {
            id: None,
            geom_type: GeomType::LineString,
            geometry,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        if let Some(id) = self.id {
            write_key(out, field::FEATURE_ID, wire::VARINT);
            write_varint(out, id);
        }
        write_key(out, field::FEATURE_TYPE, wire::VARINT);
        write_varint(out, self.geom_type.as_u32() as u64);
        if !self.geometry.is_empty() {
            let mut packed = Vec::with_capacity(self.geometry.len() * 2);
            for &word in &self.geometry {
                write_varint(&mut packed, word as u64);
            }
            write_key(out, field::FEATURE_GEOMETRY, wire::LEN);
            write_bytes(out, &packed);
        }
    }

    fn decode(data: &[u8]) -> TileResult<Self> {
        let mut feature = Feature::default();
        let mut reader = Reader::new(data);
        while !reader.is_at_end() {
            let (number, wire_type) = reader.read_key()?;
            match (number, wire_type) {
                (field::FEATURE_ID, wire::VARINT) => feature.id = Some(reader.read_varint()?),
                (field::FEATURE_TYPE, wire::VARINT) => {
                    feature.geom_type = GeomType::from_u32(reader.read_u32()?)
                }
                (field::FEATURE_GEOMETRY, wire::LEN) => {
                    let mut packed = Reader::new(reader.read_bytes()?);
                    while !packed.is_at_end() {
                        feature.geometry.push(packed.read_u32()?);
                    }
                }
                (field::FEATURE_GEOMETRY, wire::VARINT) => feature.geometry.push(reader.read_u32()?),
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(feature)
    }
}

/// A named group of features.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub version: u32,
    pub extent: u32,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, version: u32, extent: u32) -> Self {
        Self {
            name: name.into(),
            version,
            extent,
            features: Vec::new(),
        }
    }

    pub fn push_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        write_key(out, field::LAYER_NAME, wire::LEN);
        write_bytes(out, self.name.as_bytes());
        for feature in &self.features {
            let mut body = Vec::new();
            feature.encode_into(&mut body);
            write_key(out, field::LAYER_FEATURES, wire::LEN);
            write_bytes(out, &body);
        }
        write_key(out, field::LAYER_EXTENT, wire::VARINT);
        write_varint(out, self.extent as u64);
        write_key(out, field::LAYER_VERSION, wire::VARINT);
        write_varint(out, self.version as u64);
    }

    fn decode(data: &[u8]) -> TileResult<Self> {
        // Schema defaults apply to absent fields.
        let mut layer = Layer::new(String::new(), 1, 4096);
        let mut reader = Reader::new(data);
        while !reader.is_at_end() {
            let (number, wire_type) = reader.read_key()?;
            match (number, wire_type) {
                (field::LAYER_NAME, wire::LEN) => {
                    layer.name = String::from_utf8(reader.read_bytes()?.to_vec())
                        .map_err(|_| TileError::decode("layer name is not valid UTF-8"))?;
                }
                (field::LAYER_FEATURES, wire::LEN) => {
                    layer.features.push(Feature::decode(reader.read_bytes()?)?)
                }
                (field::LAYER_EXTENT, wire::VARINT) => layer.extent = reader.read_u32()?,
                (field::LAYER_VERSION, wire::VARINT) => layer.version = reader.read_u32()?,
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(layer)
    }
}

/// A vector tile: an ordered list of layers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub layers: Vec<Layer>,
}

impl Tile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// First layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Serialize to the protobuf wire format.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for layer in &self.layers {
            let mut body = Vec::new();
            layer.encode_into(&mut body);
            write_key(&mut out, field::TILE_LAYERS, wire::LEN);
            write_bytes(&mut out, &body);
        }
        out
    }

    /// Parse a tile from the protobuf wire format.
    pub fn decode(data: &[u8]) -> TileResult<Self> {
        let mut tile = Tile::new();
        let mut reader = Reader::new(data);
        while !reader.is_at_end() {
            let (number, wire_type) = reader.read_key()?;
            match (number, wire_type) {
                (field::TILE_LAYERS, wire::LEN) => tile.layers.push(Layer::decode(reader.read_bytes()?)?),
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(tile)
    }
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn write_key(out: &mut Vec<u8>, number: u32, wire_type: u8) {
    write_varint(out, ((number as u64) << 3) | wire_type as u64);
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Cursor over a protobuf-encoded buffer.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn read_varint(&mut self) -> TileResult<u64> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| TileError::decode("unexpected end of data in varint"))?;
            self.pos += 1;
            value |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(TileError::decode("varint longer than 10 bytes"))
    }

    fn read_u32(&mut self) -> TileResult<u32> {
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| TileError::decode(format!("value {} exceeds u32", value)))
    }

    fn read_key(&mut self) -> TileResult<(u32, u8)> {
        let key = self.read_varint()?;
        let number = u32::try_from(key >> 3)
            .map_err(|_| TileError::decode(format!("field number out of range in key {}", key)))?;
        Ok((number, (key & 0x7) as u8))
    }

    fn take(&mut self, len: usize) -> TileResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| TileError::decode(format!("field of {} bytes overruns buffer", len)))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_bytes(&mut self) -> TileResult<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| TileError::decode("length out of range"))?;
        self.take(len)
    }

    fn skip(&mut self, wire_type: u8) -> TileResult<()> {
        match wire_type {
            wire::VARINT => self.read_varint().map(|_| ()),
            wire::FIXED64 => self.take(8).map(|_| ()),
            wire::LEN => self.read_bytes().map(|_| ()),
            wire::FIXED32 => self.take(4).map(|_| ()),
            other => Err(TileError::decode(format!("unsupported wire type {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tile() -> Tile {
        let mut lines = Layer::new("lines", 1, 4096);
        lines.push_feature(Feature::line_string(vec![9, 0, 0, 10, 320, 320]));
        let mut points = Layer::new("points", 1, 4096);
        points.push_feature(Feature::line_string(vec![9, 16, 16, 10, 2, 0]));
        points.push_feature(Feature::line_string(vec![9, 300, 4, 10, 2, 0]));

        let mut tile = Tile::new();
        tile.push_layer(lines);
        tile.push_layer(points);
        tile
    }

    #[test]
    fn test_varint_encoding() {
        let mut out = Vec::new();
        write_varint(&mut out, 1);
        write_varint(&mut out, 300);
        write_varint(&mut out, u32::MAX as u64);
        assert_eq!(out, vec![0x01, 0xac, 0x02, 0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn test_feature_wire_layout() {
        let mut out = Vec::new();
        Feature::line_string(vec![9, 0, 0]).encode_into(&mut out);
        // type = 2, then packed geometry of three one-byte varints.
        assert_eq!(out, vec![0x18, 0x02, 0x22, 0x03, 0x09, 0x00, 0x00]);
    }

    #[test]
    fn test_layer_wire_layout() {
        let mut out = Vec::new();
        Layer::new("ab", 1, 4096).encode_into(&mut out);
        assert_eq!(out, vec![0x0a, 0x02, b'a', b'b', 0x28, 0x80, 0x20, 0x78, 0x01]);
    }

    #[test]
    fn test_empty_geometry_omitted() {
        let mut out = Vec::new();
        Feature::line_string(Vec::new()).encode_into(&mut out);
        assert_eq!(out, vec![0x18, 0x02]);
    }

    #[test]
    fn test_tile_decode() {
        let tile = sample_tile();
        let decoded = Tile::decode(&tile.encode()).unwrap();
        assert_eq!(decoded, tile);
        assert_eq!(decoded.layer("points").unwrap().features.len(), 2);
        assert!(decoded.layer("polygons").is_none());
    }

    #[test]
    fn test_unknown_fields_skipped() {
        let mut data = Vec::new();
        // Tile field 7 (fixed32), then field 9 (varint), then a real layer.
        write_key(&mut data, 7, wire::FIXED32);
        data.extend_from_slice(&[1, 2, 3, 4]);
        write_key(&mut data, 9, wire::VARINT);
        write_varint(&mut data, 12345);
        data.extend(sample_tile().encode());

        let decoded = Tile::decode(&data).unwrap();
        assert_eq!(decoded.layers.len(), 2);
    }

    #[test]
    fn test_truncated_input_rejected() {
        let data = sample_tile().encode();
        let err = Tile::decode(&data[..data.len() - 3]).unwrap_err();
        assert!(matches!(err, TileError::Decode(_)));
    }

    #[test]
    fn test_layer_defaults() {
        let mut data = Vec::new();
        write_key(&mut data, field::LAYER_NAME, wire::LEN);
        write_bytes(&mut data, b"bare");
        let layer = Layer::decode(&data).unwrap();
        assert_eq!(layer.name, "bare");
        assert_eq!(layer.version, 1);
        assert_eq!(layer.extent, 4096);
    }
}
