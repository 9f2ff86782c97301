//! Geometry command encoding.
//!
//! A feature's geometry is a flat stream of 32-bit words. Each command run
//! starts with a header word `(run_length << 3) | command_id`, followed for
//! MoveTo/LineTo by `run_length` pairs of zigzag-encoded coordinate deltas
//! relative to the previous cursor position. ClosePath carries no payload.
//!
//! Headers are written lazily: a placeholder is pushed when a run opens and
//! patched once the run ends, so consecutive identical commands share one
//! header.

use common::{GridPoint, LineSegment, TileError, TileResult};

/// Bits of a header word holding the command id.
pub const CMD_BITS: u32 = 3;

const CMD_MASK: u32 = (1 << CMD_BITS) - 1;

/// Longest run whose header still fits a signed 32-bit word.
pub const MAX_RUN_LENGTH: u32 = (i32::MAX as u32) >> CMD_BITS;

/// Drawing command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveTo,
    LineTo,
    ClosePath,
}

impl Command {
    /// Wire id of the command.
    pub const fn id(self) -> u32 {
        match self {
            Command::MoveTo => 1,
            Command::LineTo => 2,
            Command::ClosePath => 7,
        }
    }

    pub fn from_id(id: u32) -> TileResult<Self> {
        match id {
            1 => Ok(Command::MoveTo),
            2 => Ok(Command::LineTo),
            7 => Ok(Command::ClosePath),
            other => Err(TileError::InvalidCommand(other)),
        }
    }

    /// Number of parameter words following each repetition.
    pub const fn parameter_count(self) -> usize {
        match self {
            Command::MoveTo | Command::LineTo => 2,
            Command::ClosePath => 0,
        }
    }
}

/// Map a signed value onto an unsigned one, interleaving signs.
#[inline]
pub fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag`].
#[inline]
pub fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Pack a command header.
pub fn pack_header(command: Command, run_length: u32) -> TileResult<u32> {
    if run_length > MAX_RUN_LENGTH {
        return Err(TileError::RunLengthOverflow { length: run_length });
    }
    Ok((run_length << CMD_BITS) | (command.id() & CMD_MASK))
}

/// Split a header word back into its command and run length.
pub fn unpack_header(word: u32) -> TileResult<(Command, u32)> {
    let command = Command::from_id(word & CMD_MASK)?;
    Ok((command, word >> CMD_BITS))
}

/// Encoder for one feature's geometry.
///
/// Create one per feature and consume it with [`GeometryEncoder::finish`].
#[derive(Debug)]
pub struct GeometryEncoder {
    words: Vec<u32>,
    current: Option<Command>,
    run_length: u32,
    cursor: GridPoint,
    /// Position of the open run's placeholder header.
    header_index: Option<usize>,
    max_run_length: u32,
}

impl GeometryEncoder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
            current: None,
            run_length: 0,
            cursor: GridPoint::ORIGIN,
            header_index: None,
            max_run_length: MAX_RUN_LENGTH,
        }
    }

    #[cfg(test)]
    fn with_run_limit(limit: u32) -> Self {
        Self {
            max_run_length: limit,
            ..Self::new()
        }
    }

    /// Current pen position.
    pub fn cursor(&self) -> GridPoint {
        self.cursor
    }

    /// Whether any command has been emitted.
    pub fn has_emitted(&self) -> bool {
        self.current.is_some()
    }

    pub fn move_to(&mut self, point: GridPoint) -> TileResult<()> {
        self.op(Command::MoveTo, point)
    }

    pub fn line_to(&mut self, point: GridPoint) -> TileResult<()> {
        self.op(Command::LineTo, point)
    }

    pub fn close_path(&mut self) -> TileResult<()> {
        self.begin_run(Command::ClosePath)?;
        self.extend_run()
    }

    /// Finalize the open run and return the word stream.
    pub fn finish(mut self) -> TileResult<Vec<u32>> {
        self.flush_run()?;
        Ok(self.words)
    }

    fn op(&mut self, command: Command, point: GridPoint) -> TileResult<()> {
        self.begin_run(command)?;
        let dx = point
            .x
            .checked_sub(self.cursor.x)
            .ok_or(TileError::CoordinateOverflow)?;
        let dy = point
            .y
            .checked_sub(self.cursor.y)
            .ok_or(TileError::CoordinateOverflow)?;
        self.extend_run()?;
        self.words.push(zigzag(dx));
        self.words.push(zigzag(dy));
        self.cursor = point;
        Ok(())
    }

    fn begin_run(&mut self, command: Command) -> TileResult<()> {
        if self.current == Some(command) {
            return Ok(());
        }
        self.flush_run()?;
        self.current = Some(command);
        self.run_length = 0;
        self.header_index = Some(self.words.len());
        self.words.push(0);
        Ok(())
    }

    fn extend_run(&mut self) -> TileResult<()> {
        if self.run_length >= self.max_run_length {
            return Err(TileError::RunLengthOverflow {
                length: self.run_length.saturating_add(1),
            });
        }
        self.run_length += 1;
        Ok(())
    }

    fn flush_run(&mut self) -> TileResult<()> {
        if let (Some(index), Some(command)) = (self.header_index.take(), self.current) {
            self.words[index] = pack_header(command, self.run_length)?;
        }
        Ok(())
    }
}

impl Default for GeometryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode line segments as one feature.
///
/// A MoveTo is emitted only when a segment does not start where the previous
/// one ended, so chains of touching segments collapse into one LineTo run.
pub fn encode_lines(segments: &[LineSegment]) -> TileResult<Vec<u32>> {
    let mut encoder = GeometryEncoder::with_capacity(segments.len() * 3 + 2);
    for segment in segments {
        if !encoder.has_emitted() || encoder.cursor() != segment.start {
            encoder.move_to(segment.start)?;
        }
        encoder.line_to(segment.end)?;
    }
    encoder.finish()
}

/// Encode points as one feature of independent one-unit dashes.
pub fn encode_points(points: &[GridPoint]) -> TileResult<Vec<u32>> {
    let mut encoder = GeometryEncoder::with_capacity(points.len() * 6);
    for &point in points {
        let x = point.x.checked_add(1).ok_or(TileError::CoordinateOverflow)?;
        encoder.move_to(point)?;
        encoder.line_to(GridPoint::new(x, point.y))?;
    }
    encoder.finish()
}

/// A decoded drawing operation with absolute coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryOp {
    MoveTo(GridPoint),
    LineTo(GridPoint),
    ClosePath,
}

/// Decode a geometry word stream back into absolute operations.
pub fn decode_geometry(words: &[u32]) -> TileResult<Vec<GeometryOp>> {
    let mut ops = Vec::new();
    let mut cursor = GridPoint::ORIGIN;
    let mut pos = 0;

    while pos < words.len() {
        let (command, run_length) = unpack_header(words[pos])?;
        pos += 1;

        let needed = run_length as usize * command.parameter_count();
        if words.len() - pos < needed {
            return Err(TileError::decode(format!(
                "{:?} run of {} needs {} words, {} left",
                command,
                run_length,
                needed,
                words.len() - pos
            )));
        }

        for _ in 0..run_length {
            match command {
                Command::ClosePath => ops.push(GeometryOp::ClosePath),
                Command::MoveTo | Command::LineTo => {
                    cursor = GridPoint::new(
                        cursor.x.wrapping_add(unzigzag(words[pos])),
                        cursor.y.wrapping_add(unzigzag(words[pos + 1])),
                    );
                    pos += 2;
                    ops.push(if command == Command::MoveTo {
                        GeometryOp::MoveTo(cursor)
                    } else {
                        GeometryOp::LineTo(cursor)
                    });
                }
            }
        }
    }

    Ok(ops)
}
