//! zlib compression of serialized tiles.

use common::{TileError, TileResult};
use flate2::{Compress, Compression, FlushCompress, Status};

/// Deflate `input` into a zlib stream.
///
/// The output buffer grows by `input.len() / 2 + 1024` bytes per round until
/// the compressor reports the end of the stream. A codec error, or a round
/// that neither consumes input nor produces output before the stream ends, is
/// a compression error; no partial output is ever returned.
pub fn compress(input: &[u8], level: u32) -> TileResult<Vec<u8>> {
    let mut deflater = Compress::new(Compression::new(level), true);
    let increase = input.len() / 2 + 1024;
    let mut output = Vec::new();

    loop {
        let written = deflater.total_out() as usize;
        let consumed = deflater.total_in() as usize;
        output.resize(written + increase, 0);

        let status = deflater
            .compress(&input[consumed..], &mut output[written..], FlushCompress::Finish)
            .map_err(|err| TileError::compression(err.to_string()))?;

        let round = Round {
            status,
            consumed: deflater.total_in() as usize - consumed,
            produced: deflater.total_out() as usize - written,
        };
        if check_round(&round, deflater.total_in() as usize, input.len())? {
            output.truncate(deflater.total_out() as usize);
            break;
        }
    }

    tracing::debug!(
        "compressed tile from {} to {} bytes",
        input.len(),
        output.len()
    );
    Ok(output)
}

/// Outcome of one `compress` call on the growing buffer.
#[derive(Clone, Copy, Debug)]
struct Round {
    status: Status,
    consumed: usize,
    produced: usize,
}

/// Decide whether the stream is complete after a round.
///
/// Returns `Ok(true)` at the end of the stream and `Ok(false)` when another
/// round is needed. A round that neither consumed nor produced bytes before
/// the end of the stream can never finish.
fn check_round(round: &Round, total_in: usize, input_len: usize) -> TileResult<bool> {
    match round.status {
        Status::StreamEnd => Ok(true),
        Status::Ok | Status::BufError if round.consumed == 0 && round.produced == 0 => {
            Err(TileError::compression(format!(
                "deflate stalled with status {:?} after {} of {} input bytes",
                round.status, total_in, input_len
            )))
        }
        Status::Ok | Status::BufError => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_round_trip() {
        let input: Vec<u8> = (0..10_000u32).flat_map(|i| i.to_le_bytes()).collect();
        let compressed = compress(&input, 6).unwrap();
        assert_eq!(inflate(&compressed), input);
    }

    #[test]
    fn test_zlib_header() {
        let compressed = compress(b"hello tile", 6).unwrap();
        assert_eq!(compressed[0] & 0x0f, 8);
        assert_eq!(u16::from_be_bytes([compressed[0], compressed[1]]) % 31, 0);
    }

    #[test]
    fn test_empty_input() {
        let compressed = compress(&[], 6).unwrap();
        assert!(!compressed.is_empty());
        assert!(inflate(&compressed).is_empty());
    }

    #[test]
    fn test_incompressible_input_needs_several_rounds() {
        // Pseudo-random bytes do not shrink, so one round of len/2 + 1024
        // is not enough room.
        let mut state = 0x2545_f491_u32;
        let input: Vec<u8> = (0..64 * 1024)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let compressed = compress(&input, 9).unwrap();
        assert!(compressed.len() > input.len() / 2 + 1024);
        assert_eq!(inflate(&compressed), input);
    }

    #[test]
    fn test_store_level() {
        let input = vec![7u8; 5000];
        let compressed = compress(&input, 0).unwrap();
        assert_eq!(inflate(&compressed), input);
    }

    #[test]
    fn test_stalled_round_is_an_error() {
        for status in [Status::Ok, Status::BufError] {
            let round = Round {
                status,
                consumed: 0,
                produced: 0,
            };
            assert!(matches!(
                check_round(&round, 10, 100),
                Err(TileError::Compression(_))
            ));
        }
    }

    #[test]
    fn test_progressing_round_continues() {
        let consumed_only = Round {
            status: Status::Ok,
            consumed: 64,
            produced: 0,
        };
        let produced_only = Round {
            status: Status::BufError,
            consumed: 0,
            produced: 12,
        };
        assert!(!check_round(&consumed_only, 64, 100).unwrap());
        assert!(!check_round(&produced_only, 100, 100).unwrap());
    }

    #[test]
    fn test_stream_end_completes() {
        let round = Round {
            status: Status::StreamEnd,
            consumed: 0,
            produced: 0,
        };
        assert!(check_round(&round, 100, 100).unwrap());
    }
}
