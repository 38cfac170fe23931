
//! Run length encoding on blocks of whole pixels.
//!
//! Each run starts with a control byte.
//! Without the high bit, the control byte is a repeat count, followed by a single block.
//! With the high bit, the lower seven bits count the literal blocks that follow verbatim.

use super::{Bytes, ByteVec};
use crate::error::{Error, Result};

/// The high bit of a control byte marks a literal run.
const LITERAL_FLAG: u8 = 0x80;

/// Neither run kind may contain more than this many blocks.
const MAX_RUN_LENGTH: usize = 127;

/// Runs shorter than this are stored as literals.
pub const DEFAULT_THRESHOLD: usize = 16;


/// Compress the blocks of `block_size` bytes.
/// Trailing bytes that do not fill a whole block are padded with zeroes first.
/// Repeating blocks are only stored as a repeat run if there are at least `threshold` of them.
pub fn compress_bytes(data: Bytes<'_>, block_size: usize, threshold: usize) -> Result<ByteVec> {
    if block_size == 0 {
        return Err(Error::parameter("run length block size must not be zero"));
    }

    let padded;
    let data = if data.len() % block_size == 0 { data } else {
        let mut vec = data.to_vec();
        vec.resize(data.len() + block_size - data.len() % block_size, 0);
        padded = vec;
        padded.as_slice()
    };

    let mut compressed = Vec::with_capacity(data.len() / 2);
    let mut index = 0;

    while index < data.len() {
        let remaining = &data[index ..];
        let repeat_count = count_repeats(remaining, block_size);

        if repeat_count == 0 {
            break;
        }
        else if repeat_count < threshold {
            let literal_count = count_literals(remaining, block_size, threshold);
            let literal_bytes = literal_count * block_size;

            compressed.push(literal_count as u8 | LITERAL_FLAG);
            compressed.extend_from_slice(&remaining[.. literal_bytes]);
            index += literal_bytes;
        }
        else {
            compressed.push(repeat_count as u8);
            compressed.extend_from_slice(&remaining[.. block_size]);
            index += repeat_count * block_size;
        }
    }

    Ok(compressed)
}

/// Expand the runs until `expected_byte_size` bytes are produced.
/// Bytes beyond that size, which stem from padding the last block, are discarded.
pub fn decompress_bytes(mut remaining: Bytes<'_>, block_size: usize, expected_byte_size: usize) -> Result<ByteVec> {
    if block_size == 0 {
        return Err(Error::parameter("run length block size must not be zero"));
    }

    let mut decompressed = Vec::with_capacity(expected_byte_size.min(8 * 2048) + block_size);

    while !remaining.is_empty() && decompressed.len() < expected_byte_size {
        let control = take_1(&mut remaining)?;
        let count = usize::from(control & !LITERAL_FLAG);

        if control & LITERAL_FLAG != 0 {
            let values = take_n(&mut remaining, count * block_size)?;
            decompressed.extend_from_slice(values);
        }
        else {
            let block = take_n(&mut remaining, block_size)?;
            for _ in 0 .. count {
                decompressed.extend_from_slice(block);
            }
        }
    }

    if decompressed.len() < expected_byte_size {
        return Err(Error::format("run length data ends too early"));
    }

    decompressed.truncate(expected_byte_size);
    Ok(decompressed)
}


/// Number of blocks that equal the first block, up to the maximum run length.
fn count_repeats(data: Bytes<'_>, block_size: usize) -> usize {
    if data.len() < block_size {
        return 0;
    }

    let first = &data[.. block_size];
    data.chunks_exact(block_size)
        .take(MAX_RUN_LENGTH)
        .take_while(|&block| block == first)
        .count()
}

/// Number of blocks before a run of more than `threshold` equal blocks begins,
/// up to the maximum run length. Short repetitions are included in the literal run.
fn count_literals(data: Bytes<'_>, block_size: usize, threshold: usize) -> usize {
    let mut blocks = data.chunks_exact(block_size);
    let mut previous = match blocks.next() {
        Some(block) => block,
        None => return 0,
    };

    // the first block is compared against itself
    let mut literal_count = 0;
    let mut repeat_count = 1;

    for block in blocks {
        if block == previous {
            repeat_count += 1;

            if repeat_count > threshold {
                return literal_count;
            }
        }
        else {
            previous = block;
            literal_count += repeat_count;
            repeat_count = 1;

            if literal_count >= MAX_RUN_LENGTH {
                return MAX_RUN_LENGTH;
            }
        }
    }

    (literal_count + repeat_count).min(MAX_RUN_LENGTH)
}

fn take_1(slice: &mut &[u8]) -> Result<u8> {
    if !slice.is_empty() {
        let result = slice[0];
        *slice = &slice[1..];
        Ok(result)

    } else {
        Err(Error::format("compressed data"))
    }
}

fn take_n<'s>(slice: &mut &'s [u8], n: usize) -> Result<&'s [u8]> {
    if n <= slice.len() {
        let (front, back) = slice.split_at(n);
        *slice = back;
        Ok(front)

    } else {
        Err(Error::format("compressed data"))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn roundtrip(data: &[u8], block_size: usize, threshold: usize) -> ByteVec {
        let compressed = compress_bytes(data, block_size, threshold).unwrap();
        let decompressed = decompress_bytes(&compressed, block_size, data.len()).unwrap();
        assert_eq!(decompressed, data);
        compressed
    }

    #[test]
    fn long_repeat_is_split(){
        let compressed = roundtrip(&[ 7; 130 ], 1, 3);
        assert_eq!(compressed, vec![ 127, 7,   3, 7 ]);

        // the three remaining blocks are below the threshold
        let compressed = roundtrip(&[ 7; 130 ], 1, DEFAULT_THRESHOLD);
        assert_eq!(compressed, vec![ 127, 7,   3 | 0x80, 7, 7, 7 ]);
    }

    #[test]
    fn short_repeats_are_literal(){
        let data = [ 1, 2, 2, 2, 3 ];
        let compressed = roundtrip(&data, 1, DEFAULT_THRESHOLD);
        assert_eq!(compressed, vec![ 5 | 0x80, 1, 2, 2, 2, 3 ]);
    }

    #[test]
    fn literal_run_stops_before_repeat(){
        let mut data = vec![ 1, 2, 3 ];
        data.extend_from_slice(&[ 9; 20 ]);

        let compressed = roundtrip(&data, 1, 4);
        // the literal run ends where more than `threshold` equal blocks begin
        assert_eq!(compressed[0], 3 | 0x80);
        assert_eq!(&compressed[1 .. 4], &[ 1, 2, 3 ]);
        assert_eq!(&compressed[4 ..], &[ 20, 9 ]);
    }

    #[test]
    fn repeat_run_starts_at_its_first_block(){
        let mut data = vec![ 1 ];
        data.extend_from_slice(&[ 9; 17 ]);

        // the first nine belongs to the repeat run, not to the literal run before it
        let compressed = roundtrip(&data, 1, DEFAULT_THRESHOLD);
        assert_eq!(compressed, vec![ 1 | 0x80, 1,   17, 9 ]);
    }

    #[test]
    fn literal_runs_are_limited(){
        let data: Vec<u8> = (0 ..= 255).collect();
        let compressed = roundtrip(&data, 1, DEFAULT_THRESHOLD);

        assert_eq!(compressed[0], 127 | 0x80);
        assert_eq!(compressed[128], 127 | 0x80);
        assert_eq!(compressed[256], 2 | 0x80);
        assert_eq!(compressed.len(), 256 + 3);
    }

    #[test]
    fn multi_byte_blocks(){
        let mut data = Vec::new();
        for _ in 0 .. 40 { data.extend_from_slice(&[ 1, 2, 3 ]); }
        data.extend_from_slice(&[ 4, 5, 6,  7, 8 ]);

        let compressed = roundtrip(&data, 3, DEFAULT_THRESHOLD);
        assert_eq!(&compressed[.. 4], &[ 40, 1, 2, 3 ]);
        assert_eq!(&compressed[4 ..], &[ 2 | 0x80, 4, 5, 6, 7, 8, 0 ], "last block is padded");
    }

    #[test]
    fn empty(){
        assert!(roundtrip(&[], 1, DEFAULT_THRESHOLD).is_empty());
        assert!(compress_bytes(&[ 1 ], 0, DEFAULT_THRESHOLD).is_err());
    }

    #[test]
    fn truncated(){
        let compressed = compress_bytes(&[ 5; 20 ], 1, DEFAULT_THRESHOLD).unwrap();
        assert!(decompress_bytes(&compressed, 1, 21).is_err());
        assert!(decompress_bytes(&[ 0x85, 1, 2 ], 1, 5).is_err());
    }
}
