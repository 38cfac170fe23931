
//! LZ4 block compression, without a size prefix.
//! The raw length is stored in the payload framing instead.

use super::{BlockCompressor, Bytes, ByteVec};
use crate::error::{Error, Result};


/// The LZ4 block codec of the `lz4_flex` crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lz4;

impl BlockCompressor for Lz4 {
    fn compress(&self, bytes: Bytes<'_>) -> Result<ByteVec> {
        Ok(lz4_flex::block::compress(bytes))
    }

    fn decompress(&self, bytes: Bytes<'_>, raw_len: usize) -> Result<ByteVec> {
        lz4_flex::block::decompress(bytes, raw_len)
            .map_err(|error| Error::format(format!("lz4 block ({})", error)))
    }
}
