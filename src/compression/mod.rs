
//! Contains the compression method definition
//! and methods to compress and decompress pixel data.

pub mod rle;
mod lz4;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result, UnitResult, usize_to_u32, u32_to_usize};
use crate::io::{Data, Read, Write};

pub use self::lz4::Lz4;


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// A byte slice.
pub type Bytes<'s> = &'s [u8];


/// Specifies which compression method to use for the pixel data of a container.
/// The palette of indexed images is compressed along with the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressMethod {

    /// Store the data as is. Uncompressed data is placed directly behind the header, without any framing.
    None,

    /// Run length encoding on whole pixels. Works best for masks,
    /// icons and other images with large flat areas. This compression method is lossless.
    Rle,

    /// A general purpose LZ4 block. Usually smaller than RLE for photographic content,
    /// but requires a decompressor on the device. This compression method is lossless.
    Lz4,
}

impl Default for CompressMethod {
    fn default() -> Self { CompressMethod::None }
}

impl CompressMethod {

    /// The 32-bit tag that identifies this method in the payload framing.
    pub fn tag(self) -> u32 {
        match self {
            CompressMethod::None => 0,
            CompressMethod::Rle => 1,
            CompressMethod::Lz4 => 2,
        }
    }

    /// Look up the method by its tag. Unknown tags are a format error.
    pub fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(CompressMethod::None),
            1 => Ok(CompressMethod::Rle),
            2 => Ok(CompressMethod::Lz4),
            _ => Err(Error::format(format!("invalid compress method: {}", tag))),
        }
    }

    /// Upper case name of this method, as accepted by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            CompressMethod::None => "NONE",
            CompressMethod::Rle => "RLE",
            CompressMethod::Lz4 => "LZ4",
        }
    }
}

impl fmt::Display for CompressMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for CompressMethod {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "NONE" => Ok(CompressMethod::None),
            "RLE" => Ok(CompressMethod::Rle),
            "LZ4" => Ok(CompressMethod::Lz4),
            _ => Err(Error::parameter(format!("invalid compress method: {}", name))),
        }
    }
}


/// A general purpose block codec, used for the `Lz4` method.
/// Can be replaced by a stub in tests.
pub trait BlockCompressor {

    /// Compress all bytes into a single block without any size prefix.
    fn compress(&self, bytes: Bytes<'_>) -> Result<ByteVec>;

    /// Decompress a single block, which must expand to exactly `raw_len` bytes.
    fn decompress(&self, bytes: Bytes<'_>, raw_len: usize) -> Result<ByteVec>;
}


/// How to compress the pixel data of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {

    /// The compression method.
    pub method: CompressMethod,

    /// Repeating blocks are only stored as a run if there are at least this many.
    /// Only used for the `Rle` method.
    pub rle_threshold: usize,
}

impl Default for Compression {
    fn default() -> Self { Compression::new(CompressMethod::None) }
}

impl From<CompressMethod> for Compression {
    fn from(method: CompressMethod) -> Self { Compression::new(method) }
}

impl Compression {

    /// Use the specified method with the default run length threshold.
    pub fn new(method: CompressMethod) -> Self {
        Compression { method, rle_threshold: rle::DEFAULT_THRESHOLD }
    }

    /// Set the minimum number of equal blocks that form a run.
    pub fn with_rle_threshold(self, rle_threshold: usize) -> Self {
        Compression { rle_threshold, ..self }
    }

    /// Compress the bytes, treating every `block_size` bytes as one pixel.
    pub fn compress(&self, raw: Bytes<'_>, block_size: usize) -> Result<CompressedPayload> {
        self.compress_with(raw, block_size, &Lz4)
    }

    /// Compress the bytes, using the specified codec for the `Lz4` method.
    pub fn compress_with(&self, raw: Bytes<'_>, block_size: usize, codec: &impl BlockCompressor) -> Result<CompressedPayload> {
        let bytes = match self.method {
            CompressMethod::None => raw.to_vec(),
            CompressMethod::Rle => rle::compress_bytes(raw, block_size, self.rle_threshold)?,
            CompressMethod::Lz4 => codec.compress(raw)?,
        };

        log::debug!(
            "{} compressed {} bytes to {} bytes (block size {})",
            self.method, raw.len(), bytes.len(), block_size
        );

        Ok(CompressedPayload { method: self.method, raw_len: raw.len(), bytes })
    }
}


/// Compressed pixel data, along with what is required to restore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPayload {

    /// The method that produced the bytes.
    pub method: CompressMethod,

    /// Number of bytes before compression.
    pub raw_len: usize,

    /// The compressed bytes.
    pub bytes: ByteVec,
}

impl CompressedPayload {

    /// Number of bytes of the framing before the compressed bytes:
    /// method, compressed length and raw length.
    pub const FRAMING_BYTE_SIZE: usize = 3 * u32::BYTE_SIZE;

    /// Number of compressed bytes.
    pub fn compressed_len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bytes this payload occupies in a file, including the framing.
    pub fn byte_size(&self) -> usize {
        Self::FRAMING_BYTE_SIZE + self.compressed_len()
    }

    /// Write the framing followed by the compressed bytes.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        self.method.tag().write(write)?;
        usize_to_u32(self.compressed_len(), "compressed length")?.write(write)?;
        usize_to_u32(self.raw_len, "raw length")?.write(write)?;
        u8::write_slice(write, &self.bytes)
    }

    /// The framing followed by the compressed bytes.
    pub fn to_bytes(&self) -> Result<ByteVec> {
        let mut bytes = Vec::with_capacity(self.byte_size());
        self.write(&mut bytes)?;
        Ok(bytes)
    }

    /// Read the framing and the compressed bytes.
    /// Never allocates more than `hard_max` bytes for the compressed data.
    pub fn read(read: &mut impl Read, hard_max: usize) -> Result<Self> {
        let method = CompressMethod::from_tag(u32::read(read)?)?;
        let compressed_len = u32_to_usize(u32::read(read)?);
        let raw_len = u32_to_usize(u32::read(read)?);
        let bytes = u8::read_vec(read, compressed_len, 1024 * 1024, Some(hard_max))?;

        Ok(CompressedPayload { method, raw_len, bytes })
    }

    /// Restore the raw bytes, treating every `block_size` bytes as one pixel.
    pub fn decompress(&self, block_size: usize) -> Result<ByteVec> {
        decompress_with(self.method, &self.bytes, block_size, self.raw_len, &Lz4)
    }
}


/// Restore `raw_len` bytes that were compressed with the specified method.
pub fn decompress(method: CompressMethod, bytes: Bytes<'_>, block_size: usize, raw_len: usize) -> Result<ByteVec> {
    decompress_with(method, bytes, block_size, raw_len, &Lz4)
}

/// Restore `raw_len` bytes, using the specified codec for the `Lz4` method.
pub fn decompress_with(
    method: CompressMethod, bytes: Bytes<'_>, block_size: usize,
    raw_len: usize, codec: &impl BlockCompressor
) -> Result<ByteVec>
{
    let raw = match method {
        CompressMethod::None => bytes.to_vec(),
        CompressMethod::Rle => rle::decompress_bytes(bytes, block_size, raw_len)?,
        CompressMethod::Lz4 => codec.decompress(bytes, raw_len)?,
    };

    if raw.len() != raw_len {
        return Err(Error::format(format!(
            "{} data expands to {} bytes instead of {}",
            method, raw.len(), raw_len
        )));
    }

    Ok(raw)
}
