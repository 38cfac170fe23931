
//! The standalone run length file (`.rle`):
//! an eight byte run length header, the image header, and the run length encoded data.

use std::path::Path;

use super::{Image, check_extension, create_parent_directories};
use crate::compression::rle;
use crate::error::{Error, Result, UnitResult};
use crate::io::{Data, Read, Write, read_to_end_limited};
use crate::meta::ImageHeader;


/// The run length header starts with these four bytes, in little endian.
pub mod magic_number {
    use super::*;

    /// The magic number.
    pub const VALUE: u32 = 0x5aa5_21e0;

    /// Without validation, write this instance to the byte stream.
    pub fn write(write: &mut impl Write) -> UnitResult {
        VALUE.write(write)
    }

    /// Consumes four bytes from the reader and returns whether the file may be a run length file.
    pub fn is_rle_file(read: &mut impl Read) -> Result<bool> {
        Ok(u32::read(read)? == VALUE)
    }

    /// Validate this file. If it is a run length file, return `Ok(())`.
    pub fn validate(read: &mut impl Read) -> UnitResult {
        if is_rle_file(read)? { Ok(()) }
        else { Err(Error::format("rle file identifier missing")) }
    }
}

/// Packs the block size into the lowest four bits,
/// and the lowest 24 bits of the raw length above them.
fn header_word(block_size: usize, raw_len: usize) -> u32 {
    (block_size as u32 & 0xf) | ((raw_len as u32 & 0xff_ffff) << 4)
}


impl Image {

    /// Write this image to a run length file. The file name must end with `.rle`.
    /// Missing directories are created.
    pub fn to_rle(&self, path: impl AsRef<Path>, threshold: usize) -> UnitResult {
        let path = path.as_ref();
        check_extension(path, ".rle")?;
        create_parent_directories(path)?;

        std::fs::write(path, self.to_rle_bytes(threshold)?)?;
        log::info!("to rle: {}, {}", path.display(), self);
        Ok(())
    }

    /// The bytes of a run length file.
    /// Fails if the data is longer than the 24 bits of the header can describe.
    pub fn to_rle_bytes(&self, threshold: usize) -> Result<Vec<u8>> {
        if self.data_len() > 0xff_ffff {
            return Err(Error::parameter(format!("{} is too large for a run length file", self)));
        }

        let block_size = self.format().block_size();
        let compressed = rle::compress_bytes(self.data(), block_size, threshold)?;

        let mut bytes = Vec::with_capacity(8 + ImageHeader::BYTE_SIZE + compressed.len());
        magic_number::write(&mut bytes)?;
        header_word(block_size, self.data_len()).write(&mut bytes)?;
        self.header().write(&mut bytes)?;
        u8::write_slice(&mut bytes, &compressed)?;

        Ok(bytes)
    }

    /// Parse the bytes of a run length file.
    pub fn from_rle_bytes(bytes: &[u8]) -> Result<Self> {
        let read = &mut &bytes[..];
        magic_number::validate(read)?;

        let word = u32::read(read)?;
        let block_size = (word & 0xf) as usize;
        let raw_len = (word >> 4) as usize;

        let header = ImageHeader::read(read)?;
        if block_size != header.color_format.block_size() {
            return Err(Error::format(format!("rle block size {} does not match {}", block_size, header.color_format)));
        }

        let compressed = read_to_end_limited(read, bytes.len())?;
        let data = rle::decompress_bytes(&compressed, block_size, raw_len)?;

        let mut image = Image::from_data(
            header.color_format, usize::from(header.width), usize::from(header.height),
            data, usize::from(header.stride)
        )?;

        image.set_premultiplied(header.flags.is_premultiplied());
        Ok(image)
    }
}
