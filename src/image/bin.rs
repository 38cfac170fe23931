
//! Read and write the binary container:
//! the twelve byte header, followed by either the raw data
//! or, if the compressed flag is set, the framed compressed payload.

use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::{Image, check_extension, create_parent_directories};
use crate::compression::{Compression, CompressedPayload, CompressMethod};
use crate::error::{Error, Result, UnitResult};
use crate::io::{Data, Read, Write, read_to_end_limited};
use crate::meta::ImageHeader;


/// No container can hold more data than this, as rows are limited to `0xffff` bytes.
fn max_data_len() -> usize {
    let max = 256 * 4 + 0xffff_u64 * 0xffff * 3 / 2;
    usize::try_from(max).unwrap_or(usize::MAX)
}


impl Image {

    /// Write this image to a binary file. The file name must end with `.bin`.
    /// Missing directories are created.
    pub fn to_bin(&self, path: impl AsRef<Path>, compression: impl Into<Compression>) -> UnitResult {
        let path = path.as_ref();
        check_extension(path, ".bin")?;
        create_parent_directories(path)?;

        let mut write = BufWriter::new(File::create(path)?);
        self.write_bin(&mut write, compression)?;
        write.flush()?;

        log::info!("to bin: {}, {}", path.display(), self);
        Ok(())
    }

    /// The bytes of the binary container.
    pub fn to_bin_bytes(&self, compression: impl Into<Compression>) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(ImageHeader::BYTE_SIZE + self.data_len());
        self.write_bin(&mut bytes, compression)?;
        Ok(bytes)
    }

    /// Write the header and the optionally compressed data.
    pub fn write_bin(&self, write: &mut impl Write, compression: impl Into<Compression>) -> UnitResult {
        let compression = compression.into();
        let compressed = compression.method != CompressMethod::None;

        let mut header = self.header();
        header.flags = header.flags.with_compressed(compressed);
        header.write(write)?;

        if compressed {
            compression.compress(self.data(), self.format().block_size())?.write(write)
        }
        else {
            u8::write_slice(write, self.data())
        }
    }

    /// Read an image from a binary file. The file name must end with `.bin`.
    pub fn from_bin(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_extension(path, ".bin")?;

        let image = Image::read_bin(&mut BufReader::new(File::open(path)?))?;
        log::info!("from bin: {}, {}", path.display(), image);
        Ok(image)
    }

    /// Parse the bytes of a binary container.
    pub fn from_bin_bytes(bytes: &[u8]) -> Result<Self> {
        Image::read_bin(&mut &bytes[..])
    }

    /// Read the header and the data, decompressing it if required.
    /// The reader must not contain anything after the image.
    pub fn read_bin(read: &mut impl Read) -> Result<Self> {
        let header = ImageHeader::read(read)?;
        let format = header.color_format;

        let expected_len = header.data_len();

        let data = if header.flags.is_compressed() {
            let payload = CompressedPayload::read(read, max_data_len())?;
            read_to_end_limited(read, 0)?;

            // never allocate more than the header describes
            if payload.raw_len != expected_len {
                return Err(Error::format(format!(
                    "payload expands to {} bytes, but header describes {} bytes",
                    payload.raw_len, expected_len
                )));
            }

            payload.decompress(format.block_size())?
        }
        else {
            read_to_end_limited(read, expected_len)?
        };

        let mut image = Image::from_data(
            format, usize::from(header.width), usize::from(header.height),
            data, usize::from(header.stride)
        )?;

        image.set_premultiplied(header.flags.is_premultiplied());
        Ok(image)
    }
}
