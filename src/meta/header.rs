
//! The fixed size header in front of every binary bitmap.

use crate::io::*;
use crate::error::*;
use crate::math::{align_up, bytes_for_bits};
use super::color_format::ColorFormat;


/// The first byte of each binary bitmap.
/// Identifies the version of the container format.
pub mod magic_number {
    use super::*;

    /// The first byte of each binary bitmap.
    pub const BYTE: u8 = 0x19;

    /// Without validation, write this instance to the byte stream.
    pub fn write(write: &mut impl Write) -> UnitResult {
        self::BYTE.write(write)
    }

    /// Consumes one byte from the reader. If it is the magic number, return `Ok(())`.
    pub fn validate(read: &mut impl Read) -> UnitResult {
        let magic = u8::read(read)?;

        if magic == self::BYTE { Ok(()) }
        else { Err(Error::format(format!("invalid magic number: {:#04x}", magic))) }
    }
}


/// The 16 bit flag field of the header.
/// Unknown bits are kept as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Flags {
    bits: u16,
}

impl Flags {
    const PREMULTIPLIED_BIT: usize = 0;
    const COMPRESSED_BIT: usize = 3;

    /// Create flags from the raw header field.
    pub fn from_bits(bits: u16) -> Self {
        Flags { bits }
    }

    /// The raw header field.
    pub fn bits(self) -> u16 {
        self.bits
    }

    /// Whether the color channels are multiplied by alpha.
    pub fn is_premultiplied(self) -> bool {
        use ::bit_field::BitField;
        self.bits.get_bit(Self::PREMULTIPLIED_BIT)
    }

    /// Whether the pixel data is wrapped in a compressed payload.
    pub fn is_compressed(self) -> bool {
        use ::bit_field::BitField;
        self.bits.get_bit(Self::COMPRESSED_BIT)
    }

    /// Set or clear the premultiplied bit.
    pub fn with_premultiplied(mut self, premultiplied: bool) -> Self {
        use ::bit_field::BitField;
        self.bits.set_bit(Self::PREMULTIPLIED_BIT, premultiplied);
        self
    }

    /// Set or clear the compressed bit.
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        use ::bit_field::BitField;
        self.bits.set_bit(Self::COMPRESSED_BIT, compressed);
        self
    }
}


/// The smallest number of bytes that can hold one row of pixels, without any padding.
#[inline]
pub fn minimum_stride(format: ColorFormat, width: usize) -> usize {
    bytes_for_bits(width * format.bits_per_pixel())
}

/// The smallest stride that can hold one row and is a multiple of `alignment` bytes.
pub fn aligned_stride(format: ColorFormat, width: usize, alignment: usize) -> Result<usize> {
    if alignment < 1 {
        return Err(Error::parameter(format!("invalid stride alignment: {}", alignment)));
    }

    Ok(align_up(minimum_stride(format, width), alignment))
}


/// Describes the pixel layout of a binary bitmap.
/// Always occupies exactly twelve bytes:
/// magic, format, flags, width, height, stride and a reserved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHeader {

    /// How the pixels are encoded.
    pub color_format: ColorFormat,

    /// Premultiplication and compression.
    pub flags: Flags,

    /// Number of pixels per row.
    pub width: u16,

    /// Number of rows.
    pub height: u16,

    /// Number of bytes per row, including padding.
    pub stride: u16,
}

impl ImageHeader {

    /// Number of bytes the header occupies in a file.
    pub const BYTE_SIZE: usize = 12;

    /// Create a header for an image of the specified size.
    /// If `stride` is zero, it is computed from `alignment` instead.
    /// Returns an error if the size does not fit into the header
    /// or if the stride is too small to hold a row.
    pub fn new(color_format: ColorFormat, width: usize, height: usize, stride: usize, alignment: usize) -> Result<Self> {
        if width > 0xffff || height > 0xffff {
            return Err(Error::parameter(format!("w, h overflow: {}x{}", width, height)));
        }

        let stride =
            if stride == 0 { aligned_stride(color_format, width, alignment)? }
            else { stride };

        let header = ImageHeader {
            color_format, flags: Flags::default(),
            width: usize_to_u16(width, "width")?,
            height: usize_to_u16(height, "height")?,
            stride: usize_to_u16(stride, "stride")?,
        };

        header.validate()?;
        Ok(header)
    }

    /// Set the flags of this header.
    pub fn with_flags(self, flags: Flags) -> Self {
        ImageHeader { flags, ..self }
    }

    /// The unpadded stride for the width and format of this header.
    pub fn minimum_stride(&self) -> usize {
        minimum_stride(self.color_format, usize::from(self.width))
    }

    /// The number of data bytes this header describes:
    /// the palette if there are any pixels, the rows, and the alpha rows of `Rgb565A8`.
    pub fn data_len(&self) -> usize {
        let width = usize::from(self.width);
        let height = usize::from(self.height);
        let stride = usize::from(self.stride);

        let palette = if width != 0 && height != 0 { self.color_format.palette_size() * 4 } else { 0 };
        let alpha = if self.color_format == ColorFormat::Rgb565A8 { stride / 2 * height } else { 0 };

        palette + stride * height + alpha
    }

    /// Check that the stride can hold a row.
    pub fn validate(&self) -> UnitResult {
        if usize::from(self.stride) < self.minimum_stride() {
            return Err(Error::parameter(format!(
                "stride is too small: {}, minimal: {}",
                self.stride, self.minimum_stride()
            )));
        }

        Ok(())
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        magic_number::write(write)?;
        self.color_format.tag().write(write)?;
        self.flags.bits().write(write)?;
        self.width.write(write)?;
        self.height.write(write)?;
        self.stride.write(write)?;
        0_u16.write(write) // reserved
    }

    /// The twelve bytes of this header.
    pub fn to_bytes(&self) -> [u8; Self::BYTE_SIZE] {
        let mut bytes = [0_u8; Self::BYTE_SIZE];
        let mut target: &mut [u8] = &mut bytes;
        self.write(&mut target)
            .expect("header does not fit into its own byte size");

        bytes
    }

    /// Read the header without validating the stride.
    /// Fails on a wrong magic number or an unknown color format.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        magic_number::validate(read)?;

        let color_format = ColorFormat::from_tag(u8::read(read)?)?;
        let flags = Flags::from_bits(u16::read(read)?);
        let width = u16::read(read)?;
        let height = u16::read(read)?;
        let stride = u16::read(read)?;
        let _reserved = u16::read(read)?;

        Ok(ImageHeader { color_format, flags, width, height, stride })
    }
}
