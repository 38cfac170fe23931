
//! Convert between packed pixel rows and flat sequences of 8-bit samples.
//!
//! A flat sample sequence contains one sample per pixel for indexed, alpha and luma formats
//! (palette index, opacity or brightness), and `R, G, B` or `R, G, B, A` per pixel for color formats.
//! Packed data always uses the unpadded stride of the format.

pub mod pack;
pub mod dither;

use crate::error::{Error, Result};
use crate::math::bit_extend;
use crate::meta::{ColorFormat, Category, minimum_stride};

pub use self::pack::{Packer, Background};


/// Number of samples one pixel produces when unpacked.
pub fn samples_per_pixel(format: ColorFormat) -> usize {
    match format.category() {
        Category::Indexed | Category::AlphaOnly | Category::LumaOnly => 1,
        Category::Colormap => if format.has_alpha() { 4 } else { 3 },
        Category::Raw => 0,
    }
}

/// Append one row of `bits`-bit values to the buffer, most significant bits first.
/// The last byte of the row is filled up with zero bits.
pub fn pack_bits(values: impl IntoIterator<Item=u8>, bits: usize, target: &mut Vec<u8>) {
    debug_assert!(bits == 1 || bits == 2 || bits == 4 || bits == 8, "unsupported bit depth");

    let mask = ((1_u16 << bits) - 1) as u8;
    let mut byte = 0_u8;
    let mut used_bits = 0;

    for value in values {
        used_bits += bits;
        byte |= (value & mask) << (8 - used_bits);

        if used_bits == 8 {
            target.push(byte);
            byte = 0;
            used_bits = 0;
        }
    }

    if used_bits != 0 {
        target.push(byte);
    }
}

/// Iterate the first `width` `bits`-bit values of a packed row, most significant bits first.
pub fn unpack_bits(row: &[u8], bits: usize, width: usize) -> impl Iterator<Item=u8> + '_ {
    debug_assert!(row.len() * 8 >= width * bits, "row too short");

    let mask = ((1_u16 << bits) - 1) as u8;
    (0 .. width).map(move |x| {
        let bit_index = x * bits;
        let shift = 8 - bits - bit_index % 8;
        (row[bit_index / 8] >> shift) & mask
    })
}

/// Split a 16-bit color into 8-bit red, green and blue.
#[inline]
pub fn expand_565(color: u16) -> [u8; 3] {
    [
        bit_extend(((color >> 11) & 0x1f) as u8, 5),
        bit_extend(((color >> 5) & 0x3f) as u8, 6),
        bit_extend((color & 0x1f) as u8, 5),
    ]
}


/// Convert packed rows of the specified format to a flat sample sequence.
/// The data must consist of whole rows of the unpadded stride.
/// For `Rgb565A8`, the alpha rows must follow the color rows.
///
/// Sub-byte alpha values are widened to eight bits,
/// such that a 1-bit alpha of `1` becomes `255`,
/// while palette indices keep their value.
pub fn unpack(data: &[u8], format: ColorFormat, width: usize) -> Result<Vec<u8>> {
    if format.is_raw() {
        return Err(Error::format(format!("{} data cannot be unpacked", format)));
    }

    let stride = minimum_stride(format, width);
    let alpha_stride = if format == ColorFormat::Rgb565A8 { stride / 2 } else { 0 };

    if stride == 0 || data.is_empty() {
        return Ok(Vec::new());
    }

    if data.len() % (stride + alpha_stride) != 0 {
        return Err(Error::parameter(format!(
            "{} bytes are not whole rows of {} pixels in {}",
            data.len(), width, format
        )));
    }

    let height = data.len() / (stride + alpha_stride);
    let (color_rows, alpha_rows) = data.split_at(stride * height);
    let bits = format.bits_per_pixel();

    let mut samples = Vec::with_capacity(width * height * samples_per_pixel(format));

    use self::ColorFormat::*;
    match format {
        I1 | I2 | I4 => for row in color_rows.chunks_exact(stride) {
            samples.extend(unpack_bits(row, bits, width));
        },

        A1 | A2 | A4 => for row in color_rows.chunks_exact(stride) {
            samples.extend(unpack_bits(row, bits, width).map(|alpha| bit_extend(alpha, bits as u32)));
        },

        L8 | I8 | A8 => samples.extend_from_slice(color_rows),

        Rgb565 => for pixel in color_rows.chunks_exact(2) {
            samples.extend_from_slice(&expand_565(u16::from_le_bytes([pixel[0], pixel[1]])));
        },

        Rgb565Swapped => for pixel in color_rows.chunks_exact(2) {
            samples.extend_from_slice(&expand_565(u16::from_be_bytes([pixel[0], pixel[1]])));
        },

        Rgb565A8 => for (pixel, &alpha) in color_rows.chunks_exact(2).zip(alpha_rows) {
            samples.extend_from_slice(&expand_565(u16::from_le_bytes([pixel[0], pixel[1]])));
            samples.push(alpha);
        },

        Argb8565 => for pixel in color_rows.chunks_exact(3) {
            samples.extend_from_slice(&expand_565(u16::from_le_bytes([pixel[0], pixel[1]])));
            samples.push(pixel[2]);
        },

        Rgb888 => for pixel in color_rows.chunks_exact(3) {
            samples.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
        },

        Argb8888 | Xrgb8888 | Argb8888Premultiplied => for pixel in color_rows.chunks_exact(4) {
            samples.extend_from_slice(&[pixel[2], pixel[1], pixel[0], pixel[3]]);
        },

        Raw | RawAlpha => unreachable!("raw formats are rejected above"),
    }

    Ok(samples)
}
