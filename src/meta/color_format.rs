
//! The closed set of pixel encodings a bitmap can be stored in.
//! Every other module asks this table about bit depths and categories.

use std::fmt;
use std::str::FromStr;
use crate::error::{Error, Result};


/// Describes how the pixels of an image are encoded.
/// The discriminants are the tags stored in the binary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {

    /// Opaque data in another file format, decoded by an external decoder at runtime.
    Raw = 0x01,

    /// Like `Raw`, but the decoded image contains an alpha channel.
    RawAlpha = 0x02,

    /// 8-bit luminance.
    L8 = 0x06,

    /// 1-bit palette index.
    I1 = 0x07,

    /// 2-bit palette index.
    I2 = 0x08,

    /// 4-bit palette index.
    I4 = 0x09,

    /// 8-bit palette index.
    I8 = 0x0A,

    /// 1-bit alpha mask.
    A1 = 0x0B,

    /// 2-bit alpha mask.
    A2 = 0x0C,

    /// 4-bit alpha mask.
    A4 = 0x0D,

    /// 8-bit alpha mask.
    A8 = 0x0E,

    /// 24-bit color, stored as `B, G, R`.
    Rgb888 = 0x0F,

    /// 32-bit color with alpha, stored as `B, G, R, A`.
    Argb8888 = 0x10,

    /// 32-bit color, stored as `B, G, R, 0xff`.
    Xrgb8888 = 0x11,

    /// 16-bit little endian color, 5 bits red, 6 bits green, 5 bits blue.
    Rgb565 = 0x12,

    /// 16-bit little endian color followed by an alpha byte, per pixel.
    Argb8565 = 0x13,

    /// 16-bit color rows, followed by a separate plane of 8-bit alpha rows.
    Rgb565A8 = 0x14,

    /// Like `Argb8888`, but the color channels are multiplied by alpha.
    Argb8888Premultiplied = 0x1A,

    /// Like `Rgb565`, but big endian.
    Rgb565Swapped = 0x1B,
}

/// The mutually exclusive kinds of color formats.
/// Importing and exporting images is dispatched on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {

    /// Pixels are indices into a palette of `BGRA` colors.
    Indexed,

    /// Pixels only contain opacity.
    AlphaOnly,

    /// Pixels only contain brightness.
    LumaOnly,

    /// Pixels contain red, green, blue and possibly alpha.
    Colormap,

    /// The data is not interpreted at all.
    Raw,
}


impl ColorFormat {

    /// All color formats, in the order of their tags.
    pub const ALL: [ColorFormat; 19] = [
        ColorFormat::Raw, ColorFormat::RawAlpha, ColorFormat::L8,
        ColorFormat::I1, ColorFormat::I2, ColorFormat::I4, ColorFormat::I8,
        ColorFormat::A1, ColorFormat::A2, ColorFormat::A4, ColorFormat::A8,
        ColorFormat::Rgb888, ColorFormat::Argb8888, ColorFormat::Xrgb8888,
        ColorFormat::Rgb565, ColorFormat::Argb8565, ColorFormat::Rgb565A8,
        ColorFormat::Argb8888Premultiplied, ColorFormat::Rgb565Swapped,
    ];

    /// The byte stored in the binary header.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up the color format of a header byte.
    /// Only the lower five bits are significant.
    pub fn from_tag(tag: u8) -> Result<Self> {
        let tag = tag & 0x1f;

        Self::ALL.iter().copied()
            .find(|format| format.tag() == tag)
            .ok_or_else(|| Error::format(format!("invalid color format: {:#04x}", tag)))
    }

    /// Number of bits per encoded pixel.
    /// For `Rgb565A8`, this excludes the separate alpha plane.
    /// Raw formats have no fixed pixel size and return zero.
    pub fn bits_per_pixel(self) -> usize {
        use self::ColorFormat::*;
        match self {
            Raw | RawAlpha => 0,
            I1 | A1 => 1,
            I2 | A2 => 2,
            I4 | A4 => 4,
            L8 | I8 | A8 => 8,
            Rgb565 | Rgb565Swapped | Rgb565A8 => 16,
            Rgb888 | Argb8565 => 24,
            Argb8888 | Xrgb8888 | Argb8888Premultiplied => 32,
        }
    }

    /// Number of colors in the palette, or zero if this format is not indexed.
    pub fn palette_size(self) -> usize {
        if self.is_indexed() { 1 << self.bits_per_pixel() } else { 0 }
    }

    /// Number of bytes of one block in run length encoding,
    /// which is the number of bytes one pixel occupies, rounded up.
    pub fn block_size(self) -> usize {
        crate::math::bytes_for_bits(self.bits_per_pixel())
    }

    /// Which kind of data the pixels contain.
    pub fn category(self) -> Category {
        use self::ColorFormat::*;
        match self {
            Raw | RawAlpha => Category::Raw,
            L8 => Category::LumaOnly,
            I1 | I2 | I4 | I8 => Category::Indexed,
            A1 | A2 | A4 | A8 => Category::AlphaOnly,

            Rgb888 | Argb8888 | Xrgb8888 | Rgb565 | Argb8565
                | Rgb565A8 | Argb8888Premultiplied | Rgb565Swapped => Category::Colormap,
        }
    }

    /// Whether the decoded pixels carry opacity.
    /// This includes indexed formats, as their palette stores alpha,
    /// and `Xrgb8888`, whose alpha is always opaque.
    pub fn has_alpha(self) -> bool {
        use self::ColorFormat::*;
        match self {
            RawAlpha | Argb8888 | Xrgb8888 | Argb8565 | Rgb565A8 | Argb8888Premultiplied => true,
            Raw | L8 | Rgb888 | Rgb565 | Rgb565Swapped => false,
            _ => self.is_indexed() || self.is_alpha_only(),
        }
    }

    /// Whether pixels are palette indices.
    pub fn is_indexed(self) -> bool { self.category() == Category::Indexed }

    /// Whether pixels only contain opacity.
    pub fn is_alpha_only(self) -> bool { self.category() == Category::AlphaOnly }

    /// Whether pixels only contain brightness.
    pub fn is_luma_only(self) -> bool { self.category() == Category::LumaOnly }

    /// Whether pixels contain red, green and blue.
    pub fn is_colormap(self) -> bool { self.category() == Category::Colormap }

    /// Whether the data is opaque to this crate.
    pub fn is_raw(self) -> bool { self.category() == Category::Raw }

    /// The conventional upper case name, as used in file names and C sources.
    pub fn name(self) -> &'static str {
        use self::ColorFormat::*;
        match self {
            Raw => "RAW",
            RawAlpha => "RAW_ALPHA",
            L8 => "L8",
            I1 => "I1", I2 => "I2", I4 => "I4", I8 => "I8",
            A1 => "A1", A2 => "A2", A4 => "A4", A8 => "A8",
            Rgb888 => "RGB888",
            Argb8888 => "ARGB8888",
            Xrgb8888 => "XRGB8888",
            Rgb565 => "RGB565",
            Argb8565 => "ARGB8565",
            Rgb565A8 => "RGB565A8",
            Argb8888Premultiplied => "ARGB8888_PREMULTIPLIED",
            Rgb565Swapped => "RGB565_SWAPPED",
        }
    }

    /// Look up a color format by its exact upper case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|format| format.name() == name)
    }

    /// The smallest indexed format whose palette can hold `color_count` colors.
    pub fn indexed_for_palette_len(color_count: usize) -> Self {
        match color_count {
            0 ..= 2 => ColorFormat::I1,
            3 ..= 4 => ColorFormat::I2,
            5 ..= 16 => ColorFormat::I4,
            _ => ColorFormat::I8,
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for ColorFormat {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| Error::format(format!("unknown color format name: {}", name)))
    }
}
