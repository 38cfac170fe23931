
//! Convert `R, G, B, A` pixels to the packed layout of a color format.

use smallvec::SmallVec;
use crate::error::{Error, Result};
use crate::meta::{ColorFormat, Category};
use super::{dither::dither_565, pack_bits};


/// One packed pixel, without any separately stored alpha.
pub type PackedPixel = SmallVec<[u8; 4]>;

/// The color that transparent pixels are blended onto
/// when the target format cannot store alpha. Stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Background(pub u32);

impl Background {

    /// Black.
    pub const BLACK: Background = Background(0x00_00_00);

    /// The red, green and blue channel of this color.
    pub fn channels(self) -> [u8; 3] {
        [ (self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8 ]
    }

    /// Blend the pixel onto this background. Returns the red, green and blue channel.
    /// Uses a division by 256, so even opaque channels may lose their lowest value.
    pub fn composite(self, [red, green, blue, alpha]: [u8; 4]) -> [u8; 3] {
        let [background_red, background_green, background_blue] = self.channels();
        let alpha = u32::from(alpha);

        let blend = |channel: u8, background: u8| {
            ((u32::from(channel) * alpha + (255 - alpha) * u32::from(background)) >> 8) as u8
        };

        [ blend(red, background_red), blend(green, background_green), blend(blue, background_blue) ]
    }
}


/// Packs `R, G, B, A` pixels into one specific non-indexed color format.
/// Indexed pixels are produced from a palette instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packer {
    format: ColorFormat,
    background: Background,
    dither: bool,
}

impl Packer {

    /// Create a packer for the specified target format.
    /// Dithering only affects 16-bit color formats.
    pub fn new(format: ColorFormat, background: Background, dither: bool) -> Result<Self> {
        match format.category() {
            Category::Indexed => Err(Error::parameter(format!("{} pixels are packed from a palette", format))),
            Category::Raw => Err(Error::parameter(format!("{} data cannot be packed", format))),
            _ => Ok(Packer { format, background, dither }),
        }
    }

    /// The target format of this packer.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Pack all pixels of an image, given as rows of `R, G, B, A` bytes.
    /// Returns rows of the unpadded stride, followed by the alpha rows for `Rgb565A8`.
    pub fn pack_image(&self, rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
        debug_assert_eq!(rgba.len(), width * height * 4, "pixel count mismatch");

        let bits = self.format.bits_per_pixel();
        let mut packed = Vec::with_capacity(crate::math::bytes_for_bits(width * bits) * height);
        let mut alpha_plane = Vec::new();

        if width == 0 {
            return packed;
        }

        for (y, row) in rgba.chunks_exact(width * 4).enumerate() {
            let pixels = row.chunks_exact(4).map(|pixel| [pixel[0], pixel[1], pixel[2], pixel[3]]);

            match self.format.category() {
                Category::AlphaOnly if bits < 8 => pack_bits(
                    pixels.map(|[_, _, _, alpha]| alpha >> (8 - bits)),
                    bits, &mut packed
                ),

                _ => for (x, pixel) in pixels.enumerate() {
                    packed.extend_from_slice(&self.pack_pixel(x, y, pixel));

                    if self.format == ColorFormat::Rgb565A8 {
                        alpha_plane.push(pixel[3]);
                    }
                },
            }
        }

        packed.extend_from_slice(&alpha_plane);
        packed
    }

    /// Pack a single pixel at the specified position.
    /// The position selects the dithering threshold.
    /// Sub-byte alpha formats are not handled here, as they share bytes between pixels.
    pub fn pack_pixel(&self, x: usize, y: usize, pixel: [u8; 4]) -> PackedPixel {
        let [red, green, blue, alpha] = pixel;

        use self::ColorFormat::*;
        match self.format {
            A8 | A4 | A2 | A1 => smallvec![ alpha >> (8 - self.format.bits_per_pixel()) ],

            L8 => smallvec![ luma(self.background.composite(pixel)) ],

            Argb8888 => smallvec![ blue, green, red, alpha ],

            Argb8888Premultiplied => {
                let multiply = |channel: u8| ((u16::from(channel) * u16::from(alpha)) >> 8) as u8;
                smallvec![ multiply(blue), multiply(green), multiply(red), alpha ]
            },

            Xrgb8888 => {
                let [red, green, blue] = self.background.composite(pixel);
                smallvec![ blue, green, red, 0xff ]
            },

            Rgb888 => {
                let [red, green, blue] = self.background.composite(pixel);
                smallvec![ blue, green, red ]
            },

            Rgb565 => {
                let color = self.color_565(x, y, self.background.composite(pixel));
                SmallVec::from_slice(&color.to_le_bytes())
            },

            Rgb565Swapped => {
                let color = self.color_565(x, y, self.background.composite(pixel));
                SmallVec::from_slice(&color.to_be_bytes())
            },

            Rgb565A8 => {
                let color = self.color_565(x, y, [red, green, blue]);
                SmallVec::from_slice(&color.to_le_bytes())
            },

            Argb8565 => {
                let [low, high] = self.color_565(x, y, [red, green, blue]).to_le_bytes();
                smallvec![ low, high, alpha ]
            },

            I1 | I2 | I4 | I8 | Raw | RawAlpha => unreachable!("rejected when creating the packer"),
        }
    }

    fn color_565(&self, x: usize, y: usize, color: [u8; 3]) -> u16 {
        let [red, green, blue] = if self.dither { dither_565(x, y, color) } else { color };
        (u16::from(red >> 3) << 11) | (u16::from(green >> 2) << 5) | u16::from(blue >> 3)
    }
}


/// Perceived brightness of an sRGB color, computed in linear space and converted back to sRGB.
pub fn luma([red, green, blue]: [u8; 3]) -> u8 {
    let linear = |channel: u8| srgb_to_linear(f64::from(channel) / 255.0);
    let luminance = 0.2126 * linear(red) + 0.7152 * linear(green) + 0.0722 * linear(blue);
    (linear_to_srgb(luminance) * 255.0) as u8
}

fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.040_448_236_277_108_2 { value / 12.92 }
    else { ((value + 0.055) / 1.055).powf(2.4) }
}

fn linear_to_srgb(value: f64) -> f64 {
    if value > 0.003_130_8 { 1.055 * value.powf(1.0 / 2.4) - 0.055 }
    else { 12.92 * value }
}
