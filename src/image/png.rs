
//! Import PNG images into any color format, and export images back to PNG.

use std::borrow::Cow;
use std::path::Path;

use png::{BitDepth, ColorType, Transformations};

use super::{Image, check_extension, create_parent_directories, format_from_file_name};
use crate::error::{Error, Result, UnitResult, u32_to_usize};
use crate::meta::{ColorFormat, Category};
use crate::pixel::{self, Packer, Background, pack_bits, unpack_bits};
use crate::quantize::Quantizer;


/// How to convert the pixels of a PNG image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PngImportOptions {

    /// The target format. If none, an indexed format is chosen by the palette size.
    pub format: Option<ColorFormat>,

    /// Transparent pixels are blended onto this color for formats without alpha.
    pub background: Background,

    /// Apply ordered dithering when reducing to 16-bit colors.
    pub dither: bool,
}

impl PngImportOptions {

    /// Convert to the specified format.
    pub fn with_format(self, format: impl Into<Option<ColorFormat>>) -> Self {
        PngImportOptions { format: format.into(), ..self }
    }

    /// Blend transparent pixels onto the specified `0xRRGGBB` color.
    pub fn with_background(self, background: u32) -> Self {
        PngImportOptions { background: Background(background), ..self }
    }

    /// Enable or disable ordered dithering.
    pub fn with_dither(self, dither: bool) -> Self {
        PngImportOptions { dither, ..self }
    }
}


/// Pixels decoded to 8-bit `R, G, B, A`.
struct RgbaPixels {
    width: usize,
    height: usize,
    has_alpha: bool,
    rgba: Vec<u8>,
}

/// Palette indices, one byte per pixel, and the palette as `R, G, B, A`.
struct IndexedPixels {
    width: usize,
    height: usize,
    palette: Vec<[u8; 4]>,
    indices: Vec<u8>,
}


impl Image {

    /// Import a PNG file. If the options do not specify a format,
    /// the file name is searched for a format name first, as in `logo.RGB565A8.png`.
    /// The quantizer is only invoked for indexed formats, when the file has no suitable palette.
    pub fn from_png(path: impl AsRef<Path>, options: PngImportOptions, quantizer: &impl Quantizer) -> Result<Self> {
        let path = path.as_ref();
        let format = options.format.or_else(|| format_from_file_name(path));

        let bytes = std::fs::read(path)?;
        let image = Image::from_png_bytes(&bytes, options.with_format(format), quantizer)?;

        log::info!("from png: {}, cf: {}", path.display(), image.format());
        Ok(image)
    }

    /// Import the bytes of a PNG image.
    pub fn from_png_bytes(bytes: &[u8], options: PngImportOptions, quantizer: &impl Quantizer) -> Result<Self> {
        let format = match options.format {
            None => return png_to_indexed(bytes, None, quantizer),
            Some(format) => format,
        };

        match format.category() {
            Category::Indexed => png_to_indexed(bytes, Some(format), quantizer),
            Category::AlphaOnly => png_to_alpha_only(bytes, format),
            Category::LumaOnly | Category::Colormap => png_to_packed(bytes, format, options),
            Category::Raw => Err(Error::format(format!("{} data cannot be imported from png", format))),
        }
    }

    /// Write this image to a PNG file. The file name must end with `.png`.
    /// Missing directories are created.
    pub fn to_png(&self, path: impl AsRef<Path>) -> UnitResult {
        let path = path.as_ref();
        check_extension(path, ".png")?;
        create_parent_directories(path)?;

        std::fs::write(path, self.to_png_bytes()?)?;
        log::info!("to png: {}, cf: {}", path.display(), self.format());
        Ok(())
    }

    /// Encode this image as PNG. Palettes are kept.
    /// Alpha-only images become black with the original transparency.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let image = if self.stride() == super::minimum_stride(self.format(), self.width()) {
            Cow::Borrowed(self)
        }
        else {
            let mut image = self.clone();
            image.adjust_stride(0, 1)?;
            Cow::Owned(image)
        };

        let format = image.format();
        let bits = format.bits_per_pixel();
        let (width, height) = (image.width(), image.height());

        match format.category() {
            Category::Indexed => {
                let colors: Vec<[u8; 4]> = image.palette_colors().collect();
                let palette = colors.iter().flat_map(|&[red, green, blue, _]| vec![ red, green, blue ]).collect();
                let alpha = colors.iter().map(|&[_, _, _, alpha]| alpha).collect();

                // packed rows of the same bit depth, so no conversion is required
                encode_png(width, height, ColorType::Indexed, bits, Some((palette, alpha)), image.rows())
            },

            Category::AlphaOnly => {
                let alpha = pixel::unpack(&image.unpadded_rows(), format, width)?;
                let rgba: Vec<u8> = alpha.iter().flat_map(|&alpha| vec![ 0, 0, 0, alpha ]).collect();
                encode_png(width, height, ColorType::Rgba, 8, None, &rgba)
            },

            Category::LumaOnly => {
                encode_png(width, height, ColorType::Grayscale, bits, None, image.rows())
            },

            Category::Colormap => {
                let samples = pixel::unpack(&image.unpadded_rows(), format, width)?;
                let color_type = if format.has_alpha() { ColorType::Rgba } else { ColorType::Rgb };
                encode_png(width, height, color_type, 8, None, &samples)
            },

            Category::Raw => Err(Error::format(format!("{} data cannot be exported to png", format))),
        }
    }
}


fn png_to_indexed(bytes: &[u8], format: Option<ColorFormat>, quantizer: &impl Quantizer) -> Result<Image> {
    let wanted_colors = format.map_or(256, ColorFormat::palette_size);

    // keep the existing palette if it fits exactly, or if the format is chosen by palette size
    let existing = decode_indexed(bytes)?.filter(|pixels| match format {
        None => pixels.palette.len() <= 256,
        Some(format) => pixels.palette.len() == format.palette_size(),
    });

    let IndexedPixels { width, height, mut palette, indices } = match existing {
        Some(pixels) => pixels,
        None => {
            let quantized = quantizer.quantize(bytes, wanted_colors)?;
            decode_indexed(&quantized)?
                .ok_or_else(|| Error::external("quantizer", "result has no palette"))?
        },
    };

    let format = format.unwrap_or_else(|| ColorFormat::indexed_for_palette_len(palette.len()));
    let palette_size = format.palette_size();

    if palette.len() > palette_size {
        return Err(Error::format(format!("palette of {} colors does not fit into {}", palette.len(), format)));
    }

    if palette.len() != palette_size {
        log::warn!("palette: {}, extended to: {}", palette.len(), palette_size);
        palette.resize(palette_size, [ 255, 255, 255, 0 ]);
    }

    let bits = format.bits_per_pixel();
    let mut data = Vec::with_capacity(palette_size * 4 + super::minimum_stride(format, width) * height);

    for [red, green, blue, alpha] in palette {
        data.extend_from_slice(&[ blue, green, red, alpha ]);
    }

    if width != 0 {
        for row in indices.chunks_exact(width) {
            pack_bits(row.iter().copied(), bits, &mut data);
        }
    }

    Image::from_data(format, width, height, data, 0)
}

fn png_to_alpha_only(bytes: &[u8], format: ColorFormat) -> Result<Image> {
    let pixels = decode_rgba(bytes)?;
    if !pixels.has_alpha {
        return Err(Error::format("png has no alpha channel"));
    }

    let packer = Packer::new(format, Background::BLACK, false)?;
    let data = packer.pack_image(&pixels.rgba, pixels.width, pixels.height);
    Image::from_data(format, pixels.width, pixels.height, data, 0)
}

fn png_to_packed(bytes: &[u8], format: ColorFormat, options: PngImportOptions) -> Result<Image> {
    let pixels = decode_rgba(bytes)?;
    let packer = Packer::new(format, options.background, options.dither)?;
    let data = packer.pack_image(&pixels.rgba, pixels.width, pixels.height);
    Image::from_data(format, pixels.width, pixels.height, data, 0)
}


/// Decode the palette indices, or return none if the image is not palette based.
fn decode_indexed(bytes: &[u8]) -> Result<Option<IndexedPixels>> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::IDENTITY);

    let mut reader = decoder.read_info()?;
    let info = reader.info().clone();

    if info.color_type != ColorType::Indexed {
        return Ok(None);
    }

    let rgb_palette = info.palette.as_ref()
        .ok_or_else(|| Error::format("png has no palette"))?;

    let transparency: &[u8] = info.trns.as_ref().map_or(&[], |trns| &trns[..]);

    let palette = rgb_palette.chunks_exact(3).enumerate()
        .map(|(index, rgb)| [ rgb[0], rgb[1], rgb[2], transparency.get(index).copied().unwrap_or(255) ])
        .collect();

    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;

    let width = u32_to_usize(frame.width);
    let height = u32_to_usize(frame.height);
    let bits = frame.bit_depth as usize;

    let mut indices = Vec::with_capacity(width * height);
    for row in buffer.chunks_exact(frame.line_size).take(height) {
        indices.extend(unpack_bits(row, bits, width));
    }

    Ok(Some(IndexedPixels { width, height, palette, indices }))
}

/// Decode any PNG image to 8-bit `R, G, B, A`.
/// Palettes and transparency chunks are expanded, 16-bit samples are reduced.
fn decode_rgba(bytes: &[u8]) -> Result<RgbaPixels> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

    let mut reader = decoder.read_info()?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    buffer.truncate(frame.buffer_size());

    let width = u32_to_usize(frame.width);
    let height = u32_to_usize(frame.height);

    let (rgba, has_alpha) = match frame.color_type {
        ColorType::Rgba => (buffer, true),
        ColorType::Rgb => (buffer.chunks_exact(3).flat_map(|rgb| vec![ rgb[0], rgb[1], rgb[2], 255 ]).collect(), false),
        ColorType::GrayscaleAlpha => (buffer.chunks_exact(2).flat_map(|la| vec![ la[0], la[0], la[0], la[1] ]).collect(), true),
        ColorType::Grayscale => (buffer.iter().flat_map(|&luma| vec![ luma, luma, luma, 255 ]).collect(), false),
        ColorType::Indexed => return Err(Error::format("png palette was not expanded")),
    };

    debug_assert_eq!(rgba.len(), width * height * 4, "png decoding bug");
    Ok(RgbaPixels { width, height, has_alpha, rgba })
}

fn encode_png(
    width: usize, height: usize, color_type: ColorType, bits: usize,
    palette: Option<(Vec<u8>, Vec<u8>)>, data: &[u8]
) -> Result<Vec<u8>>
{
    let depth = BitDepth::from_u8(bits as u8)
        .ok_or_else(|| Error::parameter(format!("invalid png bit depth: {}", bits)))?;

    let mut output = Vec::new();

    {
        let mut encoder = png::Encoder::new(&mut output, width as u32, height as u32);
        encoder.set_color(color_type);
        encoder.set_depth(depth);

        if let Some((palette, alpha)) = palette {
            encoder.set_palette(palette);
            if !alpha.is_empty() { encoder.set_trns(alpha); }
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(data)?;
        writer.finish()?;
    }

    Ok(output)
}
