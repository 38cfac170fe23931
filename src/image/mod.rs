
//! The in-memory bitmap: format, dimensions, stride and the packed bytes.
//! Also contains the conversions from and to PNG, the binary container and C sources.

pub mod png;
pub mod bin;
pub mod rle_file;
pub mod c_array;
pub mod raw;

use std::fmt;
use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result, UnitResult, usize_to_u16};
use crate::meta::{ColorFormat, ImageHeader, Flags, minimum_stride, aligned_stride};

pub use self::png::PngImportOptions;
pub use self::raw::RawImage;


/// A packed bitmap, ready to be written to the binary container.
///
/// The data contains, in this order:
/// the palette of indexed formats as `B, G, R, A` quadruplets,
/// `height` rows of `stride` bytes,
/// and for `Rgb565A8` only, `height` alpha rows of `stride / 2` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    format: ColorFormat,
    width: u16,
    height: u16,
    stride: u16,
    premultiplied: bool,
    data: Vec<u8>,
}


impl Image {

    /// Create an image from packed data.
    /// A stride of zero selects the unpadded stride.
    /// Returns an error if the size does not fit into the header,
    /// if the stride is too small, or if the data length does not match the layout.
    pub fn from_data(format: ColorFormat, width: usize, height: usize, data: Vec<u8>, stride: usize) -> Result<Self> {
        if format.is_raw() {
            return Err(Error::format(format!("{} data has no pixel layout, use a raw image instead", format)));
        }

        if width > 0xffff || height > 0xffff {
            return Err(Error::parameter(format!("w, h overflow: {}x{}", width, height)));
        }

        let stride = if stride == 0 { minimum_stride(format, width) } else { stride };

        let minimum = minimum_stride(format, width);
        if stride < minimum {
            return Err(Error::parameter(format!("stride is too small: {}, minimal: {}", stride, minimum)));
        }

        let image = Image {
            format,
            width: usize_to_u16(width, "width")?,
            height: usize_to_u16(height, "height")?,
            stride: usize_to_u16(stride, "stride")?,
            premultiplied: false,
            data,
        };

        if image.data.len() != image.data_len() {
            return Err(Error::parameter(format!(
                "{} data length error got: {}, expect: {}",
                image, image.data.len(), image.data_len()
            )));
        }

        Ok(image)
    }

    /// Replace all contents of this image, with the same checks as `from_data`.
    /// The image is no longer considered premultiplied afterwards.
    pub fn set_data(&mut self, format: ColorFormat, width: usize, height: usize, data: Vec<u8>, stride: usize) -> UnitResult {
        *self = Image::from_data(format, width, height, data, stride)?;
        Ok(())
    }

    /// How the pixels are encoded.
    pub fn format(&self) -> ColorFormat { self.format }

    /// Number of pixels per row.
    pub fn width(&self) -> usize { usize::from(self.width) }

    /// Number of rows.
    pub fn height(&self) -> usize { usize::from(self.height) }

    /// Number of bytes per row, including padding.
    pub fn stride(&self) -> usize { usize::from(self.stride) }

    /// Whether `premultiply` has been applied to the pixels.
    pub fn is_premultiplied(&self) -> bool { self.premultiplied }

    /// All packed bytes: palette, rows and alpha rows.
    pub fn data(&self) -> &[u8] { &self.data }

    /// Take ownership of all packed bytes.
    pub fn into_data(self) -> Vec<u8> { self.data }

    /// The header that describes this image in a file, without the compression flag.
    pub fn header(&self) -> ImageHeader {
        ImageHeader {
            color_format: self.format,
            flags: Flags::default().with_premultiplied(self.premultiplied),
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    /// The number of data bytes, excluding the header.
    /// The palette is only counted if the image contains any pixels.
    pub fn data_len(&self) -> usize {
        self.alpha_range().end
    }

    /// The palette of indexed formats as `B, G, R, A` quadruplets. Empty for other formats.
    pub fn palette(&self) -> &[u8] {
        &self.data[self.palette_range()]
    }

    /// The palette entries as `R, G, B, A`.
    pub fn palette_colors(&self) -> impl Iterator<Item=[u8; 4]> + '_ {
        self.palette().chunks_exact(4).map(|entry| [entry[2], entry[1], entry[0], entry[3]])
    }

    /// All pixel rows, including their padding.
    pub fn rows(&self) -> &[u8] {
        &self.data[self.rows_range()]
    }

    /// A single pixel row, including its padding.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height() { return None; }

        let start = self.rows_range().start + y * self.stride();
        Some(&self.data[start .. start + self.stride()])
    }

    /// The separate alpha rows of `Rgb565A8`, each `stride / 2` bytes. Empty for other formats.
    pub fn alpha_rows(&self) -> &[u8] {
        &self.data[self.alpha_range()]
    }

    fn palette_range(&self) -> Range<usize> {
        let has_pixels = self.width != 0 && self.height != 0;
        let len = if has_pixels { self.format.palette_size() * 4 } else { 0 };
        0 .. len
    }

    fn rows_range(&self) -> Range<usize> {
        let start = self.palette_range().end;
        start .. start + self.stride() * self.height()
    }

    fn alpha_stride(&self) -> usize {
        if self.format == ColorFormat::Rgb565A8 { self.stride() / 2 } else { 0 }
    }

    fn alpha_range(&self) -> Range<usize> {
        let start = self.rows_range().end;
        start .. start + self.alpha_stride() * self.height()
    }

    /// The rows without padding, followed by the alpha rows without padding.
    /// This is the layout that `pixel::unpack` expects.
    pub(crate) fn unpadded_rows(&self) -> Vec<u8> {
        let width = self.width();
        let row_len = minimum_stride(self.format, width);
        let alpha_len = if self.format == ColorFormat::Rgb565A8 { width } else { 0 };

        let mut result = Vec::with_capacity((row_len + alpha_len) * self.height());
        if row_len == 0 { return result; }

        for row in self.rows().chunks_exact(self.stride()) {
            result.extend_from_slice(&row[.. row_len]);
        }

        if alpha_len != 0 {
            for row in self.alpha_rows().chunks_exact(self.alpha_stride()) {
                result.extend_from_slice(&row[.. alpha_len]);
            }
        }

        result
    }


    /// Change the stride, either directly, or by aligning the unpadded stride.
    /// A `stride` of zero selects the smallest stride that is a multiple of `alignment`.
    /// Each row is truncated or padded with zeroes. The palette stays unchanged.
    /// For `Rgb565A8`, the alpha rows are restrided separately, to half the new stride.
    pub fn adjust_stride(&mut self, stride: usize, alignment: usize) -> UnitResult {
        if self.stride == 0 {
            log::warn!("cannot adjust stride for empty image");
            return Ok(());
        }

        let stride = if stride == 0 { aligned_stride(self.format, self.width(), alignment)? } else { stride };
        if stride == self.stride() {
            return Ok(());
        }

        let minimum = minimum_stride(self.format, self.width());
        if stride < minimum {
            return Err(Error::parameter(format!("stride is too small: {}, minimal: {}", stride, minimum)));
        }

        let new_stride = usize_to_u16(stride, "stride")?;

        if self.data_len() == 0 {
            self.stride = new_stride;
            return Ok(());
        }

        let height = self.height();
        let mut data = Vec::with_capacity(self.data.len() / self.stride() * stride);

        data.extend_from_slice(self.palette());
        change_stride(self.rows(), height, self.stride(), stride, &mut data);

        if self.format == ColorFormat::Rgb565A8 {
            log::warn!("handle RGB565A8 alpha map");
            change_stride(self.alpha_rows(), height, self.alpha_stride(), stride / 2, &mut data);
        }

        self.stride = new_stride;
        self.data = data;
        debug_assert_eq!(self.data.len(), self.data_len(), "stride adjustment bug");

        Ok(())
    }


    /// Multiply the color channels by their alpha value.
    /// For indexed formats, only the palette is changed.
    /// Can only be applied once, and only to formats with a separate alpha value per color.
    pub fn premultiply(&mut self) -> UnitResult {
        if self.premultiplied {
            return Err(Error::parameter("image is already premultiplied"));
        }

        if !self.format.has_alpha() {
            return Err(Error::parameter(format!("{} has no alpha channel", self.format)));
        }

        // images without pixels have a stride of zero
        let width = self.width();
        let stride = self.stride().max(1);
        let rows_range = self.rows_range();

        use self::ColorFormat::*;
        match self.format {
            I1 | I2 | I4 | I8 => {
                let palette_range = self.palette_range();
                for entry in self.data[palette_range].chunks_exact_mut(4) {
                    premultiply_bgra(entry);
                }
            },

            Argb8888 => {
                for row in self.data[rows_range].chunks_exact_mut(stride) {
                    for pixel in row[.. width * 4].chunks_exact_mut(4) {
                        premultiply_bgra(pixel);
                    }
                }
            },

            Argb8565 => {
                for row in self.data[rows_range].chunks_exact_mut(stride) {
                    for pixel in row[.. width * 3].chunks_exact_mut(3) {
                        let color = premultiply_565(u16::from_le_bytes([pixel[0], pixel[1]]), pixel[2]);
                        pixel[.. 2].copy_from_slice(&color.to_le_bytes());
                    }
                }
            },

            Rgb565A8 => {
                let alpha_stride = self.alpha_stride().max(1);
                let (rows, alpha_rows) = self.data[rows_range.start ..].split_at_mut(rows_range.len());

                for (row, alpha_row) in rows.chunks_exact_mut(stride).zip(alpha_rows.chunks_exact(alpha_stride)) {
                    for (pixel, &alpha) in row[.. width * 2].chunks_exact_mut(2).zip(alpha_row) {
                        let color = premultiply_565(u16::from_le_bytes([pixel[0], pixel[1]]), alpha);
                        pixel.copy_from_slice(&color.to_le_bytes());
                    }
                }
            },

            Argb8888Premultiplied => return Err(Error::parameter(
                "ARGB8888_PREMULTIPLIED pixels are premultiplied when packed"
            )),

            _ => return Err(Error::parameter(format!("premultiply is not supported for {}", self.format))),
        }

        self.premultiplied = true;
        Ok(())
    }

    pub(crate) fn set_premultiplied(&mut self, premultiplied: bool) {
        self.premultiplied = premultiplied;
    }
}

impl fmt::Display for Image {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter, "bitmap {}x{}, {}, (12+{}) bytes",
            self.width, self.height, self.format, self.data_len()
        )
    }
}


/// Append `height` rows of `new_stride` bytes, taken from rows of `current_stride` bytes.
fn change_stride(rows: &[u8], height: usize, current_stride: usize, new_stride: usize, target: &mut Vec<u8>) {
    debug_assert!(rows.len() >= height * current_stride, "row count mismatch");

    for y in 0 .. height {
        let row = &rows[y * current_stride .. (y + 1) * current_stride];

        if new_stride <= current_stride {
            target.extend_from_slice(&row[.. new_stride]);
        }
        else {
            target.extend_from_slice(row);
            target.resize(target.len() + new_stride - current_stride, 0);
        }
    }
}

/// Scale the color of a `B, G, R, A` quadruplet by its alpha, dividing by 256.
fn premultiply_bgra(entry: &mut [u8]) {
    let alpha = u16::from(entry[3]);
    for channel in &mut entry[.. 3] {
        *channel = ((u16::from(*channel) * alpha) >> 8) as u8;
    }
}

/// Scale the 5-6-5 bit channels by the alpha value, dividing by 255.
fn premultiply_565(color: u16, alpha: u8) -> u16 {
    let alpha = u32::from(alpha);
    let scale = |channel: u16| ((u32::from(channel) * alpha) / 255) as u16;

    let red = scale((color >> 11) & 0x1f);
    let green = scale((color >> 5) & 0x3f);
    let blue = scale(color & 0x1f);

    (red << 11) | (green << 5) | blue
}


/// Fail unless the file name ends with the extension, ignoring case.
pub(crate) fn check_extension(path: &Path, extension: &str) -> UnitResult {
    let matches = path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.to_ascii_lowercase().ends_with(extension));

    if matches { Ok(()) }
    else { Err(Error::format(format!("filename not ended with {}", extension))) }
}

/// Create all missing parent directories of the file.
pub(crate) fn create_parent_directories(path: &Path) -> UnitResult {
    if let Some(directory) = path.parent() {
        if !directory.as_os_str().is_empty() && !directory.exists() {
            log::info!("mkdir of {} for {}", directory.display(), path.display());
            std::fs::create_dir_all(directory)?;
        }
    }

    Ok(())
}

/// The first inner segment of the file name that names a color format,
/// as in `logo.RGB565A8.png`.
pub fn format_from_file_name(path: &Path) -> Option<ColorFormat> {
    let name = path.file_name()?.to_str()?;
    let segments: Vec<&str> = name.split('.').collect();

    if segments.len() < 3 { return None; }
    segments[1 .. segments.len() - 1].iter().find_map(|segment| ColorFormat::from_name(segment))
}


#[cfg(test)]
mod test {
    use super::*;

    fn gradient(format: ColorFormat, width: usize, height: usize) -> Image {
        let stride = minimum_stride(format, width);
        let palette = format.palette_size() * 4;
        let alpha = if format == ColorFormat::Rgb565A8 { stride / 2 * height } else { 0 };
        let len = palette + stride * height + alpha;

        Image::from_data(format, width, height, (0 .. len).map(|index| index as u8).collect(), 0).unwrap()
    }

    #[test]
    fn data_length(){
        assert_eq!(gradient(ColorFormat::I1, 9, 3).data_len(), 8 + 2 * 3);
        assert_eq!(gradient(ColorFormat::Rgb565A8, 3, 2).data_len(), 6 * 2 + 3 * 2);
        assert_eq!(gradient(ColorFormat::Argb8888, 2, 2).data_len(), 16);

        let empty = Image::from_data(ColorFormat::I8, 0, 0, Vec::new(), 0).unwrap();
        assert_eq!(empty.data_len(), 0, "no palette without pixels");

        assert!(matches!(
            Image::from_data(ColorFormat::Rgb888, 2, 2, vec![ 0; 11 ], 0),
            Err(Error::Parameter(_))
        ));

        assert!(matches!(
            Image::from_data(ColorFormat::Rgb888, 0x10000, 0, Vec::new(), 0),
            Err(Error::Parameter(_))
        ));

        assert!(matches!(
            Image::from_data(ColorFormat::Raw, 1, 1, vec![ 0 ], 0),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn region_accessors(){
        let image = gradient(ColorFormat::I2, 5, 2);
        assert_eq!(image.palette(), &(0 .. 16).collect::<Vec<u8>>()[..]);
        assert_eq!(image.rows(), &[ 16, 17, 18, 19 ]);
        assert_eq!(image.row(1), Some(&[ 18_u8, 19 ][..]));
        assert_eq!(image.row(2), None);
        assert!(image.alpha_rows().is_empty());

        let colors: Vec<[u8; 4]> = image.palette_colors().collect();
        assert_eq!(colors[1], [ 6, 5, 4, 7 ]);

        let image = gradient(ColorFormat::Rgb565A8, 2, 2);
        assert_eq!(image.rows(), &[ 0, 1, 2, 3, 4, 5, 6, 7 ]);
        assert_eq!(image.alpha_rows(), &[ 8, 9, 10, 11 ]);
    }

    #[test]
    fn stride_roundtrip(){
        for &format in &[ ColorFormat::I4, ColorFormat::Rgb888, ColorFormat::Rgb565A8, ColorFormat::A1 ] {
            let original = gradient(format, 7, 5);
            let mut image = original.clone();

            image.adjust_stride(0, 16).unwrap();
            assert_eq!(image.stride() % 16, 0);
            assert_eq!(image.data().len(), image.data_len());
            assert_eq!(image.palette(), original.palette());

            let padded = image.clone();
            image.adjust_stride(image.stride(), 1).unwrap();
            assert_eq!(image, padded, "same stride is a no-op");

            image.adjust_stride(original.stride(), 1).unwrap();
            assert_eq!(image, original, "{}", format);
        }
    }

    #[test]
    fn stride_padding_is_zero(){
        let mut image = gradient(ColorFormat::Rgb565A8, 1, 2);
        image.adjust_stride(4, 1).unwrap();

        assert_eq!(image.rows(), &[ 0, 1, 0, 0,   2, 3, 0, 0 ]);
        assert_eq!(image.alpha_rows(), &[ 4, 0,   5, 0 ]);
        assert_eq!(image.unpadded_rows(), vec![ 0, 1, 2, 3, 4, 5 ]);
    }

    #[test]
    fn invalid_strides(){
        let mut image = gradient(ColorFormat::Argb8888, 3, 3);
        assert!(matches!(image.adjust_stride(11, 1), Err(Error::Parameter(_))));
        assert!(matches!(image.adjust_stride(0, 0), Err(Error::Parameter(_))));
        assert!(matches!(image.adjust_stride(0x10000, 1), Err(Error::Parameter(_))));
        assert_eq!(image, gradient(ColorFormat::Argb8888, 3, 3), "failed adjustments keep the data");

        let mut empty = Image::from_data(ColorFormat::Argb8888, 0, 0, Vec::new(), 0).unwrap();
        empty.adjust_stride(0, 64).unwrap();
        assert_eq!(empty.stride(), 0);

        let mut no_rows = Image::from_data(ColorFormat::Argb8888, 2, 0, Vec::new(), 0).unwrap();
        no_rows.adjust_stride(0, 64).unwrap();
        assert_eq!(no_rows.stride(), 64);
    }

    #[test]
    fn premultiply_palette(){
        let palette = vec![ 200, 100, 50, 128,   10, 20, 30, 255 ];
        let mut data = palette;
        data.push(0b0100_0000);

        let mut image = Image::from_data(ColorFormat::I1, 2, 1, data, 0).unwrap();
        image.premultiply().unwrap();

        assert!(image.is_premultiplied());
        assert!(image.header().flags.is_premultiplied());
        assert_eq!(image.palette(), &[ 100, 50, 25, 128,   9, 19, 29, 255 ]);
        assert_eq!(image.rows(), &[ 0b0100_0000 ], "indices are unchanged");
    }

    #[test]
    fn premultiply_pixels(){
        let mut image = Image::from_data(ColorFormat::Argb8888, 2, 1, vec![ 255, 128, 0, 64,   9, 9, 9, 9 ], 0).unwrap();
        image.premultiply().unwrap();
        assert_eq!(image.data(), &[ 63, 32, 0, 64,   0, 0, 0, 9 ]);

        let white = 0xffff_u16.to_le_bytes();
        let mut image = Image::from_data(ColorFormat::Rgb565A8, 1, 1, vec![ white[0], white[1], 0 ], 0).unwrap();
        image.premultiply().unwrap();
        assert_eq!(image.data(), &[ 0, 0, 0 ]);

        let mut image = Image::from_data(ColorFormat::Argb8565, 1, 1, vec![ white[0], white[1], 255 ], 0).unwrap();
        image.premultiply().unwrap();
        assert_eq!(image.data(), &[ 0xff, 0xff, 255 ], "opaque pixels keep their color");
    }

    #[test]
    fn premultiply_only_once(){
        let mut image = gradient(ColorFormat::Argb8888, 2, 2);
        image.premultiply().unwrap();
        assert!(matches!(image.premultiply(), Err(Error::Parameter(_))));

        let mut image = gradient(ColorFormat::Rgb565, 2, 2);
        assert!(matches!(image.premultiply(), Err(Error::Parameter(_))));
        assert!(!image.is_premultiplied());

        let mut image = gradient(ColorFormat::A8, 2, 2);
        assert!(matches!(image.premultiply(), Err(Error::Parameter(_))));
    }

    #[test]
    fn file_names(){
        assert_eq!(format_from_file_name(Path::new("icons/logo.RGB565A8.png")), Some(ColorFormat::Rgb565A8));
        assert_eq!(format_from_file_name(Path::new("logo.small.A4.png")), Some(ColorFormat::A4));
        assert_eq!(format_from_file_name(Path::new("RGB565.png")), None);
        assert_eq!(format_from_file_name(Path::new("logo.png")), None);

        assert!(check_extension(Path::new("out/logo.BIN"), ".bin").is_ok());
        assert!(matches!(check_extension(Path::new("out/logo.png"), ".bin"), Err(Error::Format(_))));
    }
}
