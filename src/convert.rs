
//! Convert a PNG file to one of the output files in a single step.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::compression::{Compression, CompressMethod};
use crate::error::{Error, Result};
use crate::image::{Image, PngImportOptions};
use crate::meta::ColorFormat;
use crate::pixel::Background;
use crate::quantize::Quantizer;


/// Which file to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {

    /// The binary container, `.bin`.
    Bin,

    /// A C source file, `.c`.
    CArray,

    /// A PNG file, `.png`, decoded from the converted pixels.
    /// Useful to preview the effect of a color format.
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self { OutputFormat::Bin }
}

impl OutputFormat {

    /// The file extension, including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Bin => ".bin",
            OutputFormat::CArray => ".c",
            OutputFormat::Png => ".png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            OutputFormat::Bin => "BIN",
            OutputFormat::CArray => "C",
            OutputFormat::Png => "PNG",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BIN" => Ok(OutputFormat::Bin),
            "C" => Ok(OutputFormat::CArray),
            "PNG" => Ok(OutputFormat::Png),
            _ => Err(Error::parameter(format!("invalid output format: {}", name))),
        }
    }
}


/// Everything that controls the conversion of a PNG file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {

    /// The target color format. If none, the file name is searched for a format name,
    /// and otherwise an indexed format is chosen by palette size.
    pub format: Option<ColorFormat>,

    /// Transparent pixels are blended onto this color for formats without alpha.
    pub background: Background,

    /// Apply ordered dithering when reducing to 16-bit colors.
    pub dither: bool,

    /// Each row is padded to a multiple of this many bytes.
    pub alignment: usize,

    /// Multiply colors by their alpha value before writing.
    pub premultiply: bool,

    /// How to compress binary and C array outputs.
    pub compression: Compression,

    /// Which file to produce.
    pub output: OutputFormat,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            format: Some(ColorFormat::I8),
            background: Background::BLACK,
            dither: false,
            alignment: 1,
            premultiply: false,
            compression: Compression::default(),
            output: OutputFormat::default(),
        }
    }
}

impl ConvertOptions {

    /// Convert to the specified format, or choose automatically if none.
    pub fn with_format(self, format: impl Into<Option<ColorFormat>>) -> Self {
        ConvertOptions { format: format.into(), ..self }
    }

    /// Blend transparent pixels onto the specified `0xRRGGBB` color.
    pub fn with_background(self, background: u32) -> Self {
        ConvertOptions { background: Background(background), ..self }
    }

    /// Enable or disable ordered dithering.
    pub fn with_dither(self, dither: bool) -> Self {
        ConvertOptions { dither, ..self }
    }

    /// Pad each row to a multiple of this many bytes.
    pub fn with_alignment(self, alignment: usize) -> Self {
        ConvertOptions { alignment, ..self }
    }

    /// Enable or disable premultiplication.
    pub fn with_premultiply(self, premultiply: bool) -> Self {
        ConvertOptions { premultiply, ..self }
    }

    /// Compress with the specified method or configuration.
    pub fn with_compression(self, compression: impl Into<Compression>) -> Self {
        ConvertOptions { compression: compression.into(), ..self }
    }

    /// Produce the specified file type.
    pub fn with_output(self, output: OutputFormat) -> Self {
        ConvertOptions { output, ..self }
    }

    /// The options for importing the PNG file.
    pub fn import_options(&self) -> PngImportOptions {
        PngImportOptions { format: self.format, background: self.background, dither: self.dither }
    }

    /// Import the PNG bytes and apply stride alignment and premultiplication.
    pub fn prepare(&self, png: &[u8], quantizer: &impl Quantizer) -> Result<Image> {
        let image = Image::from_png_bytes(png, self.import_options(), quantizer)?;
        self.finish(image)
    }

    fn finish(&self, mut image: Image) -> Result<Image> {
        image.adjust_stride(0, self.alignment)?;
        if self.premultiply { image.premultiply()?; }
        Ok(image)
    }

    /// Convert the PNG file to a file of the same name in the output directory.
    /// Returns the path of the written file and the converted image.
    pub fn convert_png(&self, input: impl AsRef<Path>, output_directory: impl AsRef<Path>, quantizer: &impl Quantizer) -> Result<(PathBuf, Image)> {
        let input = input.as_ref();

        let image = Image::from_png(input, self.import_options(), quantizer)?;
        let image = self.finish(image)?;

        let stem = input.file_stem()
            .ok_or_else(|| Error::format(format!("no file name in {}", input.display())))?;

        let mut file_name = stem.to_os_string();
        file_name.push(self.output.extension());
        let output = output_directory.as_ref().join(file_name);

        match self.output {
            OutputFormat::Bin => image.to_bin(&output, self.compression)?,
            OutputFormat::CArray => image.to_c_array(&output, self.compression)?,
            OutputFormat::Png => image.to_png(&output)?,
        }

        log::info!("len: {} for {}", image.data_len(), input.display());
        Ok((output, image))
    }
}

impl From<CompressMethod> for ConvertOptions {
    fn from(method: CompressMethod) -> Self {
        ConvertOptions::default().with_compression(method)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_names(){
        assert_eq!("c".parse::<OutputFormat>().unwrap(), OutputFormat::CArray);
        assert_eq!(OutputFormat::Png.to_string().parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!("jpg".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn builder(){
        let options = ConvertOptions::default()
            .with_format(None)
            .with_alignment(4)
            .with_compression(CompressMethod::Lz4)
            .with_background(0xff_00_00);

        assert_eq!(options.format, None);
        assert_eq!(options.compression.method, CompressMethod::Lz4);
        assert_eq!(options.import_options().background, Background(0xff_00_00));
    }
}
