
//! Opaque image files, such as JPEG or PNG files, that are decoded on the device.

use std::path::Path;

use super::{check_extension, create_parent_directories};
use super::c_array::{variable_name, begin_c_array, push_c_bytes};
use crate::error::{Error, Result, UnitResult};
use crate::meta::ColorFormat;


/// The unmodified bytes of an encoded image file.
/// There is no header, stride or palette, only the format tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    format: ColorFormat,
    data: Vec<u8>,
}

impl RawImage {

    /// Wrap the bytes. The format must be `Raw` or `RawAlpha`.
    pub fn from_bytes(format: ColorFormat, data: Vec<u8>) -> Result<Self> {
        if !format.is_raw() {
            return Err(Error::parameter(format!("{} is not a raw format", format)));
        }

        Ok(RawImage { format, data })
    }

    /// Read the complete file.
    pub fn from_file(path: impl AsRef<Path>, format: ColorFormat) -> Result<Self> {
        let path = path.as_ref();
        let image = RawImage::from_bytes(format, std::fs::read(path)?)?;

        log::info!("from raw: {}, cf: {}, {} bytes", path.display(), format, image.data.len());
        Ok(image)
    }

    /// Either `Raw` or `RawAlpha`.
    pub fn format(&self) -> ColorFormat { self.format }

    /// The bytes of the encoded file.
    pub fn data(&self) -> &[u8] { &self.data }

    /// Write the bytes as a C source file. The file name must end with `.c`.
    pub fn to_c_array(&self, path: impl AsRef<Path>) -> UnitResult {
        let path = path.as_ref();
        check_extension(path, ".c")?;
        create_parent_directories(path)?;

        std::fs::write(path, self.to_c_source(&variable_name(path)?))?;
        log::info!("to c array: {}, cf: {}", path.display(), self.format);
        Ok(())
    }

    /// The C source that declares these bytes as a variable of the specified name.
    pub fn to_c_source(&self, name: &str) -> String {
        let mut source = begin_c_array(name);
        push_c_bytes(&mut source, &self.data, 16);

        source += &format!(
            "\n}};\n\nconst lv_img_dsc_t {name} = {{\n\
            \x20 .header.magic = LV_IMAGE_HEADER_MAGIC,\n\
            \x20 .header.cf = LV_COLOR_FORMAT_{format},\n\
            \x20 .data_size = {data_size},\n\
            \x20 .data = {name}_map,\n\
            }};\n\n",
            name = name, format = self.format, data_size = self.data.len(),
        );

        source
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_raw_formats(){
        assert!(RawImage::from_bytes(ColorFormat::RawAlpha, vec![ 0x89, b'P', b'N', b'G' ]).is_ok());
        assert!(matches!(RawImage::from_bytes(ColorFormat::Argb8888, Vec::new()), Err(Error::Parameter(_))));
    }

    #[test]
    fn c_source(){
        let image = RawImage::from_bytes(ColorFormat::Raw, (0 .. 20).collect()).unwrap();
        let source = image.to_c_source("photo");

        assert!(source.contains("uint8_t photo_map[] = {\n"));
        assert!(source.contains("0x0e,0x0f,\n    0x10,"), "sixteen bytes per line");
        assert!(source.contains("  .header.cf = LV_COLOR_FORMAT_RAW,\n  .data_size = 20,\n"));
    }
}
