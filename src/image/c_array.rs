
//! Emit images as C source files, which contain the data as a byte array
//! and an image descriptor referencing it.

use std::path::Path;

use super::{Image, check_extension, create_parent_directories};
use crate::compression::{Compression, CompressMethod};
use crate::error::{Error, Result, UnitResult};


const PREAMBLE: &str = r#"
#if defined(LV_LVGL_H_INCLUDE_SIMPLE)
#include "lvgl.h"
#elif defined(LV_BUILD_TEST)
#include "../lvgl.h"
#else
#include "lvgl/lvgl.h"
#endif


#ifndef LV_ATTRIBUTE_MEM_ALIGN
#define LV_ATTRIBUTE_MEM_ALIGN
#endif

#ifndef LV_ATTRIBUTE_IMG_DUST
#define LV_ATTRIBUTE_IMG_DUST
#endif

static const
LV_ATTRIBUTE_MEM_ALIGN LV_ATTRIBUTE_LARGE_CONST LV_ATTRIBUTE_IMG_DUST
"#;

/// Palettes and compressed data use this many bytes per line.
const BYTES_PER_LINE: usize = 16;


impl Image {

    /// Write this image as a C source file. The file name must end with `.c`.
    /// The variable is named after the file, up to the first dot.
    /// Missing directories are created.
    pub fn to_c_array(&self, path: impl AsRef<Path>, compression: impl Into<Compression>) -> UnitResult {
        let path = path.as_ref();
        check_extension(path, ".c")?;
        create_parent_directories(path)?;

        let source = self.to_c_source(&variable_name(path)?, compression)?;
        std::fs::write(path, source)?;

        log::info!("to c array: {}, {}", path.display(), self);
        Ok(())
    }

    /// The C source that declares this image as a variable of the specified name.
    /// Uncompressed data is written one row per line.
    pub fn to_c_source(&self, name: &str, compression: impl Into<Compression>) -> Result<String> {
        let compression = compression.into();
        let mut source = begin_c_array(name);

        let mut flags = String::from("0");
        if self.is_premultiplied() { flags += " | LV_IMAGE_FLAGS_PREMULTIPLIED"; }

        let data_size = if compression.method == CompressMethod::None {
            push_c_bytes(&mut source, self.palette(), BYTES_PER_LINE);
            push_c_bytes(&mut source, self.rows(), self.stride());
            push_c_bytes(&mut source, self.alpha_rows(), self.stride() / 2);
            self.data_len()
        }
        else {
            flags += " | LV_IMAGE_FLAGS_COMPRESSED";

            let payload = compression.compress(self.data(), self.format().block_size())?.to_bytes()?;
            push_c_bytes(&mut source, &payload, BYTES_PER_LINE);
            payload.len()
        };

        source += &format!(
            "\n}};\n\nconst lv_img_dsc_t {name} = {{\n\
            \x20 .header.magic = LV_IMAGE_HEADER_MAGIC,\n\
            \x20 .header.cf = LV_COLOR_FORMAT_{format},\n\
            \x20 .header.flags = {flags},\n\
            \x20 .header.w = {width},\n\
            \x20 .header.h = {height},\n\
            \x20 .header.stride = {stride},\n\
            \x20 .data_size = {data_size},\n\
            \x20 .data = {name}_map,\n\
            }};\n\n",
            name = name, format = self.format(), flags = flags,
            width = self.width(), height = self.height(), stride = self.stride(),
            data_size = data_size,
        );

        Ok(source)
    }
}


/// The variable name for a C file: the file name up to the first dot, with dashes replaced.
pub(crate) fn variable_name(path: &Path) -> Result<String> {
    let name = path.file_name().and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::format(format!("no variable name in {}", path.display())))?;

    Ok(name.replace('-', "_"))
}

/// The includes, attributes and the opening of the byte array.
pub(crate) fn begin_c_array(name: &str) -> String {
    format!("{}uint8_t {}_map[] = {{\n", PREAMBLE, name)
}

/// Append the bytes as hexadecimal literals, starting a new line every `per_line` bytes.
pub(crate) fn push_c_bytes(source: &mut String, bytes: &[u8], per_line: usize) {
    if bytes.is_empty() { return; }

    for (index, byte) in bytes.iter().enumerate() {
        if index % per_line.max(1) == 0 { source.push_str("\n    "); }
        source.push_str(&format!("0x{:02x},", byte));
    }

    source.push('\n');
}
