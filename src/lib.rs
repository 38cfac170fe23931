
//! Convert PNG files to and from the compact bitmap container of embedded graphics libraries.
//!
//! An [`Image`](image::Image) holds a twelve byte header and the raw pixel data,
//! which consists of an optional palette, the rows of pixels, and optional alpha rows.
//! It can be imported from PNG files, restrided, premultiplied, and written
//! as a binary container, a C source file, a run length file or a PNG file again.
//!
//! Start with the `prelude`:
//!
//! ```no_run
//! use lvimg::prelude::*;
//!
//! let options = PngImportOptions::default().with_format(ColorFormat::Rgb565);
//! let mut image = Image::from_png("logo.png", options, &PngQuant::default())?;
//!
//! image.adjust_stride(0, 4)?;
//! image.to_bin("out/logo.bin", CompressMethod::Lz4)?;
//! # Ok::<(), lvimg::error::Error>(())
//! ```

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,

    clippy::all,
)]

#![forbid(unsafe_code)]
#![warn(missing_docs)]


pub mod io;
pub mod math;
pub mod error;
pub mod meta;
pub mod pixel;
pub mod compression;
pub mod image;
pub mod quantize;
pub mod convert;

#[macro_use]
extern crate smallvec;


/// Export the most important items from `lvimg`.
/// _Note: This includes a type called `Result`, possibly overwriting the default `std::Result` type usage._
pub mod prelude {

    // main exports
    pub use crate::image::{Image, RawImage, PngImportOptions};
    pub use crate::convert::{ConvertOptions, OutputFormat};

    // core data types
    pub use crate::meta::{ColorFormat, ImageHeader};
    pub use crate::compression::{Compression, CompressMethod};
    pub use crate::pixel::Background;
    pub use crate::quantize::{Quantizer, PngQuant};

    // secondary data types
    pub use crate::meta;
    pub use crate::error::{self, Error, Result, UnitResult};
}
