
//! Describes the layout of a binary bitmap:
//! the color format table and the fixed size header.

pub mod color_format;
pub mod header;

pub use self::color_format::{ColorFormat, Category};
pub use self::header::{ImageHeader, Flags, minimum_stride, aligned_stride};
