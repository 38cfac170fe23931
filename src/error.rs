
//! Error type definitions.

use std::borrow::Cow;
use std::io::ErrorKind;
pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;
use std::convert::TryFrom;
use std::error;
use std::fmt;

/// A result that may contain a conversion error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a conversion error.
pub type UnitResult = Result<()>;


/// An error that may happen while converting a bitmap.
/// Distinguishes between bad input files, contract violations
/// and failures of external tools.
/// None of these are transient, so retrying will not help.
#[derive(Debug)]
pub enum Error {

    /// The file name or the contents do not describe a valid bitmap,
    /// for example an unknown color format tag or a missing alpha channel.
    Format(Cow<'static, str>),

    /// A parameter does not satisfy the invariants of the image,
    /// for example a stride below the minimum or a second premultiplication.
    Parameter(Cow<'static, str>),

    /// An external tool, like the palette quantizer, failed.
    /// Contains the diagnostic output of that tool.
    External {

        /// The name of the tool that failed.
        tool: Cow<'static, str>,

        /// What the tool reported.
        message: String,
    },

    /// The underlying byte stream could not be read or written.
    Io(IoError),
}


impl Error {

    /// Create an error of the variant `Format`.
    pub(crate) fn format(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Format(message.into())
    }

    /// Create an error of the variant `Parameter`.
    pub(crate) fn parameter(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Parameter(message.into())
    }

    /// Create an error of the variant `External`.
    pub(crate) fn external(tool: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Error::External { tool: tool.into(), message: message.into() }
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::format("reference to missing bytes")
        }
        else {
            Error::Io(error)
        }
    }
}

impl From<png::DecodingError> for Error {
    fn from(error: png::DecodingError) -> Self {
        match error {
            png::DecodingError::IoError(io) => Error::from(io),
            other => Error::format(format!("png ({})", other)),
        }
    }
}

impl From<png::EncodingError> for Error {
    fn from(error: png::EncodingError) -> Self {
        match error {
            png::EncodingError::IoError(io) => Error::from(io),
            other => Error::parameter(format!("png ({})", other)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(formatter),
            Error::Format(message) => write!(formatter, "invalid format: {}", message),
            Error::Parameter(message) => write!(formatter, "invalid parameter: {}", message),
            Error::External { tool, message } => write!(formatter, "{} failed: {}", tool, message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}


/// Convert a dimension to the 16 bit header field, returning an error if it does not fit.
#[inline]
pub(crate) fn usize_to_u16(value: usize, name: &'static str) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::parameter(format!("{} overflow: {}", name, value)))
}

/// Convert a length to a 32 bit payload field, returning an error if it does not fit.
#[inline]
pub(crate) fn usize_to_u32(value: usize, name: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::parameter(format!("{} overflow: {:#x}", name, value)))
}

/// Panics on 16 bit targets only.
#[inline]
pub(crate) fn u32_to_usize(value: u32) -> usize {
    usize::try_from(value).expect("(u32 as usize) overflowed")
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn eof_is_a_format_error(){
        let error = Error::from(IoError::new(ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(error, Error::Format(_)), "{:?}", error);

        let error = Error::from(IoError::new(ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(error, Error::Io(_)), "{:?}", error);
    }

    #[test]
    fn dimension_overflow(){
        assert_eq!(usize_to_u16(0xffff, "width").unwrap(), 0xffff);
        assert!(matches!(usize_to_u16(0x10000, "width"), Err(Error::Parameter(_))));
    }
}
