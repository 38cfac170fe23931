
//! Specialized binary input and output.
//! Uses the error handling for this crate.

pub use ::std::io::{Read, Write};
use lebe::prelude::*;
use crate::error::{Error, Result, UnitResult};


/// Generic trait that defines common binary operations such as reading and writing for this type.
/// All values are stored in little endian byte order.
pub trait Data: Sized + Default + Clone {

    /// Number of bytes this would consume in a binary file.
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Read a value of type `Self`.
    fn read(read: &mut impl Read) -> Result<Self>;

    /// Read as many values of type `Self` as fit into the specified slice.
    /// If the slice cannot be filled completely, returns `Error::Format`.
    fn read_slice(read: &mut impl Read, slice: &mut[Self]) -> UnitResult;

    /// Write this value to the writer.
    fn write(self, write: &mut impl Write) -> UnitResult;

    /// Write all values of that slice to the writer.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> UnitResult;

    /// Read as many values of type `Self` as specified with `data_size`.
    ///
    /// This method will not allocate more memory than `soft_max` at once.
    /// If `hard_max` is specified, it will never read any more than that.
    /// Returns `Error::Format` if reader does not contain the desired number of elements.
    #[inline]
    fn read_vec(read: &mut impl Read, data_size: usize, soft_max: usize, hard_max: Option<usize>) -> Result<Vec<Self>> {
        if let Some(max) = hard_max {
            if data_size > max {
                return Err(Error::format("content size"))
            }
        }

        let soft_max = hard_max.unwrap_or(soft_max).min(soft_max).max(1);
        let mut data = Vec::new();

        // do not allocate more than $chunks memory at once
        // (most of the time, this loop will run only once)
        while data.len() < data_size {
            let chunk_start = data.len();
            let chunk_end = (chunk_start + soft_max).min(data_size);

            data.resize(chunk_end, Self::default());
            Self::read_slice(read, &mut data[chunk_start .. chunk_end])?;
        }

        Ok(data)
    }
}


macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            #[inline]
            fn read(read: &mut impl Read) -> Result<Self> {
                Ok(read.read_from_little_endian()?)
            }

            #[inline]
            fn write(self, write: &mut impl Write) -> Result<()> {
                write.write_as_little_endian(&self)?;
                Ok(())
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> Result<()> {
                read.read_from_little_endian_into(slice)?;
                Ok(())
            }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> Result<()> {
                write.write_as_little_endian(slice)?;
                Ok(())
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(u16);
implement_data_for_primitive!(u32);


/// Read everything that remains in the reader, but never more than `hard_max` bytes.
pub fn read_to_end_limited(read: &mut impl Read, hard_max: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    read.by_ref().take(hard_max as u64 + 1).read_to_end(&mut bytes)?;

    if bytes.len() > hard_max { Err(Error::format("trailing bytes after image data")) }
    else { Ok(bytes) }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn little_endian_primitives(){
        let mut bytes = Vec::new();
        0x19_u8.write(&mut bytes).unwrap();
        0x1234_u16.write(&mut bytes).unwrap();
        0x5aa521e0_u32.write(&mut bytes).unwrap();
        assert_eq!(bytes, [0x19, 0x34, 0x12, 0xe0, 0x21, 0xa5, 0x5a]);

        let read = &mut bytes.as_slice();
        assert_eq!(u8::read(read).unwrap(), 0x19);
        assert_eq!(u16::read(read).unwrap(), 0x1234);
        assert_eq!(u32::read(read).unwrap(), 0x5aa521e0);
        assert!(u8::read(read).is_err());
    }

    #[test]
    fn read_vec_in_small_chunks(){
        let bytes: Vec<u8> = (0 .. 100).collect();
        let vec = u8::read_vec(&mut bytes.as_slice(), 100, 7, None).unwrap();
        assert_eq!(vec, bytes);

        assert!(u8::read_vec(&mut bytes.as_slice(), 101, 7, None).is_err(), "missing bytes");
        assert!(u8::read_vec(&mut bytes.as_slice(), 100, 7, Some(99)).is_err(), "hard max");
    }
}
