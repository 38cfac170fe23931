
//! Simple math utilities.
//! Byte counting, alignment and bit depth conversion.


/// Number of whole bytes required to hold `bits` bits.
#[inline]
pub fn bytes_for_bits(bits: usize) -> usize {
    (bits + 7) / 8
}

/// Round `value` up to the next multiple of `alignment`.
/// An alignment of zero or one leaves the value unchanged.
#[inline]
pub fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 { value }
    else { (value + alignment - 1) / alignment * alignment }
}

/// Widen a `bits`-bit value to eight bits by repeating its bit pattern
/// across the byte, so that zero maps to zero and the maximum maps to `0xff`.
/// This has a smaller rounding error than a plain left shift.
#[inline]
pub fn bit_extend(value: u8, bits: u32) -> u8 {
    debug_assert!(bits >= 1 && bits <= 8, "bit depth out of range");
    debug_assert!(u32::from(value) < (1 << bits), "value exceeds bit depth");

    let value = u32::from(value);
    let mut result = 0_u32;
    let mut shift = 8_i32 - bits as i32;

    while shift > -(bits as i32) {
        result |= if shift >= 0 { value << shift } else { value >> -shift };
        shift -= bits as i32;
    }

    result as u8
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alignment(){
        assert_eq!(align_up(10, 1), 10);
        assert_eq!(align_up(10, 0), 10);
        assert_eq!(align_up(10, 4), 12);
        assert_eq!(align_up(12, 4), 12);
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(17, 16), 32);
    }

    #[test]
    fn byte_count(){
        assert_eq!(bytes_for_bits(0), 0);
        assert_eq!(bytes_for_bits(1), 1);
        assert_eq!(bytes_for_bits(8), 1);
        assert_eq!(bytes_for_bits(9), 2);
        assert_eq!(bytes_for_bits(3 * 24), 9);
    }

    #[test]
    fn extend_bits(){
        assert_eq!(bit_extend(1, 1), 0xff);
        assert_eq!(bit_extend(0, 1), 0);
        assert_eq!(bit_extend(1, 2), 85);
        assert_eq!(bit_extend(3, 2), 255);
        assert_eq!(bit_extend(1, 4), 17);
        assert_eq!(bit_extend(15, 4), 255);
        assert_eq!(bit_extend(1, 5), 8);
        assert_eq!(bit_extend(31, 5), 255);
        assert_eq!(bit_extend(16, 5), 132);
        assert_eq!(bit_extend(63, 6), 255);
        assert_eq!(bit_extend(32, 6), 130);
        assert_eq!(bit_extend(200, 8), 200);
    }
}
