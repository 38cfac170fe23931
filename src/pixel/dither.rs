
//! Ordered dithering for reducing 8-bit channels to 5-bit red and blue and 6-bit green.
//! Each channel has its own 8x8 threshold matrix, indexed by `(y & 7) * 8 + (x & 7)`.

const RED_THRESHOLDS: [u8; 64] = [
    1, 7, 3, 5, 0, 8, 2, 6,
    7, 1, 5, 3, 8, 0, 6, 2,
    3, 5, 0, 8, 2, 6, 1, 7,
    5, 3, 8, 0, 6, 2, 7, 1,
    0, 8, 2, 6, 1, 7, 3, 5,
    8, 0, 6, 2, 7, 1, 5, 3,
    2, 6, 1, 7, 3, 5, 0, 8,
    6, 2, 7, 1, 5, 3, 8, 0,
];

const GREEN_THRESHOLDS: [u8; 64] = [
    1, 3, 2, 2, 3, 1, 2, 2,
    2, 2, 0, 4, 2, 2, 4, 0,
    3, 1, 2, 2, 1, 3, 2, 2,
    2, 2, 4, 0, 2, 2, 0, 4,
    1, 3, 2, 2, 3, 1, 2, 2,
    2, 2, 0, 4, 2, 2, 4, 0,
    3, 1, 2, 2, 1, 3, 2, 2,
    2, 2, 4, 0, 2, 2, 0, 4,
];

const BLUE_THRESHOLDS: [u8; 64] = [
    5, 3, 8, 0, 6, 2, 7, 1,
    3, 5, 0, 8, 2, 6, 1, 7,
    8, 0, 6, 2, 7, 1, 5, 3,
    0, 8, 2, 6, 1, 7, 3, 5,
    6, 2, 7, 1, 5, 3, 8, 0,
    2, 6, 1, 7, 3, 5, 0, 8,
    7, 1, 5, 3, 8, 0, 6, 2,
    1, 7, 3, 5, 0, 8, 2, 6,
];

/// Index into the threshold matrices for the pixel at `x, y`.
#[inline]
fn threshold_index(x: usize, y: usize) -> usize {
    (y & 7) * 8 + (x & 7)
}

/// Add the thresholds of this pixel position to the channels, saturating at 255.
/// Truncating the result to 5-6-5 bits yields the dithered color.
#[inline]
pub fn dither_565(x: usize, y: usize, [red, green, blue]: [u8; 3]) -> [u8; 3] {
    let index = threshold_index(x, y);

    [
        red.saturating_add(RED_THRESHOLDS[index]),
        green.saturating_add(GREEN_THRESHOLDS[index]),
        blue.saturating_add(BLUE_THRESHOLDS[index]),
    ]
}
