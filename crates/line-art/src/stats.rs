//! Ink coverage measurements on binary buffers.

use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::{PixelBuffer, is_ink};

const MASK_INK: Luma<u8> = Luma([0]);
const MASK_PAPER: Luma<u8> = Luma([255]);

/// Number of pure-black pixels.
pub fn ink_pixel_count(buffer: &PixelBuffer) -> u64 {
    buffer.pixels().filter(|p| is_ink(p)).count() as u64
}

/// Fraction of the buffer covered by ink, `0.0` for an empty buffer.
pub fn ink_ratio(buffer: &PixelBuffer) -> f64 {
    let total = u64::from(buffer.width()) * u64::from(buffer.height());
    if total == 0 {
        return 0.0;
    }
    ink_pixel_count(buffer) as f64 / total as f64
}

/// Number of 8-connected ink regions.
pub fn count_ink_regions(buffer: &PixelBuffer) -> usize {
    if buffer.width() == 0 || buffer.height() == 0 {
        return 0;
    }

    let mask = GrayImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        if is_ink(buffer.get_pixel(x, y)) {
            MASK_INK
        } else {
            MASK_PAPER
        }
    });

    let labels = connected_components(&mask, Connectivity::Eight, MASK_PAPER);
    labels
        .pixels()
        .map(|label| label[0])
        .filter(|&label| label != 0)
        .collect::<HashSet<u32>>()
        .len()
}
