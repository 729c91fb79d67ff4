//! Polarity correction for masters delivered as light strokes on black.

use image::imageops;
use tracing::debug;

use crate::threshold::{Polarity, luminance, threshold};
use crate::PixelBuffer;

/// Cutoff used when flipping an ink-on-black master to ink-on-white.
pub const NORMALIZE_CUTOFF: u8 = 208;

/// Mean frame luminance below which a buffer is treated as ink-on-black.
const DARK_FRAME_LUMINANCE: f32 = 128.0;

/// Convert an ink-on-black buffer into canonical black-on-white.
///
/// Pixels brighter than [`NORMALIZE_CUTOFF`] become ink, the rest paper.
pub fn normalize_polarity(buffer: &PixelBuffer) -> PixelBuffer {
    debug!(cutoff = NORMALIZE_CUTOFF, "Normalizing inverted polarity");
    threshold(buffer, NORMALIZE_CUTOFF, Polarity::InkOnBlack)
}

/// Invert the RGB channels of a buffer.
///
/// On a pure black/white buffer this is the inverse of [`normalize_polarity`].
pub fn invert(buffer: &PixelBuffer) -> PixelBuffer {
    let mut out = buffer.clone();
    imageops::invert(&mut out);
    out
}

/// Guess the polarity of a raw master from its outer one-pixel frame.
///
/// Paper dominates the edges of a page, so a dark frame means the strokes
/// are light on black. Empty buffers report `InkOnWhite`.
pub fn detect_polarity(buffer: &PixelBuffer) -> Polarity {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Polarity::InkOnWhite;
    }

    let mut sum = 0.0f64;
    let mut count = 0u64;
    for (x, y, pixel) in buffer.enumerate_pixels() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            sum += f64::from(luminance(pixel[0], pixel[1], pixel[2]));
            count += 1;
        }
    }

    let mean = (sum / count as f64) as f32;
    let polarity = if mean < DARK_FRAME_LUMINANCE {
        Polarity::InkOnBlack
    } else {
        Polarity::InkOnWhite
    };
    debug!(mean, ?polarity, "Detected master polarity");
    polarity
}
