//! Gaussian blur used to fuse near-adjacent dark pixels before thresholding.

use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use crate::PixelBuffer;

/// Blur `buffer` with a Gaussian of standard deviation `radius`.
///
/// Every channel is filtered with the same kernel, so a gray buffer stays
/// gray. A radius of zero (or anything not strictly positive) returns an
/// unchanged copy.
pub fn blur(buffer: &PixelBuffer, radius: f32) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    if radius.is_nan() || radius <= 0.0 || width == 0 || height == 0 {
        debug!(radius, "Blur radius is zero, returning copy");
        return buffer.clone();
    }

    debug!(width, height, radius, "Applying Gaussian blur");
    gaussian_blur_f32(buffer, radius)
}
