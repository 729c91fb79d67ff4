//! Resampling between working resolutions.
//!
//! Shrinking uses a bilinear filter so neighbouring detail merges before
//! thresholding. Re-expanding uses nearest-neighbour so the shrunk line work
//! keeps hard, blocky edges at the original size.

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::{PixelBuffer, ProcessError};

/// Interpolation used by [`resample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMode {
    /// Bilinear interpolation, used when shrinking.
    Smooth,
    /// Nearest-neighbour, used when expanding a shrunk buffer.
    Blocky,
}

impl ResampleMode {
    const fn filter(self) -> FilterType {
        match self {
            Self::Smooth => FilterType::Triangle,
            Self::Blocky => FilterType::Nearest,
        }
    }
}

/// Dimensions of a `width x height` buffer scaled by `scale`.
///
/// Fractional results are rounded down and clamped to at least 1.
pub fn scaled_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale = f64::from(scale);
    let w = (f64::from(width) * scale).floor() as u32;
    let h = (f64::from(height) * scale).floor() as u32;
    (w.max(1), h.max(1))
}

/// Resample `buffer` to exactly `width x height`.
///
/// Returns a copy when the buffer already has the requested size.
pub fn resample(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
    mode: ResampleMode,
) -> Result<PixelBuffer, ProcessError> {
    if width == 0 || height == 0 {
        return Err(ProcessError::InvalidDimensions { width, height });
    }

    let (orig_w, orig_h) = buffer.dimensions();
    if (orig_w, orig_h) == (width, height) {
        debug!(width, height, "Buffer already at target size, skipping resample");
        return Ok(buffer.clone());
    }

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height = height,
        ?mode,
        "Resampling buffer"
    );

    Ok(imageops::resize(buffer, width, height, mode.filter()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn create_test_buffer(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_pixel(width, height, Rgba([128, 128, 128, 255]))
    }

    /// Left half black, right half white.
    fn create_split_buffer(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn test_scaled_dimensions_rounds_down() {
        assert_eq!(scaled_dimensions(1000, 1000, 0.75), (750, 750));
        assert_eq!(scaled_dimensions(101, 33, 0.5), (50, 16));
    }

    #[test]
    fn test_scaled_dimensions_never_zero() {
        assert_eq!(scaled_dimensions(1, 3, 0.4), (1, 1));
    }

    #[test]
    fn test_resample_downscale() {
        let buf = create_test_buffer(800, 600);
        let result = resample(&buf, 400, 300, ResampleMode::Smooth).unwrap();
        assert_eq!(result.dimensions(), (400, 300));
    }

    #[test]
    fn test_resample_rejects_zero_target() {
        let buf = create_test_buffer(4, 4);
        assert_eq!(
            resample(&buf, 0, 4, ResampleMode::Smooth),
            Err(ProcessError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn test_resample_same_size_is_copy() {
        let buf = create_split_buffer(10, 4);
        let result = resample(&buf, 10, 4, ResampleMode::Smooth).unwrap();
        assert_eq!(result, buf);
    }

    #[test]
    fn test_resample_does_not_mutate_input() {
        let buf = create_split_buffer(10, 10);
        let before = buf.clone();
        let _ = resample(&buf, 5, 5, ResampleMode::Smooth).unwrap();
        assert_eq!(buf, before);
    }

    #[test]
    fn test_blocky_upscale_keeps_pure_values() {
        let buf = create_split_buffer(4, 4);
        let result = resample(&buf, 12, 12, ResampleMode::Blocky).unwrap();
        for pixel in result.pixels() {
            assert!(pixel[0] == 0 || pixel[0] == 255, "Unexpected value {pixel:?}");
        }
        assert_eq!(result.get_pixel(0, 0)[0], 0);
        assert_eq!(result.get_pixel(11, 11)[0], 255);
    }

    #[test]
    fn test_smooth_downscale_blends_edges() {
        let buf = create_split_buffer(9, 3);
        let result = resample(&buf, 3, 1, ResampleMode::Smooth).unwrap();
        let middle = result.get_pixel(1, 0)[0];
        assert!(middle > 0 && middle < 255, "Expected a blended value, got {middle}");
    }
}
