//! Luminance thresholding: converts an RGBA buffer to pure black and white.
//!
//! Luminance uses the ITU-R BT.601 weights `0.299*R + 0.587*G + 0.114*B`.
//! The comparison against the cutoff is done in integer thousandths, so a
//! pixel whose luminance equals the cutoff always lands on the ink side.

use image::Rgba;
use tracing::debug;

use crate::{INK, PAPER, PixelBuffer};

/// BT.601 luma weights scaled by 1000.
const LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];

/// Which side of the cutoff represents ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Dark strokes on a light background. Bright pixels become paper.
    #[default]
    InkOnWhite,
    /// Light strokes on a dark background. Bright pixels become ink.
    InkOnBlack,
}

/// BT.601 luminance of an RGB triple, in `0.0..=255.0`.
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    luminance_milli(r, g, b) as f32 / 1000.0
}

fn luminance_milli(r: u8, g: u8, b: u8) -> u32 {
    LUMA_WEIGHTS[0] * u32::from(r)
        + LUMA_WEIGHTS[1] * u32::from(g)
        + LUMA_WEIGHTS[2] * u32::from(b)
}

/// Whether a pixel is classified as paper for the given cutoff and polarity.
fn is_paper(pixel: &Rgba<u8>, cutoff: u8, polarity: Polarity) -> bool {
    let above = luminance_milli(pixel[0], pixel[1], pixel[2]) > u32::from(cutoff) * 1000;
    match polarity {
        Polarity::InkOnWhite => above,
        Polarity::InkOnBlack => !above,
    }
}

/// Binarize `buffer` around `cutoff`.
///
/// - `InkOnWhite`: luminance > cutoff becomes white, everything else black.
/// - `InkOnBlack`: luminance > cutoff becomes black, everything else white.
///
/// The output always has RGB in {0, 255} and alpha 255.
pub fn threshold(buffer: &PixelBuffer, cutoff: u8, polarity: Polarity) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    debug!(width, height, cutoff, ?polarity, "Applying threshold conversion");

    let mut output = PixelBuffer::new(width, height);
    for (src, dst) in buffer.pixels().zip(output.pixels_mut()) {
        *dst = if is_paper(src, cutoff, polarity) {
            PAPER
        } else {
            INK
        };
    }

    output
}

/// True when every pixel is pure black or white with full alpha.
pub fn is_binary(buffer: &PixelBuffer) -> bool {
    buffer.pixels().all(|p| *p == INK || *p == PAPER)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a small test buffer with a gray gradient.
    fn create_gradient_buffer(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            let val = ((x + y) * 255 / (width + height - 2)) as u8;
            Rgba([val, val, val, 255])
        })
    }

    fn gray_row(values: &[u8]) -> PixelBuffer {
        let mut buf = PixelBuffer::new(values.len() as u32, 1);
        for (x, &v) in values.iter().enumerate() {
            buf.put_pixel(x as u32, 0, Rgba([v, v, v, 255]));
        }
        buf
    }

    #[test]
    fn test_luminance_weights() {
        assert!((luminance(255, 255, 255) - 255.0).abs() < 1e-3);
        assert!((luminance(255, 0, 0) - 76.245).abs() < 1e-3);
        assert!((luminance(0, 255, 0) - 149.685).abs() < 1e-3);
        assert!((luminance(0, 0, 255) - 29.07).abs() < 1e-3);
    }

    #[test]
    fn test_threshold_output_is_binary() {
        let buf = create_gradient_buffer(16, 16);
        for cutoff in [0, 1, 127, 200, 254, 255] {
            for polarity in [Polarity::InkOnWhite, Polarity::InkOnBlack] {
                let result = threshold(&buf, cutoff, polarity);
                assert!(is_binary(&result), "cutoff {cutoff} {polarity:?}");
            }
        }
    }

    #[test]
    fn test_threshold_forces_alpha() {
        let buf = PixelBuffer::from_pixel(3, 3, Rgba([40, 40, 40, 7]));
        let result = threshold(&buf, 128, Polarity::InkOnWhite);
        assert!(result.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_threshold_ink_on_white() {
        let result = threshold(&gray_row(&[0, 127, 128, 255]), 127, Polarity::InkOnWhite);
        assert_eq!(result.get_pixel(0, 0), &INK);
        assert_eq!(result.get_pixel(1, 0), &INK);
        assert_eq!(result.get_pixel(2, 0), &PAPER);
        assert_eq!(result.get_pixel(3, 0), &PAPER);
    }

    #[test]
    fn test_threshold_ink_on_black_is_inverse_mapping() {
        let result = threshold(&gray_row(&[0, 127, 128, 255]), 127, Polarity::InkOnBlack);
        assert_eq!(result.get_pixel(0, 0), &PAPER);
        assert_eq!(result.get_pixel(1, 0), &PAPER);
        assert_eq!(result.get_pixel(2, 0), &INK);
        assert_eq!(result.get_pixel(3, 0), &INK);
    }

    #[test]
    fn test_threshold_tie_falls_to_ink() {
        // Gray pixels have luminance exactly equal to their channel value.
        let result = threshold(&gray_row(&[205]), 205, Polarity::InkOnWhite);
        assert_eq!(result.get_pixel(0, 0), &INK);

        let result = threshold(&gray_row(&[205]), 205, Polarity::InkOnBlack);
        assert_eq!(result.get_pixel(0, 0), &PAPER);
    }

    #[test]
    fn test_threshold_uses_weighted_luminance() {
        // Pure green (149.685) is above 140, pure blue (29.07) is not.
        let mut buf = PixelBuffer::new(2, 1);
        buf.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        buf.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let result = threshold(&buf, 140, Polarity::InkOnWhite);
        assert_eq!(result.get_pixel(0, 0), &PAPER);
        assert_eq!(result.get_pixel(1, 0), &INK);
    }

    #[test]
    fn test_threshold_preserves_dimensions() {
        let buf = PixelBuffer::new(7, 3);
        assert_eq!(threshold(&buf, 128, Polarity::InkOnWhite).dimensions(), (7, 3));
    }
}
