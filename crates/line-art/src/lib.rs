//! Raster primitives for turning master images into printable line art.
//!
//! Every operation takes a borrowed [`PixelBuffer`] and returns a freshly
//! allocated one, so stages can be chained without sharing mutable state:
//! resampling, Gaussian blur, luminance thresholding, 3x3 dilation and
//! polarity normalization.

pub mod blur;
pub mod buffer;
pub mod dilate;
pub mod polarity;
pub mod resample;
pub mod stats;
pub mod threshold;

// Re-exports for convenience
pub use blur::blur;
pub use buffer::{PixelBuffer, decode, encode_png, sniff_format};
pub use dilate::dilate;
pub use polarity::{NORMALIZE_CUTOFF, detect_polarity, invert, normalize_polarity};
pub use resample::{ResampleMode, resample, scaled_dimensions};
pub use stats::{count_ink_regions, ink_pixel_count, ink_ratio};
pub use threshold::{Polarity, is_binary, luminance, threshold};

use image::Rgba;

/// Opaque black, the only ink value a processed buffer contains.
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Opaque white paper.
pub const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Errors raised while decoding source bytes into a [`PixelBuffer`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Image data is empty")]
    EmptyInput,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised while serializing a processed buffer.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to encode {width}x{height} image as PNG: {source}")]
    Png {
        width: u32,
        height: u32,
        #[source]
        source: image::ImageError,
    },
}

/// Errors raised by the processing primitives themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("Invalid target dimensions {width}x{height}: both must be at least 1")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Returns true when the pixel is pure black ink (alpha ignored).
pub fn is_ink(pixel: &Rgba<u8>) -> bool {
    pixel[0] == 0 && pixel[1] == 0 && pixel[2] == 0
}
