//! Decoding source bytes into RGBA pixel buffers and encoding results as PNG.

use std::borrow::Cow;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use tracing::debug;

use crate::{DecodeError, EncodeError};

/// Decoded raster: `width * height * 4` bytes of 8-bit RGBA.
pub type PixelBuffer = RgbaImage;

/// Formats accepted as master images.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Detect the container format from the leading magic bytes.
///
/// Returns `None` for unknown data or formats outside [`SUPPORTED_FORMATS`].
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .filter(|format| SUPPORTED_FORMATS.contains(format))
}

/// Decode raw image bytes into an opaque RGBA buffer.
///
/// Transparent areas are composited onto white paper, so a line-art PNG with
/// a transparent background reads as ink-on-white.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let format = image::guess_format(bytes)?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(DecodeError::UnsupportedFormat(format!("{format:?}")));
    }

    let decoded = image::load_from_memory_with_format(bytes, format)?;
    let mut rgba = decoded.to_rgba8();
    flatten_onto_paper(&mut rgba);

    debug!(
        width = rgba.width(),
        height = rgba.height(),
        ?format,
        "Decoded image"
    );
    Ok(rgba)
}

/// Encode a buffer as PNG with every alpha value forced to 255.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = buffer.dimensions();

    let opaque: Cow<'_, PixelBuffer> = if buffer.pixels().all(|p| p[3] == 255) {
        Cow::Borrowed(buffer)
    } else {
        let mut owned = buffer.clone();
        for pixel in owned.pixels_mut() {
            pixel[3] = 255;
        }
        Cow::Owned(owned)
    };

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(opaque.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|source| EncodeError::Png {
            width,
            height,
            source,
        })?;

    debug!(width, height, bytes = out.len(), "Encoded PNG");
    Ok(out)
}

/// Composite every pixel over opaque white in place.
fn flatten_onto_paper(buffer: &mut PixelBuffer) {
    for pixel in buffer.pixels_mut() {
        let alpha = u32::from(pixel[3]);
        if alpha == 255 {
            continue;
        }
        for channel in 0..3 {
            let value = u32::from(pixel[channel]);
            pixel[channel] = ((value * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
        pixel[3] = 255;
    }
}
