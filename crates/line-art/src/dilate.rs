//! Morphological dilation of black ink on a binary buffer.

use tracing::debug;

use crate::{INK, PixelBuffer, is_ink};

/// Grow ink regions by `passes` rounds of 3x3 dilation.
///
/// Each pass reads the previous pass's output: an interior pixel turns black
/// when any pixel in its 3x3 neighbourhood is black. Pixels on the outermost
/// rows and columns are copied unchanged. `passes == 0` returns a copy.
pub fn dilate(buffer: &PixelBuffer, passes: u32) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    debug!(width, height, passes, "Dilating ink");

    let mut current = buffer.clone();
    for _ in 0..passes {
        current = dilate_once(&current);
    }
    current
}

fn dilate_once(src: &PixelBuffer) -> PixelBuffer {
    let (width, height) = src.dimensions();
    let mut out = src.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if is_ink(src.get_pixel(x, y)) {
                continue;
            }
            let touches_ink = (y - 1..=y + 1)
                .any(|ny| (x - 1..=x + 1).any(|nx| is_ink(src.get_pixel(nx, ny))));
            if touches_ink {
                out.put_pixel(x, y, INK);
            }
        }
    }

    out
}
