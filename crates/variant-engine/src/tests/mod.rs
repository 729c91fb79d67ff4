use line_art::{INK, PAPER, PixelBuffer};

use crate::{DeclaredPolarity, MasterImage, VariantImage};

fn png_bytes(buffer: &PixelBuffer) -> Vec<u8> {
    line_art::encode_png(buffer).expect("Failed to encode test master")
}

fn decode_variant(variant: &VariantImage) -> PixelBuffer {
    line_art::decode(&variant.png).expect("Variant is not a decodable PNG")
}

fn canonical(buffer: PixelBuffer) -> MasterImage {
    MasterImage::normalize(buffer, DeclaredPolarity::InkOnWhite)
}

/// White page with a 2px-wide black diagonal (`x == y` or `x == y + 1`).
fn diagonal_master(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        if x == y || x == y + 1 { INK } else { PAPER }
    })
}

/// Three pairs of 4px vertical strokes separated by 3, 10 and 40px gaps.
fn stroke_pairs_master() -> PixelBuffer {
    const STROKES: [(u32, u32); 6] = [
        (20, 24),
        (27, 31),
        (60, 64),
        (74, 78),
        (110, 114),
        (154, 158),
    ];
    PixelBuffer::from_fn(200, 120, |x, y| {
        let in_stroke = STROKES.iter().any(|&(start, end)| x >= start && x < end);
        if in_stroke && (20..100).contains(&y) { INK } else { PAPER }
    })
}

/// Three 10px vertical strokes of gray `level`, 50px apart.
fn gray_strokes_master(level: u8) -> PixelBuffer {
    let stroke = image::Rgba([level, level, level, 255]);
    PixelBuffer::from_fn(200, 120, |x, y| {
        let in_stroke = [40u32, 100, 160].iter().any(|&start| x >= start && x < start + 10);
        if in_stroke && (20..100).contains(&y) { stroke } else { PAPER }
    })
}
