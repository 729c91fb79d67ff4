//! The static parameter table that defines each difficulty tier.
//!
//! The knobs move together. A smaller scale merges more detail before
//! thresholding. Cutoffs never rise as tiers get easier, so a faint stroke
//! dropped by a harder tier cannot come back as ink in an easier one.
//! Extra dilation passes restore the line weight lost to blur and downscaling.

use line_art::Polarity;

/// Parameters used to derive one tier from a normalized master.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantConfig {
    /// Downsample factor, `0 < scale <= 1`.
    pub scale: f32,

    /// Gaussian standard deviation applied at the working resolution.
    pub blur_radius: f32,

    /// Luminance cutoff for binarization.
    pub threshold: u8,

    /// Number of 3x3 dilation passes.
    pub dilate_passes: u32,

    /// Convention of the (already normalized) input.
    pub polarity: Polarity,

    /// Re-expand to the master's size with nearest-neighbour after dilation.
    pub upscale: bool,
}

/// Full-resolution binarization of the master. The high cutoff keeps
/// anti-aliased and light gray strokes.
pub const INTERMEDIATE: VariantConfig = VariantConfig {
    scale: 1.0,
    blur_radius: 0.0,
    threshold: 245,
    dilate_passes: 0,
    polarity: Polarity::InkOnWhite,
    upscale: false,
};

pub const BEGINNER: VariantConfig = VariantConfig {
    scale: 0.75,
    blur_radius: 0.75,
    threshold: 205,
    dilate_passes: 1,
    polarity: Polarity::InkOnWhite,
    upscale: true,
};

pub const QUICK_EASY: VariantConfig = VariantConfig {
    scale: 0.5,
    blur_radius: 2.0,
    threshold: 200,
    dilate_passes: 2,
    polarity: Polarity::InkOnWhite,
    upscale: true,
};

/// A parameter set that can never produce a valid variant.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidConfig {
    #[error("scale must be in (0, 1], got {0}")]
    Scale(f32),

    #[error("blur radius must be finite and >= 0, got {0}")]
    BlurRadius(f32),
}

impl VariantConfig {
    /// Check the table entry for values outside their domain.
    ///
    /// The threshold is a `u8`, so its 0..=255 range is enforced by the type.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(InvalidConfig::Scale(self.scale));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(InvalidConfig::BlurRadius(self.blur_radius));
        }
        Ok(())
    }

    /// Whether the working resolution differs from the master's.
    pub fn resamples(&self) -> bool {
        self.scale < 1.0
    }
}
