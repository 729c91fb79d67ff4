//! The master image all variants are derived from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use line_art::{PixelBuffer, Polarity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where master bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterSource {
    Url(String),
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl MasterSource {
    /// Interpret a string as an http(s) URL, or else a filesystem path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for MasterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Polarity declared by the upstream collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclaredPolarity {
    #[default]
    InkOnWhite,
    InkOnBlack,
    /// Explicit opt-in to the frame-luminance heuristic.
    Detect,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown polarity: {0} (expected ink-on-white, ink-on-black or detect)")]
pub struct UnknownPolarity(pub String);

impl FromStr for DeclaredPolarity {
    type Err = UnknownPolarity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ink-on-white" => Ok(Self::InkOnWhite),
            "ink-on-black" => Ok(Self::InkOnBlack),
            "detect" => Ok(Self::Detect),
            _ => Err(UnknownPolarity(s.to_string())),
        }
    }
}

/// A decoded master in canonical ink-on-white form.
///
/// Never mutated after construction; tiers read it through shared references.
#[derive(Debug, Clone)]
pub struct MasterImage {
    buffer: PixelBuffer,
    source_polarity: Polarity,
}

impl MasterImage {
    /// Resolve the declared polarity and canonicalize the buffer.
    ///
    /// Ink-on-black masters are normalized exactly once here.
    pub fn normalize(buffer: PixelBuffer, declared: DeclaredPolarity) -> Self {
        let source_polarity = match declared {
            DeclaredPolarity::InkOnWhite => Polarity::InkOnWhite,
            DeclaredPolarity::InkOnBlack => Polarity::InkOnBlack,
            DeclaredPolarity::Detect => {
                let detected = line_art::detect_polarity(&buffer);
                info!(?detected, "Master polarity detected");
                detected
            }
        };

        let buffer = match source_polarity {
            Polarity::InkOnWhite => {
                debug!("Master already ink-on-white, skipping normalization");
                buffer
            }
            Polarity::InkOnBlack => line_art::normalize_polarity(&buffer),
        };

        Self {
            buffer,
            source_polarity,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Canonical ink-on-white pixels.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Polarity the master was delivered in.
    pub fn source_polarity(&self) -> Polarity {
        self.source_polarity
    }
}
