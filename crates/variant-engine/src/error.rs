//! Error taxonomy for variant generation.

use std::fmt;
use std::path::PathBuf;

use line_art::{DecodeError, EncodeError, ProcessError};
use serde::Serialize;

use crate::DifficultyTier;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Fetching,
    Decoding,
    Normalizing,
    ResamplingDown,
    Blurring,
    Thresholding,
    Dilating,
    ResamplingUp,
    Encoding,
    Persisting,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Decoding => "decoding",
            Self::Normalizing => "normalizing",
            Self::ResamplingDown => "resampling-down",
            Self::Blurring => "blurring",
            Self::Thresholding => "thresholding",
            Self::Dilating => "dilating",
            Self::ResamplingUp => "resampling-up",
            Self::Encoding => "encoding",
            Self::Persisting => "persisting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retrieving master bytes failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Master request to {url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Master from {source_name} exceeds the {limit} byte limit")]
    TooLarge { source_name: String, limit: u64 },

    #[error("Failed to read master from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether a caller-level retry may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::UnsupportedContentType(_) | Self::TooLarge { .. } | Self::Io { .. } => false,
        }
    }
}

/// Handing a variant to the persistence collaborator failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Invalid page id: {0:?}")]
    InvalidPageId(String),

    #[error("Failed to write variant to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Underlying cause of a failed stage.
#[derive(Debug, thiserror::Error)]
pub enum VariantFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Failure while preparing the master, before any tier-specific work.
#[derive(Debug, thiserror::Error)]
#[error("Master preparation failed during {stage}: {cause}")]
pub struct MasterError {
    pub stage: Stage,
    #[source]
    pub cause: VariantFailure,
}

impl MasterError {
    pub fn new(stage: Stage, cause: impl Into<VariantFailure>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

/// A single tier's generation failed at `stage`.
#[derive(Debug, thiserror::Error)]
#[error("{tier} variant failed during {stage}: {cause}")]
pub struct VariantGenerationError {
    pub tier: DifficultyTier,
    pub stage: Stage,
    #[source]
    pub cause: VariantFailure,
}

impl VariantGenerationError {
    pub fn new(tier: DifficultyTier, stage: Stage, cause: impl Into<VariantFailure>) -> Self {
        Self {
            tier,
            stage,
            cause: cause.into(),
        }
    }

    /// Attribute a master preparation failure to `tier`.
    pub fn from_master(tier: DifficultyTier, err: MasterError) -> Self {
        Self {
            tier,
            stage: err.stage,
            cause: err.cause,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, VariantFailure::Cancelled)
    }
}
