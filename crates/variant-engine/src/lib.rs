//! Difficulty variant engine for coloring pages.
//!
//! Derives Quick & Easy, Beginner and Intermediate renditions from a single
//! master image using the primitives in the `line-art` crate. Fetching the
//! master and persisting the encoded variants are delegated to the
//! [`MasterFetcher`] and [`VariantSink`] collaborators.

pub mod composer;
pub mod config;
pub mod error;
pub mod fetch;
pub mod master;
pub mod sink;
pub mod tier;

// Re-exports for convenience
pub use composer::{
    OutcomeSummary, VariantComposer, VariantImage, VariantOutcome, render_variant,
};
pub use config::{InvalidConfig, VariantConfig};
pub use error::{
    FetchError, MasterError, PersistError, Stage, VariantFailure, VariantGenerationError,
};
pub use fetch::{HttpFetcher, MasterFetcher};
pub use master::{DeclaredPolarity, MasterImage, MasterSource, UnknownPolarity};
pub use sink::{DirectorySink, MemorySink, VariantSink};
pub use tier::{DifficultyTier, UnknownTier};

pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests;
