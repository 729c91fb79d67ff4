//! Orchestrates the per-tier pipeline.
//!
//! `Fetching -> Decoding -> Normalizing` runs once per master. Each tier then
//! runs `ResamplingDown -> Blurring -> Thresholding -> Dilating ->
//! ResamplingUp -> Encoding` on its own buffers, so tiers can execute
//! concurrently on the blocking pool without sharing mutable state.
//! Cancellation is observed at every stage boundary.

use std::borrow::Cow;
use std::sync::Arc;

use line_art::{PixelBuffer, ResampleMode};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    DeclaredPolarity, DifficultyTier, MasterError, MasterFetcher, MasterImage, MasterSource,
    Stage, VariantFailure, VariantGenerationError, VariantSink,
};

/// A rendered tier, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantImage {
    pub tier: DifficultyTier,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG with opaque alpha.
    pub png: Vec<u8>,
    /// Fraction of pixels that are ink.
    pub ink_ratio: f64,
}

/// Per-tier results of a batch, in request order.
#[derive(Debug, Default)]
pub struct VariantOutcome {
    pub variants: Vec<VariantImage>,
    pub failures: Vec<VariantGenerationError>,
}

impl VariantOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn variant(&self, tier: DifficultyTier) -> Option<&VariantImage> {
        self.variants.iter().find(|v| v.tier == tier)
    }

    /// Tiers a caller may retry without re-running the successful ones.
    pub fn failed_tiers(&self) -> Vec<DifficultyTier> {
        self.failures.iter().map(|f| f.tier).collect()
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            succeeded: self
                .variants
                .iter()
                .map(|v| TierSummary {
                    tier: v.tier,
                    width: v.width,
                    height: v.height,
                    bytes: v.png.len(),
                    ink_ratio: v.ink_ratio,
                })
                .collect(),
            failed: self
                .failures
                .iter()
                .map(|f| FailureSummary {
                    tier: f.tier,
                    stage: f.stage,
                    message: f.cause.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable view of a [`VariantOutcome`] without image bytes.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub succeeded: Vec<TierSummary>,
    pub failed: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub tier: DifficultyTier,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub ink_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    pub tier: DifficultyTier,
    pub stage: Stage,
    pub message: String,
}

/// Runs master preparation and tier rendering through a fetch collaborator.
#[derive(Debug, Clone)]
pub struct VariantComposer<F> {
    fetcher: F,
}

impl<F: MasterFetcher> VariantComposer<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch, decode and normalize a master.
    pub async fn prepare_master(
        &self,
        source: &MasterSource,
        declared: DeclaredPolarity,
    ) -> Result<MasterImage, MasterError> {
        self.prepare_master_cancellable(source, declared, &CancellationToken::new())
            .await
    }

    async fn prepare_master_cancellable(
        &self,
        source: &MasterSource,
        declared: DeclaredPolarity,
        cancel: &CancellationToken,
    ) -> Result<MasterImage, MasterError> {
        master_checkpoint(cancel, Stage::Fetching)?;
        let bytes = self
            .fetcher
            .fetch(source)
            .await
            .map_err(|e| MasterError::new(Stage::Fetching, e))?;

        master_checkpoint(cancel, Stage::Decoding)?;
        let buffer = tokio::task::spawn_blocking(move || line_art::decode(&bytes))
            .await
            .map_err(|e| MasterError::new(Stage::Decoding, worker_failure(e)))?
            .map_err(|e| MasterError::new(Stage::Decoding, e))?;

        master_checkpoint(cancel, Stage::Normalizing)?;
        let master = tokio::task::spawn_blocking(move || MasterImage::normalize(buffer, declared))
            .await
            .map_err(|e| MasterError::new(Stage::Normalizing, worker_failure(e)))?;

        info!(
            source = %source,
            width = master.width(),
            height = master.height(),
            polarity = ?master.source_polarity(),
            "Master prepared"
        );
        Ok(master)
    }

    /// Run the full pipeline for a single tier.
    pub async fn generate(
        &self,
        source: &MasterSource,
        declared: DeclaredPolarity,
        tier: DifficultyTier,
    ) -> Result<VariantImage, VariantGenerationError> {
        let master = self
            .prepare_master(source, declared)
            .await
            .map_err(|e| VariantGenerationError::from_master(tier, e))?;

        let cancel = CancellationToken::new();
        run_tier(Arc::new(master), tier, cancel).await
    }

    /// Prepare the master once and render `tiers` concurrently.
    ///
    /// Duplicate tiers are rendered once. A failed tier never affects its
    /// siblings; only a master failure aborts the whole batch.
    pub async fn generate_tiers(
        &self,
        source: &MasterSource,
        declared: DeclaredPolarity,
        tiers: &[DifficultyTier],
        cancel: &CancellationToken,
    ) -> Result<VariantOutcome, MasterError> {
        let master = Arc::new(
            self.prepare_master_cancellable(source, declared, cancel)
                .await?,
        );

        let mut unique = Vec::with_capacity(tiers.len());
        for &tier in tiers {
            if !unique.contains(&tier) {
                unique.push(tier);
            }
        }

        let handles: Vec<_> = unique
            .into_iter()
            .map(|tier| {
                let master = Arc::clone(&master);
                let cancel = cancel.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    render_variant_cancellable(&master, tier, &cancel)
                });
                (tier, handle)
            })
            .collect();

        let mut outcome = VariantOutcome::default();
        for (tier, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                Err(VariantGenerationError::new(
                    tier,
                    Stage::ResamplingDown,
                    worker_failure(e),
                ))
            });
            match result {
                Ok(variant) => outcome.variants.push(variant),
                Err(err) => {
                    warn!(tier = %err.tier, stage = %err.stage, error = %err.cause, "Variant failed");
                    outcome.failures.push(err);
                }
            }
        }
        Ok(outcome)
    }

    /// Render `tiers` and hand every successful variant to `sink`.
    ///
    /// Nothing is persisted for a tier that failed or for any tier once
    /// `cancel` has fired.
    pub async fn generate_and_persist<S: VariantSink>(
        &self,
        page_id: &str,
        source: &MasterSource,
        declared: DeclaredPolarity,
        tiers: &[DifficultyTier],
        sink: &S,
        cancel: &CancellationToken,
    ) -> Result<VariantOutcome, MasterError> {
        let rendered = self.generate_tiers(source, declared, tiers, cancel).await?;

        let mut outcome = VariantOutcome {
            variants: Vec::with_capacity(rendered.variants.len()),
            failures: rendered.failures,
        };
        for variant in rendered.variants {
            if cancel.is_cancelled() {
                outcome.failures.push(VariantGenerationError::new(
                    variant.tier,
                    Stage::Persisting,
                    VariantFailure::Cancelled,
                ));
                continue;
            }
            match sink.produce_variant(page_id, variant.tier, &variant.png).await {
                Ok(()) => outcome.variants.push(variant),
                Err(e) => {
                    warn!(page_id, tier = %variant.tier, error = %e, "Failed to persist variant");
                    outcome.failures.push(VariantGenerationError::new(
                        variant.tier,
                        Stage::Persisting,
                        e,
                    ));
                }
            }
        }
        Ok(outcome)
    }
}

/// Render one tier of an already prepared master.
///
/// Pure and synchronous: the same master and tier always yield identical bytes.
pub fn render_variant(
    master: &MasterImage,
    tier: DifficultyTier,
) -> Result<VariantImage, VariantGenerationError> {
    render_variant_cancellable(master, tier, &CancellationToken::new())
}

async fn run_tier(
    master: Arc<MasterImage>,
    tier: DifficultyTier,
    cancel: CancellationToken,
) -> Result<VariantImage, VariantGenerationError> {
    tokio::task::spawn_blocking(move || render_variant_cancellable(&master, tier, &cancel))
        .await
        .map_err(|e| VariantGenerationError::new(tier, Stage::ResamplingDown, worker_failure(e)))?
}

pub(crate) fn render_variant_cancellable(
    master: &MasterImage,
    tier: DifficultyTier,
    cancel: &CancellationToken,
) -> Result<VariantImage, VariantGenerationError> {
    let config = tier.config();
    if let Err(e) = config.validate() {
        panic!("static variant table entry for {tier} is invalid: {e}");
    }

    let run = TierRun { tier, cancel };
    let (width, height) = master.dimensions();

    run.checkpoint(Stage::ResamplingDown)?;
    let working: Cow<'_, PixelBuffer> = if config.resamples() {
        let (w, h) = line_art::scaled_dimensions(width, height, config.scale);
        Cow::Owned(
            line_art::resample(master.buffer(), w, h, ResampleMode::Smooth)
                .map_err(|e| run.fail(Stage::ResamplingDown, e))?,
        )
    } else {
        Cow::Borrowed(master.buffer())
    };

    run.checkpoint(Stage::Blurring)?;
    let blurred = line_art::blur(&working, config.blur_radius);
    drop(working);

    run.checkpoint(Stage::Thresholding)?;
    let binary = line_art::threshold(&blurred, config.threshold, config.polarity);
    drop(blurred);

    run.checkpoint(Stage::Dilating)?;
    let dilated = line_art::dilate(&binary, config.dilate_passes);
    drop(binary);

    let full = if config.upscale && dilated.dimensions() != (width, height) {
        run.checkpoint(Stage::ResamplingUp)?;
        line_art::resample(&dilated, width, height, ResampleMode::Blocky)
            .map_err(|e| run.fail(Stage::ResamplingUp, e))?
    } else {
        dilated
    };

    run.checkpoint(Stage::Encoding)?;
    let png = line_art::encode_png(&full).map_err(|e| {
        error!(%tier, width, height, error = %e, "Failed to encode variant");
        run.fail(Stage::Encoding, e)
    })?;

    let ink_ratio = line_art::ink_ratio(&full);
    info!(%tier, width, height, bytes = png.len(), ink_ratio, "Variant rendered");

    Ok(VariantImage {
        tier,
        width,
        height,
        png,
        ink_ratio,
    })
}

/// Per-tier context for stage bookkeeping.
struct TierRun<'a> {
    tier: DifficultyTier,
    cancel: &'a CancellationToken,
}

impl TierRun<'_> {
    fn checkpoint(&self, stage: Stage) -> Result<(), VariantGenerationError> {
        if self.cancel.is_cancelled() {
            debug!(tier = %self.tier, %stage, "Cancelled at stage boundary");
            return Err(self.fail(stage, VariantFailure::Cancelled));
        }
        debug!(tier = %self.tier, %stage, "Entering stage");
        Ok(())
    }

    fn fail(&self, stage: Stage, cause: impl Into<VariantFailure>) -> VariantGenerationError {
        VariantGenerationError::new(self.tier, stage, cause)
    }
}

fn master_checkpoint(cancel: &CancellationToken, stage: Stage) -> Result<(), MasterError> {
    if cancel.is_cancelled() {
        debug!(%stage, "Master preparation cancelled");
        return Err(MasterError::new(stage, VariantFailure::Cancelled));
    }
    Ok(())
}

fn worker_failure(err: tokio::task::JoinError) -> VariantFailure {
    if err.is_panic() {
        std::panic::resume_unwind(err.into_panic());
    }
    VariantFailure::Worker(err.to_string())
}
