//! Headless front end for the coloring-page variant engine.

pub mod config;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use variant_engine::{DirectorySink, HttpFetcher, OutcomeSummary, VariantComposer};

pub use config::AppConfig;

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// What a run produced, printed by the binary as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub page_id: String,
    pub master: String,
    pub output_dir: PathBuf,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: OutcomeSummary,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.summary.failed.is_empty()
    }
}

/// Generate and persist every configured tier for one page.
///
/// A master that cannot be prepared is an error; individual tier failures
/// are reported in the returned summary.
pub async fn run(config: &AppConfig, cancel: &CancellationToken) -> anyhow::Result<RunReport> {
    let fetcher = HttpFetcher::with_timeout(config.fetch_timeout)?;
    let composer = VariantComposer::new(fetcher);
    let sink = DirectorySink::new(&config.output_dir);

    tracing::info!(
        page_id = %config.page_id,
        master = %config.master_source,
        tiers = ?config.tiers,
        output_dir = %config.output_dir.display(),
        "Generating variants"
    );

    let outcome = composer
        .generate_and_persist(
            &config.page_id,
            &config.master_source,
            config.polarity,
            &config.tiers,
            &sink,
            cancel,
        )
        .await?;

    Ok(RunReport {
        page_id: config.page_id.clone(),
        master: config.master_source.to_string(),
        output_dir: config.output_dir.clone(),
        finished_at: Utc::now(),
        summary: outcome.summary(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use line_art::{INK, PAPER, PixelBuffer};
    use pretty_assertions::assert_eq;
    use variant_engine::{DeclaredPolarity, DifficultyTier, MasterSource};

    use super::*;

    fn write_master(dir: &std::path::Path) -> PathBuf {
        let page = PixelBuffer::from_fn(40, 30, |x, y| if x == y { INK } else { PAPER });
        let path = dir.join("master.png");
        std::fs::write(&path, line_art::encode_png(&page).unwrap()).unwrap();
        path
    }

    fn config_for(master: PathBuf, output_dir: PathBuf) -> AppConfig {
        AppConfig {
            master_source: MasterSource::Path(master),
            page_id: "dino".into(),
            output_dir,
            polarity: DeclaredPolarity::InkOnWhite,
            tiers: DifficultyTier::ALL.to_vec(),
            fetch_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_run_writes_all_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(write_master(dir.path()), dir.path().join("out"));

        let report = run(&config, &CancellationToken::new()).await.unwrap();
        assert!(!report.has_failures());
        assert_eq!(report.summary.succeeded.len(), 3);

        for tier in ["quick-easy", "beginner", "intermediate"] {
            let bytes = std::fs::read(dir.path().join(format!("out/dino_{tier}.png"))).unwrap();
            let variant = line_art::decode(&bytes).unwrap();
            assert_eq!(variant.dimensions(), (40, 30), "{tier}");
        }

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["page_id"], "dino");
        assert_eq!(json["succeeded"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_run_missing_master_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().join("nope.png"), dir.path().join("out"));

        let err = run(&config, &CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("fetching"), "{err}");
        assert!(!dir.path().join("out").exists());
    }
}
