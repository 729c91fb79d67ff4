//! Headless variant generator.
//!
//! Reads configuration from the environment (and `.env`), renders the
//! configured difficulty tiers for one master and prints a JSON report.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use coloring_pages_lib::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting coloring page variant generator");

    coloring_pages_lib::load_dotenv();
    let config = AppConfig::from_env()?;

    // Ctrl+C stops the run at the next stage boundary; nothing further is written.
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling variant generation...");
            token.cancel();
        }
    });

    let report = coloring_pages_lib::run(&config, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} tiers failed",
            report.summary.failed.len(),
            report.summary.failed.len() + report.summary.succeeded.len()
        );
    }
    tracing::info!(page_id = %report.page_id, "All variants written");
    Ok(())
}
